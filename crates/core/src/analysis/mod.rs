//! Audio level and spectrum, normalised against their own recent history.
//!
//! Each update smooths the raw level and spectrum, records them in bounded
//! histories and rescales the current values between the 10th and 90th
//! percentile of the window. Loud and quiet rooms therefore both span the
//! full `[0, 1]` range once the window has filled.

pub mod history;
mod spectrum;

use std::{fmt, time::Instant};

use tracing::{debug, info, warn};

use crate::audio::{MicrophoneCapture, SampleSource};
use crate::config::AudioConfig;
use crate::{ColumnVjError, Result};

pub use history::{percentile, SampleHistory};
pub use spectrum::{bucket_decibels, compute_rms, SpectrumAnalyzer};

pub const LOWER_PERCENTILE: f32 = 0.1;
pub const UPPER_PERCENTILE: f32 = 0.9;
const EPSILON: f32 = 1e-6;
const DEBUG_PHASE_STEP: f32 = 0.02;
const DEBUG_LOW_BAND: f32 = 0.15;

/// Converts raw microphone blocks (or a synthetic debug signal) into a
/// normalised level and a fixed-length normalised spectrum.
pub struct SignalNormalizer {
    config: AudioConfig,
    source: Option<Box<dyn SampleSource>>,
    analyzer: SpectrumAnalyzer,
    block: Vec<f32>,
    buckets: Vec<f32>,
    scratch: Vec<f32>,

    raw_level: f32,
    smoothed_level: f32,
    normalized_level: f32,
    spectrum: Vec<f32>,
    normalized_spectrum: Vec<f32>,

    level_history: SampleHistory,
    spectrum_history: Vec<SampleHistory>,

    resume_requested: bool,
    debug_mode: bool,
    debug_phase: f32,
    epoch: Instant,
}

impl SignalNormalizer {
    /// Normaliser that captures from the configured microphone on `start`.
    pub fn new(config: AudioConfig) -> Self {
        let capture = MicrophoneCapture::new(config.device.clone(), config.fft_size);
        Self::with_source(config, Box::new(capture))
    }

    pub fn with_source(config: AudioConfig, source: Box<dyn SampleSource>) -> Self {
        Self::build(config, Some(source))
    }

    /// Normaliser with no capture device; only the debug signal is available.
    pub fn without_source(config: AudioConfig) -> Self {
        Self::build(config, None)
    }

    fn build(config: AudioConfig, source: Option<Box<dyn SampleSource>>) -> Self {
        let bins = config.spectrum_bins.max(1);
        let history = SampleHistory::new(config.history_seconds, config.history_samples);
        Self {
            source,
            analyzer: SpectrumAnalyzer::new(),
            block: Vec::with_capacity(config.fft_size),
            buckets: vec![0.0; bins],
            scratch: Vec::with_capacity(config.history_samples.min(4096)),
            raw_level: 0.0,
            smoothed_level: 0.0,
            normalized_level: 0.0,
            spectrum: vec![0.0; bins],
            normalized_spectrum: vec![0.0; bins],
            level_history: history.clone(),
            spectrum_history: vec![history; bins],
            resume_requested: false,
            debug_mode: false,
            debug_phase: 0.0,
            epoch: Instant::now(),
            config,
        }
    }

    /// Acquires the capture device. Failure is returned to the caller, who
    /// decides whether to fall back to debug mode.
    pub fn start(&mut self) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Err(ColumnVjError::AudioDevice(
                "no audio source configured".into(),
            ));
        };
        if source.is_running() {
            return Ok(());
        }
        source.start()?;
        self.resume_requested = false;
        self.reset_state();
        info!("signal normalizer started");
        Ok(())
    }

    pub fn update(&mut self) {
        let now = self.epoch.elapsed().as_secs_f64();
        self.update_at(now);
    }

    /// Ingests one frame observed at `timestamp` seconds.
    pub fn update_at(&mut self, timestamp: f64) {
        let updated = if self.debug_mode {
            self.update_debug_audio(timestamp);
            true
        } else {
            self.update_live_audio()
        };
        if !updated {
            return;
        }

        self.push_history(timestamp);
        self.compute_normalization();
    }

    /// Normalised level in `[0, 1]`.
    pub fn level(&self) -> f32 {
        self.normalized_level
    }

    /// Normalised spectrum in `[0, 1]`, `spectrum_bins` long.
    pub fn spectrum(&self) -> &[f32] {
        &self.normalized_spectrum
    }

    /// Smoothed level before normalisation.
    pub fn smoothed_level(&self) -> f32 {
        self.smoothed_level
    }

    pub fn raw_level(&self) -> f32 {
        self.raw_level
    }

    pub fn is_active(&self) -> bool {
        self.debug_mode || self.source.as_ref().is_some_and(|s| s.is_running())
    }

    pub fn is_debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Switches between live and synthetic input. Any change discards all
    /// accumulated history.
    pub fn set_debug_mode(&mut self, enabled: bool) {
        if self.debug_mode == enabled {
            return;
        }
        self.debug_mode = enabled;
        self.reset_state();
        self.debug_phase = 0.0;
        if enabled {
            self.resume_requested = false;
        }
        info!(enabled, "audio debug mode");
    }

    pub fn toggle_debug_mode(&mut self) -> bool {
        self.set_debug_mode(!self.debug_mode);
        self.debug_mode
    }

    pub fn history_len(&self) -> usize {
        self.level_history.len()
    }

    fn reset_state(&mut self) {
        self.level_history.clear();
        self.spectrum_history.iter_mut().for_each(SampleHistory::clear);
        self.raw_level = 0.0;
        self.smoothed_level = 0.0;
        self.normalized_level = 0.0;
        self.spectrum.fill(0.0);
        self.normalized_spectrum.fill(0.0);
    }

    fn update_live_audio(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        if !source.is_running() {
            return false;
        }

        if source.is_suspended() {
            if !self.resume_requested {
                self.resume_requested = true;
                if let Err(err) = source.resume() {
                    warn!(error = %err, "failed to resume audio capture");
                    self.resume_requested = false;
                }
            }
        } else {
            self.resume_requested = false;
        }

        if !source.read_latest(&mut self.block) {
            return false;
        }

        self.raw_level = compute_rms(&self.block);
        self.smoothed_level = smooth(self.smoothed_level, self.raw_level, self.config.level_smoothing);

        match self.analyzer.decibels(&self.block) {
            Ok(decibels) => {
                bucket_decibels(
                    decibels,
                    self.config.min_decibels,
                    self.config.max_decibels,
                    &mut self.buckets,
                );
                let factor = self.config.spectrum_smoothing;
                for (bin, average) in self.spectrum.iter_mut().zip(&self.buckets) {
                    *bin = smooth(*bin, *average, factor);
                }
            }
            Err(err) => debug!(error = %err, "spectrum extraction failed"),
        }
        true
    }

    fn update_debug_audio(&mut self, timestamp: f64) {
        let bins = self.spectrum.len();
        let phase = timestamp as f32;
        let factor = self.config.spectrum_smoothing;
        for (index, bin) in self.spectrum.iter_mut().enumerate() {
            let ratio = if bins > 1 {
                index as f32 / (bins - 1) as f32
            } else {
                0.0
            };
            let low_bias = (1.0 - ratio).powf(1.4);
            let wobble = 0.35 * (phase * 2.4 + ratio * 12.0 + self.debug_phase).sin();
            let rumble = 0.2 * (phase * 0.9 + ratio * 3.0).sin();
            let ripple = 0.1 * (phase * 5.7 + ratio * 28.0).sin();
            let value = clamp01(low_bias + wobble + rumble + ripple);
            *bin = smooth(*bin, value, factor);
        }

        let low_span = ((bins as f32 * DEBUG_LOW_BAND).floor() as usize).max(1);
        let average = self.spectrum[..low_span].iter().sum::<f32>() / low_span as f32;
        self.raw_level = clamp01(average);
        self.smoothed_level = smooth(self.smoothed_level, self.raw_level, self.config.level_smoothing);
        self.debug_phase += DEBUG_PHASE_STEP;
    }

    fn push_history(&mut self, timestamp: f64) {
        if !self.level_history.push(timestamp, self.smoothed_level) {
            debug!(timestamp, "dropping out-of-order audio observation");
            return;
        }
        for (history, value) in self.spectrum_history.iter_mut().zip(&self.spectrum) {
            history.push(timestamp, *value);
        }
    }

    fn compute_normalization(&mut self) {
        if self.level_history.is_empty() {
            self.normalized_level = clamp01(self.smoothed_level);
            for (out, value) in self.normalized_spectrum.iter_mut().zip(&self.spectrum) {
                *out = clamp01(*value);
            }
            return;
        }

        let (floor, ceil) =
            self.level_history
                .percentile_range(LOWER_PERCENTILE, UPPER_PERCENTILE, &mut self.scratch);
        self.normalized_level = normalize_value(self.smoothed_level, floor, ceil);

        for ((out, value), history) in self
            .normalized_spectrum
            .iter_mut()
            .zip(&self.spectrum)
            .zip(&self.spectrum_history)
        {
            let (floor, ceil) =
                history.percentile_range(LOWER_PERCENTILE, UPPER_PERCENTILE, &mut self.scratch);
            *out = normalize_value(*value, floor, ceil);
        }
    }
}

impl fmt::Debug for SignalNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalNormalizer")
            .field("debug_mode", &self.debug_mode)
            .field("active", &self.is_active())
            .field("level", &self.normalized_level)
            .field("bins", &self.spectrum.len())
            .field("history", &self.level_history.len())
            .finish()
    }
}

/// Maps `value` into `[0, 1]` between `floor` and `ceil`.
pub fn normalize_value(value: f32, floor: f32, ceil: f32) -> f32 {
    clamp01((value - floor) / (ceil - floor).max(EPSILON))
}

pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn smooth(previous: f32, current: f32, factor: f32) -> f32 {
    previous * factor + current * (1.0 - factor)
}
