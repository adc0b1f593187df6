use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::surface::address::{FADER_BUTTON_NOTE_BASE, FADER_CONTROLLER_BASE};
use crate::{ColumnVjError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub surface: SurfaceConfig,
    pub audio: AudioConfig,
    pub tempo: TempoConfig,
    pub compositor: CompositorConfig,
}

impl AppConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Missing sections and fields take their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.surface.validate()?;
        self.audio.validate()?;
        self.tempo.validate()
    }
}

/// Geometry and LED palette of the grid controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub columns: usize,
    pub rows: usize,
    /// Palette velocity lit on the selected row, one per column.
    pub column_active_velocities: Vec<u8>,
    /// Velocity for rows that hold a variant but are not selected.
    pub dim_velocity: u8,
    /// Velocity for a latched fader button.
    pub latch_velocity: u8,
    /// Substring matched against port names. First port when unset.
    pub port_name: Option<String>,
    /// Inbound messages buffered between two frame ticks.
    pub queue_capacity: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
            column_active_velocities: vec![5, 53, 60, 13, 17, 32, 33, 45],
            dim_velocity: 3,
            latch_velocity: 127,
            port_name: None,
            queue_capacity: 256,
        }
    }
}

impl SurfaceConfig {
    fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ColumnVjError::InvalidConfig(
                "surface grid needs at least one column and one row".into(),
            ));
        }
        if self.columns * self.rows > FADER_BUTTON_NOTE_BASE as usize {
            return Err(ColumnVjError::InvalidConfig(format!(
                "{}x{} grid overlaps the fader button notes",
                self.columns, self.rows
            )));
        }
        if FADER_BUTTON_NOTE_BASE as usize + self.columns > 128
            || FADER_CONTROLLER_BASE as usize + self.columns > 127
        {
            return Err(ColumnVjError::InvalidConfig(format!(
                "{} columns do not fit the fader address range",
                self.columns
            )));
        }
        if self.dim_velocity > 127 || self.latch_velocity > 127 {
            return Err(ColumnVjError::InvalidConfig(
                "LED velocities must be 7-bit".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ColumnVjError::InvalidConfig(
                "queue_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Active velocity for `column`, falling back to a neutral palette entry
    /// for columns beyond the configured list.
    pub fn active_velocity(&self, column: usize) -> u8 {
        self.column_active_velocities
            .get(column)
            .copied()
            .unwrap_or(50)
            .min(127)
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub fft_size: usize,
    pub spectrum_bins: usize,
    pub min_decibels: f32,
    pub max_decibels: f32,
    pub level_smoothing: f32,
    pub spectrum_smoothing: f32,
    pub history_seconds: f64,
    pub history_samples: usize,
    /// Input device name. Default host input when unset.
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            spectrum_bins: 64,
            min_decibels: -100.0,
            max_decibels: -20.0,
            level_smoothing: 0.85,
            spectrum_smoothing: 0.7,
            history_seconds: 10.0,
            history_samples: 1200,
            device: None,
        }
    }
}

impl AudioConfig {
    fn validate(&self) -> Result<()> {
        if self.spectrum_bins == 0 {
            return Err(ColumnVjError::InvalidConfig(
                "spectrum_bins must be positive".into(),
            ));
        }
        if !self.fft_size.is_power_of_two() || self.fft_size < 2 * self.spectrum_bins {
            return Err(ColumnVjError::InvalidConfig(format!(
                "fft_size {} must be a power of two of at least twice the bin count",
                self.fft_size
            )));
        }
        if self.max_decibels <= self.min_decibels {
            return Err(ColumnVjError::InvalidConfig(
                "max_decibels must exceed min_decibels".into(),
            ));
        }
        let smoothing = 0.0..1.0;
        if !smoothing.contains(&self.level_smoothing)
            || !smoothing.contains(&self.spectrum_smoothing)
        {
            return Err(ColumnVjError::InvalidConfig(
                "smoothing factors must lie in [0, 1)".into(),
            ));
        }
        if self.history_seconds <= 0.0 || self.history_samples == 0 {
            return Err(ColumnVjError::InvalidConfig(
                "history bounds must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub initial_bpm: f64,
    pub tap_history: usize,
    pub tap_timeout_ms: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            initial_bpm: 120.0,
            tap_history: 4,
            tap_timeout_ms: 2000.0,
        }
    }
}

impl TempoConfig {
    fn validate(&self) -> Result<()> {
        if !(self.initial_bpm.is_finite() && self.initial_bpm > 0.0) {
            return Err(ColumnVjError::InvalidConfig(format!(
                "initial_bpm {} must be positive",
                self.initial_bpm
            )));
        }
        if self.tap_history < 2 {
            return Err(ColumnVjError::InvalidConfig(
                "tap_history needs room for at least two taps".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Seconds for a smoothed toggle to close most of the gap to its target.
    pub toggle_time_constant: f32,
    /// Hand column selection to the keyboard whenever no surface is connected.
    pub keyboard_fallback: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            toggle_time_constant: 0.2,
            keyboard_fallback: true,
        }
    }
}
