//! Beat clock driven by the render loop, with tap tempo.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::TempoConfig;

/// Beat position state. A pending BPM is only applied when a whole beat
/// boundary is crossed.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatClock {
    bpm: f64,
    interval_ms: f64,
    elapsed_ms: f64,
    beat_count: u64,
    pending_bpm: Option<f64>,
}

impl BeatClock {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm,
            interval_ms: 60_000.0 / bpm,
            elapsed_ms: 0.0,
            beat_count: 0,
            pending_bpm: None,
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Milliseconds since the last whole beat.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn beat_count(&self) -> u64 {
        self.beat_count
    }

    pub fn pending_bpm(&self) -> Option<f64> {
        self.pending_bpm
    }

    /// Fractional beat position.
    pub fn position(&self) -> f64 {
        self.beat_count as f64 + self.elapsed_ms / self.interval_ms
    }

    /// Adds `delta_ms`, returns true when at least one whole beat elapsed.
    fn advance(&mut self, delta_ms: f64) -> bool {
        self.elapsed_ms += delta_ms.max(0.0);
        if self.elapsed_ms < self.interval_ms {
            return false;
        }

        let crossed = (self.elapsed_ms / self.interval_ms).floor();
        self.beat_count += crossed as u64;
        self.elapsed_ms %= self.interval_ms;

        if let Some(bpm) = self.pending_bpm.take() {
            self.bpm = bpm;
            self.interval_ms = 60_000.0 / bpm;
            info!(bpm, "tempo change applied");
        }
        true
    }

    fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.beat_count = 0;
    }
}

/// Copy of the tracker state handed to scenes each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatSnapshot {
    pub beat: f64,
    pub bpm: f64,
    pub crossed: bool,
}

impl Default for BeatSnapshot {
    fn default() -> Self {
        Self {
            beat: 0.0,
            bpm: 120.0,
            crossed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Running,
}

/// Tempo tracker. Wall-clock methods (`update`, `tap_tempo`, `start`) read a
/// monotonic clock; the `_at` variants take milliseconds explicitly.
#[derive(Debug)]
pub struct TempoTracker {
    clock: BeatClock,
    state: TransportState,
    last_update_ms: f64,
    beat_updated: bool,
    taps: VecDeque<f64>,
    tap_history: usize,
    tap_timeout_ms: f64,
    epoch: Instant,
}

impl TempoTracker {
    pub fn new(config: &TempoConfig) -> Self {
        Self {
            clock: BeatClock::new(config.initial_bpm),
            state: TransportState::Stopped,
            last_update_ms: 0.0,
            beat_updated: false,
            taps: VecDeque::with_capacity(config.tap_history + 1),
            tap_history: config.tap_history.max(2),
            tap_timeout_ms: config.tap_timeout_ms,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    pub fn start(&mut self) {
        let now = self.now_ms();
        self.start_at(now);
    }

    /// Starts counting from beat zero. No-op while already running.
    pub fn start_at(&mut self, now_ms: f64) {
        if self.state == TransportState::Running {
            return;
        }
        self.state = TransportState::Running;
        self.last_update_ms = now_ms;
        self.clock.reset();
        info!(bpm = self.clock.bpm, "tempo tracker started");
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.beat_updated = false;
        info!("tempo tracker stopped");
    }

    /// Restarts the count at beat zero from the current time, keeping tempo.
    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn update(&mut self) {
        let now = self.now_ms();
        self.update_at(now);
    }

    pub fn update_at(&mut self, now_ms: f64) {
        if self.state == TransportState::Stopped {
            self.beat_updated = false;
            return;
        }
        let delta = now_ms - self.last_update_ms;
        self.last_update_ms = now_ms;
        self.beat_updated = self.clock.advance(delta);
    }

    /// Schedules a tempo change for the next beat boundary. Non-finite or
    /// non-positive values are ignored.
    pub fn set_bpm(&mut self, bpm: f64) {
        if !(bpm.is_finite() && bpm > 0.0) {
            debug!(bpm, "ignoring invalid tempo");
            return;
        }
        if bpm == self.clock.bpm {
            self.clock.pending_bpm = None;
            return;
        }
        self.clock.pending_bpm = Some(bpm);
        info!(bpm, "tempo change scheduled for next beat");
    }

    pub fn tap_tempo(&mut self) {
        let now = self.now_ms();
        self.tap_tempo_at(now);
    }

    /// Records a tap. A gap longer than the timeout starts a new attempt;
    /// two or more taps schedule the rounded mean-interval tempo.
    pub fn tap_tempo_at(&mut self, now_ms: f64) {
        if let Some(&last) = self.taps.back() {
            if now_ms - last > self.tap_timeout_ms || now_ms <= last {
                debug!("tap history reset");
                self.taps.clear();
            }
        }

        self.taps.push_back(now_ms);
        while self.taps.len() > self.tap_history {
            self.taps.pop_front();
        }

        if let Some(bpm) = self.tapped_bpm() {
            self.set_bpm(bpm);
        }
    }

    fn tapped_bpm(&self) -> Option<f64> {
        let (&first, &last) = (self.taps.front()?, self.taps.back()?);
        let intervals = self.taps.len().checked_sub(1).filter(|&n| n > 0)?;
        // mean of consecutive intervals telescopes to the total span
        let mean = (last - first) / intervals as f64;
        (mean > 0.0).then(|| (60_000.0 / mean).round())
    }

    /// Fractional beat position.
    pub fn beat(&self) -> f64 {
        self.clock.position()
    }

    /// Whether the last update crossed a whole beat.
    pub fn is_beat_updated_now(&self) -> bool {
        self.beat_updated
    }

    pub fn bpm(&self) -> f64 {
        self.clock.bpm
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn snapshot(&self) -> BeatSnapshot {
        BeatSnapshot {
            beat: self.beat(),
            bpm: self.bpm(),
            crossed: self.beat_updated,
        }
    }
}
