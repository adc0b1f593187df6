/// Number of on/off parameters exposed to scenes.
pub const TOGGLE_COUNT: usize = 7;

/// Key labels shown for each toggle, in index order.
pub const TOGGLE_LABELS: [char; TOGGLE_COUNT] = ['Z', 'X', 'C', 'V', 'B', 'N', 'M'];

/// Instantaneous 0/1 parameters plus an exponentially smoothed copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleBank {
    values: [f32; TOGGLE_COUNT],
    smoothed: [f32; TOGGLE_COUNT],
    time_constant: f32,
}

impl ToggleBank {
    pub fn new(time_constant: f32) -> Self {
        Self {
            values: [0.0; TOGGLE_COUNT],
            smoothed: [0.0; TOGGLE_COUNT],
            time_constant,
        }
    }

    pub fn time_constant(&self) -> f32 {
        self.time_constant
    }

    /// Flips a toggle. Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if let Some(value) = self.values.get_mut(index) {
            *value = if *value > 0.0 { 0.0 } else { 1.0 };
        }
    }

    pub fn set(&mut self, index: usize, active: bool) {
        if let Some(value) = self.values.get_mut(index) {
            *value = if active { 1.0 } else { 0.0 };
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn smoothed(&self) -> &[f32] {
        &self.smoothed
    }

    /// Moves every smoothed value towards its target by
    /// `min(1, dt / time_constant)`. A non-positive time constant snaps.
    pub fn advance(&mut self, delta_seconds: f32) {
        if self.time_constant <= 0.0 {
            self.smoothed = self.values;
            return;
        }
        if delta_seconds <= 0.0 {
            return;
        }

        let blend = (delta_seconds / self.time_constant).min(1.0);
        for (current, target) in self.smoothed.iter_mut().zip(self.values) {
            *current += (target - *current) * blend;
        }
    }
}

impl Default for ToggleBank {
    fn default() -> Self {
        Self::new(0.2)
    }
}
