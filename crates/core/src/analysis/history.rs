use std::collections::VecDeque;

/// Time- and count-bounded series of `(timestamp, value)` observations.
///
/// Timestamps are seconds and strictly increasing; an observation that is
/// not newer than the last one is dropped. After every push the series spans
/// at most `max_age` seconds and holds at most `max_len` entries.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    entries: VecDeque<(f64, f32)>,
    max_age: f64,
    max_len: usize,
}

impl SampleHistory {
    pub fn new(max_age: f64, max_len: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_len.min(4096)),
            max_age,
            max_len: max_len.max(1),
        }
    }

    /// Appends an observation and evicts from the old end. Returns false if
    /// the observation was out of order.
    pub fn push(&mut self, timestamp: f64, value: f32) -> bool {
        if let Some(&(last, _)) = self.entries.back() {
            if timestamp <= last {
                return false;
            }
        }
        self.entries.push_back((timestamp, value));

        let cutoff = timestamp - self.max_age;
        while self.entries.front().is_some_and(|&(t, _)| t < cutoff) {
            self.entries.pop_front();
        }
        while self.entries.len() > self.max_len {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Seconds between the oldest and newest observation.
    pub fn span(&self) -> f64 {
        match (self.entries.front(), self.entries.back()) {
            (Some(&(first, _)), Some(&(last, _))) => last - first,
            _ => 0.0,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries.iter().map(|&(_, v)| v)
    }

    /// Lower and upper percentile of the current window, computed in
    /// `scratch` to avoid allocating per frame.
    pub fn percentile_range(&self, lower: f32, upper: f32, scratch: &mut Vec<f32>) -> (f32, f32) {
        scratch.clear();
        scratch.extend(self.values());
        (percentile(scratch, lower), percentile(scratch, upper))
    }
}

/// Percentile with linear interpolation between order statistics.
///
/// Empty input yields 0 and a single value yields that value. Reorders
/// `values` in place.
pub fn percentile(values: &mut [f32], fraction: f32) -> f32 {
    match values.len() {
        0 => return 0.0,
        1 => return values[0],
        _ => {}
    }

    let rank = fraction.clamp(0.0, 1.0) * (values.len() - 1) as f32;
    let lower_index = rank.floor() as usize;
    let weight = rank - lower_index as f32;

    let (_, &mut lower, above) = values.select_nth_unstable_by(lower_index, f32::total_cmp);
    if weight <= 0.0 || above.is_empty() {
        return lower;
    }
    let upper = above
        .iter()
        .copied()
        .min_by(f32::total_cmp)
        .unwrap_or(lower);
    lower + (upper - lower) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&mut values, 0.5), 3.0);
        assert!((percentile(&mut values, 0.1) - 1.4).abs() < 1e-6);
        assert!((percentile(&mut values, 0.9) - 4.6).abs() < 1e-6);
        assert_eq!(percentile(&mut values, 1.0), 5.0);
        assert_eq!(percentile(&mut values, 0.0), 1.0);
    }

    #[test]
    fn degenerate_percentiles() {
        assert_eq!(percentile(&mut [], 0.9), 0.0);
        assert_eq!(percentile(&mut [0.42], 0.1), 0.42);
    }

    #[test]
    fn nan_sorts_above_every_number() {
        let mut values = vec![2.0, f32::NAN, 1.0, 3.0, f32::NAN];
        assert_eq!(percentile(&mut values, 0.0), 1.0);
        assert_eq!(percentile(&mut values, 0.5), 3.0);
        assert!(percentile(&mut values, 1.0).is_nan());
    }

    #[test]
    fn alternating_levels_span_their_extremes() {
        let mut history = SampleHistory::new(10.0, 1200);
        for i in 0..20 {
            let value = if i % 2 == 0 { 0.1 } else { 0.9 };
            history.push(i as f64 * 0.1, value);
        }
        let (low, high) = history.percentile_range(0.1, 0.9, &mut Vec::new());
        assert!((low - 0.1).abs() < 1e-6);
        assert!((high - 0.9).abs() < 1e-6);
    }

    #[test]
    fn stays_within_age_and_count_bounds() {
        let mut history = SampleHistory::new(10.0, 1200);
        for i in 0..5_000 {
            history.push(i as f64 / 60.0, i as f32);
            assert!(history.len() <= 1200);
            assert!(history.span() <= 10.0);
        }

        let mut sparse = SampleHistory::new(10.0, 1200);
        for i in 0..100 {
            sparse.push(i as f64 * 0.75, 1.0);
            assert!(sparse.span() <= 10.0);
        }
        assert_eq!(sparse.len(), 14);
    }

    #[test]
    fn rejects_out_of_order_observations() {
        let mut history = SampleHistory::new(10.0, 8);
        assert!(history.push(1.0, 0.5));
        assert!(!history.push(1.0, 0.6));
        assert!(!history.push(0.5, 0.6));
        assert!(history.push(1.5, 0.7));
        assert_eq!(history.values().collect::<Vec<_>>(), vec![0.5, 0.7]);
    }
}
