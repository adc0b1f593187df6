use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::Result;

const MAGNITUDE_FLOOR: f32 = 1e-12;

/// Turns time-domain blocks into per-frequency decibel magnitudes.
pub struct SpectrumAnalyzer {
    planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
    decibels: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            fft: None,
            decibels: Vec::new(),
        }
    }

    /// Hann-windowed magnitude spectrum in dB (`20·log10(|X|/N)`), one value
    /// per bin below Nyquist.
    pub fn decibels(&mut self, samples: &[f32]) -> Result<&[f32]> {
        let len = samples.len();
        if len < 2 {
            self.decibels.clear();
            return Ok(self.decibels.as_slice());
        }

        let Self {
            planner,
            fft,
            decibels,
        } = self;
        let fft = FftResources::prepare(fft, planner, len);
        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * hann_value(index, len);
        }
        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        let scale = 1.0 / len as f32;
        decibels.clear();
        decibels.extend(
            fft.spectrum[..len / 2]
                .iter()
                .map(|bin| 20.0 * (bin.norm() * scale).max(MAGNITUDE_FLOOR).log10()),
        );
        Ok(decibels.as_slice())
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl FftResources {
    /// Reuses the cached plan when the block size is unchanged.
    fn prepare<'a>(
        slot: &'a mut Option<Self>,
        planner: &mut RealFftPlanner<f32>,
        size: usize,
    ) -> &'a mut Self {
        let fft = slot.get_or_insert_with(|| Self::plan(planner, size));
        if fft.size != size {
            *fft = Self::plan(planner, size);
        }
        fft
    }

    fn plan(planner: &mut RealFftPlanner<f32>, size: usize) -> Self {
        let plan = planner.plan_fft_forward(size);
        Self {
            size,
            scratch: plan.make_scratch_vec(),
            spectrum: plan.make_output_vec(),
            input: plan.make_input_vec(),
            plan,
        }
    }
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("size", &self.fft.as_ref().map(|fft| fft.size))
            .finish()
    }
}

/// Averages decibel bins into `out.len()` equal buckets after rescaling each
/// bin from `[min_db, max_db]` to `[0, 1]`.
pub fn bucket_decibels(decibels: &[f32], min_db: f32, max_db: f32, out: &mut [f32]) {
    let range = if max_db - min_db == 0.0 { 1.0 } else { max_db - min_db };
    let buckets = out.len().max(1);
    let bucket_size = (decibels.len() / buckets).max(1);

    for (index, slot) in out.iter_mut().enumerate() {
        let start = (index * bucket_size).min(decibels.len());
        let end = (start + bucket_size).min(decibels.len());
        let bucket = &decibels[start..end];
        *slot = if bucket.is_empty() {
            0.0
        } else {
            bucket
                .iter()
                .map(|db| ((db - min_db) / range).clamp(0.0, 1.0))
                .sum::<f32>()
                / bucket.len() as f32
        };
    }
}

pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    let rms = (sum / samples.len() as f32).sqrt();
    if rms.is_finite() {
        rms
    } else {
        0.0
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_sits_at_the_floor() {
        let mut analyzer = SpectrumAnalyzer::new();
        let db = analyzer.decibels(&[0.0; 256]).unwrap();
        assert_eq!(db.len(), 128);
        assert!(db.iter().all(|v| *v <= -239.0));
    }

    #[test]
    fn tone_peaks_in_its_bin() {
        let len = 512;
        let bin = 32;
        let samples: Vec<f32> = (0..len)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / len as f32).sin())
            .collect();
        let mut analyzer = SpectrumAnalyzer::new();
        let db = analyzer.decibels(&samples).unwrap();

        let peak = db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);
    }

    #[test]
    fn buckets_average_rescaled_bins() {
        let decibels = [-100.0, -20.0, -60.0, -60.0, -200.0, 0.0];
        let mut out = [0.0; 3];
        bucket_decibels(&decibels, -100.0, -20.0, &mut out);
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rms_of_constant_block() {
        assert!((compute_rms(&[0.5; 64]) - 0.5).abs() < 1e-6);
        assert_eq!(compute_rms(&[]), 0.0);
    }
}
