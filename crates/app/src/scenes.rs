//! Demo scenes shipped with the binary.

use std::f32::consts::TAU;

use column_vj_core::{FrameBuffer, Rgba, Scene, SceneDescriptor, SceneDrawContext, SceneLibrary};

/// Default grid: one column per scene family.
pub fn default_library() -> SceneLibrary {
    SceneLibrary::new()
        .with_column(vec![
            SceneDescriptor::new("Spectrum Columns", || SpectrumColumns::new(48, 200.0)),
            SceneDescriptor::new("Spectrum Columns (warm)", || SpectrumColumns::new(24, 20.0)),
        ])
        .with_column(vec![
            SceneDescriptor::new("Beat Rings", || BeatRings::new(1.0)),
            SceneDescriptor::new("Beat Rings (half time)", || BeatRings::new(0.5)),
        ])
        .with_column(vec![
            SceneDescriptor::new("Orbit Field", || OrbitField::new(12)),
            SceneDescriptor::new("Orbit Swarm", || OrbitField::new(40)),
            SceneDescriptor::new("Orbit Pair", || OrbitField::new(2)),
        ])
        .with_column(vec![SceneDescriptor::new("Pulse Grid", PulseGrid::default)])
}

/// Mean of the spectrum between two fractions of its length.
fn band(spectrum: &[f32], from: f32, to: f32) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let len = spectrum.len() as f32;
    let start = ((from * len) as usize).min(spectrum.len() - 1);
    let end = ((to * len) as usize).clamp(start + 1, spectrum.len());
    spectrum[start..end].iter().sum::<f32>() / (end - start) as f32
}

/// Mean smoothed toggle value.
fn toggle_energy(context: &SceneDrawContext<'_>) -> f32 {
    if context.toggles_smooth.is_empty() {
        return 0.0;
    }
    context.toggles_smooth.iter().sum::<f32>() / context.toggles_smooth.len() as f32
}

fn hsv(hue: f32, saturation: f32, value: f32, alpha: f32) -> Rgba {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    Rgba::new(r + m, g + m, b + m, alpha)
}

pub struct SpectrumColumns {
    count: usize,
    base_hue: f32,
    heights: Vec<f32>,
}

impl SpectrumColumns {
    pub fn new(count: usize, base_hue: f32) -> Self {
        Self {
            count,
            base_hue,
            heights: Vec::new(),
        }
    }
}

impl Scene for SpectrumColumns {
    fn name(&self) -> &str {
        "Spectrum Columns"
    }

    fn setup(&mut self, _buffer: &mut FrameBuffer, _column_index: usize) {
        self.heights = vec![0.0; self.count];
    }

    fn draw(&mut self, buffer: &mut FrameBuffer, context: &SceneDrawContext<'_>) {
        let width = buffer.width() as f32;
        let height = buffer.height() as f32;
        let spacing = width / self.count.max(1) as f32;
        let level = (context.audio_level * 3.0).min(1.0);
        let low = band(context.audio_spectrum, 0.0, 0.25);

        for (index, bar) in self.heights.iter_mut().enumerate() {
            let from = index as f32 / self.count as f32;
            let to = (index + 1) as f32 / self.count as f32;
            let value = band(context.audio_spectrum, from, to);
            let toggle = context.toggles_smooth.get(index % 7).copied().unwrap_or(0.0);
            let target = height * (0.12 + value * 0.75 + level * 0.25 + toggle * 0.25).min(1.0);
            *bar += (target - *bar) * 0.15;

            let hue = self.base_hue + low * 80.0 + value * 140.0 + toggle * 60.0;
            buffer.fill_rect(
                index as f32 * spacing + spacing * 0.15,
                height - *bar,
                spacing * 0.7,
                *bar,
                hsv(hue, 0.6, 0.4 + value * 0.5, 0.85),
            );
        }
    }
}

pub struct BeatRings {
    rate: f64,
    hue: f32,
}

impl BeatRings {
    pub fn new(rate: f64) -> Self {
        Self { rate, hue: 0.0 }
    }
}

impl Scene for BeatRings {
    fn name(&self) -> &str {
        "Beat Rings"
    }

    fn setup(&mut self, _buffer: &mut FrameBuffer, column_index: usize) {
        self.hue = column_index as f32 * 45.0;
    }

    fn draw(&mut self, buffer: &mut FrameBuffer, context: &SceneDrawContext<'_>) {
        let cx = buffer.width() as f32 * 0.5;
        let cy = buffer.height() as f32 * 0.5;
        let max_radius = cx.min(cy);
        let phase = (context.beat.beat * self.rate).fract() as f32;
        if context.beat.crossed {
            self.hue = (self.hue + 30.0) % 360.0;
        }

        for ring in (0..4).rev() {
            let t = (phase + ring as f32 * 0.25) % 1.0;
            let radius = max_radius * t * (0.8 + context.audio_level * 0.4);
            let alpha = (1.0 - t) * 0.6;
            buffer.fill_circle(cx, cy, radius, hsv(self.hue + ring as f32 * 20.0, 0.7, 0.9, alpha));
        }
    }
}

pub struct OrbitField {
    count: usize,
    seeds: Vec<(f32, f32, f32)>,
}

impl OrbitField {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            seeds: Vec::new(),
        }
    }
}

impl Scene for OrbitField {
    fn name(&self) -> &str {
        "Orbit Field"
    }

    fn setup(&mut self, _buffer: &mut FrameBuffer, column_index: usize) {
        let offset = column_index as f32 * 0.37;
        self.seeds = (0..self.count)
            .map(|i| {
                let f = i as f32 / self.count.max(1) as f32;
                (f * TAU + offset, 0.2 + 0.7 * ((i * 7919) % 97) as f32 / 97.0, 0.3 + f)
            })
            .collect();
    }

    fn draw(&mut self, buffer: &mut FrameBuffer, context: &SceneDrawContext<'_>) {
        let cx = buffer.width() as f32 * 0.5;
        let cy = buffer.height() as f32 * 0.5;
        let reach = cx.min(cy);
        let energy = toggle_energy(context);
        let high = band(context.audio_spectrum, 0.6, 1.0);

        for &(angle, distance, speed) in &self.seeds {
            let a = angle + context.elapsed_seconds * speed * (1.0 + energy);
            let r = reach * distance * (0.9 + context.audio_level * 0.3);
            let size = reach * 0.03 * (1.0 + high * 2.0);
            buffer.fill_circle(
                cx + a.cos() * r,
                cy + a.sin() * r,
                size,
                hsv(180.0 + distance * 120.0, 0.5, 1.0, 0.8),
            );
        }
    }
}

#[derive(Default)]
pub struct PulseGrid {
    flash: f32,
}

impl Scene for PulseGrid {
    fn name(&self) -> &str {
        "Pulse Grid"
    }

    fn setup(&mut self, _buffer: &mut FrameBuffer, _column_index: usize) {
        self.flash = 0.0;
    }

    fn draw(&mut self, buffer: &mut FrameBuffer, context: &SceneDrawContext<'_>) {
        if context.beat.crossed {
            self.flash = 1.0;
        }
        self.flash = (self.flash - context.delta_seconds * 2.0).max(0.0);

        let cells = 6;
        let cell_w = buffer.width() as f32 / cells as f32;
        let cell_h = buffer.height() as f32 / cells as f32;
        for row in 0..cells {
            for col in 0..cells {
                let value = band(
                    context.audio_spectrum,
                    col as f32 / cells as f32,
                    (col + 1) as f32 / cells as f32,
                );
                let lit = value > row as f32 / cells as f32 || self.flash > 0.5;
                if !lit {
                    continue;
                }
                let alpha = 0.3 + 0.6 * self.flash.max(value);
                buffer.fill_rect(
                    col as f32 * cell_w + 1.0,
                    (cells - 1 - row) as f32 * cell_h + 1.0,
                    cell_w - 2.0,
                    cell_h - 2.0,
                    hsv(300.0 - row as f32 * 30.0, 0.8, 0.9, alpha),
                );
            }
        }
    }
}
