use std::io::Write;
use std::path::Path;

use crate::Result;

/// Straight (non-premultiplied) RGBA colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Source-over: `self` painted onto `dst` at `opacity`.
    fn over(self, dst: Self, opacity: f32) -> Self {
        let a = (self.a * opacity).clamp(0.0, 1.0);
        if a <= 0.0 {
            return dst;
        }
        let inv = 1.0 - a;
        let out_a = a + dst.a * inv;
        if out_a <= f32::EPSILON {
            return Self::TRANSPARENT;
        }
        let mix = |s: f32, d: f32| (s * a + d * dst.a * inv) / out_a;
        Self {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: out_a,
        }
    }
}

/// Software RGBA surface. Used both as a column's offscreen buffer and as
/// the final canvas the columns are composited onto.
#[derive(Clone, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl FrameBuffer {
    /// Creates a fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    pub fn is_clear(&self) -> bool {
        self.pixels.iter().all(|p| p.a <= 0.0)
    }

    /// Paints black at `alpha` over the whole surface.
    pub fn fade_to_black(&mut self, alpha: f32) {
        self.fill(Rgba::BLACK.with_alpha(alpha));
    }

    pub fn fill(&mut self, color: Rgba) {
        for pixel in &mut self.pixels {
            *pixel = color.over(*pixel, 1.0);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let x0 = x.max(0.0) as usize;
        let y0 = y.max(0.0) as usize;
        let x1 = ((x + w).max(0.0) as usize).min(self.width);
        let y1 = ((y + h).max(0.0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                let index = row * self.width + col;
                self.pixels[index] = color.over(self.pixels[index], 1.0);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let y0 = (cy - radius).max(0.0) as usize;
        let y1 = ((cy + radius).max(0.0) as usize + 1).min(self.height);
        let x0 = (cx - radius).max(0.0) as usize;
        let x1 = ((cx + radius).max(0.0) as usize + 1).min(self.width);
        let r2 = radius * radius;
        for row in y0..y1 {
            for col in x0..x1 {
                let dx = col as f32 + 0.5 - cx;
                let dy = row as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    let index = row * self.width + col;
                    self.pixels[index] = color.over(self.pixels[index], 1.0);
                }
            }
        }
    }

    /// Draws `src` stretched over the whole surface with a global opacity.
    pub fn composite(&mut self, src: &FrameBuffer, opacity: f32) {
        if opacity <= 0.0 || src.width == 0 || src.height == 0 {
            return;
        }
        let same_size = src.width == self.width && src.height == self.height;
        for row in 0..self.height {
            let src_row = if same_size { row } else { row * src.height / self.height };
            for col in 0..self.width {
                let src_col = if same_size { col } else { col * src.width / self.width };
                let index = row * self.width + col;
                let source = src.pixels[src_row * src.width + src_col];
                self.pixels[index] = source.over(self.pixels[index], opacity);
            }
        }
    }

    /// Writes the surface as a binary PPM, flattening alpha onto black.
    pub fn write_ppm(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3 + 32);
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        for pixel in &self.pixels {
            for channel in [pixel.r, pixel.g, pixel.b] {
                out.push((channel * pixel.a * 255.0).round().clamp(0.0, 255.0) as u8);
            }
        }
        std::fs::write(path, out)?;
        Ok(())
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
