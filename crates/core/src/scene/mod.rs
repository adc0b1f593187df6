use std::sync::Arc;

use crate::render::FrameBuffer;
use crate::timeline::BeatSnapshot;

/// Per-frame inputs handed to a scene's `draw`.
#[derive(Debug, Clone, Copy)]
pub struct SceneDrawContext<'a> {
    pub column_index: usize,
    /// Seconds since startup or the last beat reset.
    pub elapsed_seconds: f32,
    pub delta_seconds: f32,
    /// Instantaneous toggle values, each 0 or 1.
    pub toggles: &'a [f32],
    /// Smoothed toggle values in `[0, 1]`.
    pub toggles_smooth: &'a [f32],
    /// Normalised audio level in `[0, 1]`.
    pub audio_level: f32,
    /// True while the audio comes from the synthetic debug source.
    pub audio_debug: bool,
    /// Normalised spectrum, low to high frequency.
    pub audio_spectrum: &'a [f32],
    pub beat: BeatSnapshot,
}

/// A visual assigned to one column.
///
/// Scenes only draw into the buffer they are handed; they never call back
/// into the scheduler.
pub trait Scene {
    fn name(&self) -> &str;

    /// Runs when the scene is assigned to a column and again after the
    /// buffer is recreated on resize.
    fn setup(&mut self, buffer: &mut FrameBuffer, column_index: usize);

    fn draw(&mut self, buffer: &mut FrameBuffer, context: &SceneDrawContext<'_>);
}

pub type SceneFactory = Arc<dyn Fn() -> Box<dyn Scene> + Send + Sync>;

/// Named constructor for one scene variant.
#[derive(Clone)]
pub struct SceneDescriptor {
    pub name: String,
    factory: SceneFactory,
}

impl SceneDescriptor {
    pub fn new<F, S>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Scene + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Scene>),
        }
    }

    pub fn instantiate(&self) -> Box<dyn Scene> {
        (self.factory)()
    }
}

impl std::fmt::Debug for SceneDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// Scene variants available per column, in row order.
#[derive(Debug, Clone, Default)]
pub struct SceneLibrary {
    columns: Vec<Vec<SceneDescriptor>>,
}

impl SceneLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, variants: Vec<SceneDescriptor>) -> Self {
        self.columns.push(variants);
        self
    }

    /// Variants for `column`; empty for columns the library does not cover.
    pub fn column(&self, column: usize) -> &[SceneDescriptor] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl Scene for Blank {
        fn name(&self) -> &str {
            "Blank"
        }

        fn setup(&mut self, _buffer: &mut FrameBuffer, _column_index: usize) {}

        fn draw(&mut self, _buffer: &mut FrameBuffer, _context: &SceneDrawContext<'_>) {}
    }

    #[test]
    fn missing_columns_are_empty() {
        let library = SceneLibrary::new()
            .with_column(vec![SceneDescriptor::new("Blank", || Blank)])
            .with_column(Vec::new());

        assert_eq!(library.column_count(), 2);
        assert_eq!(library.column(0).len(), 1);
        assert!(library.column(1).is_empty());
        assert!(library.column(5).is_empty());
    }

    #[test]
    fn descriptors_build_fresh_instances() {
        let descriptor = SceneDescriptor::new("Blank", || Blank);
        let scene = descriptor.instantiate();
        assert_eq!(scene.name(), "Blank");
        assert_eq!(descriptor.name, "Blank");
    }
}
