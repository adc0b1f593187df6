//! Per-column scene lifecycles, opacity resolution and final compositing.

pub mod overlay;
pub mod toggles;

use tracing::{debug, info};

use crate::analysis::clamp01;
use crate::config::CompositorConfig;
use crate::render::FrameBuffer;
use crate::scene::{Scene, SceneDescriptor, SceneDrawContext, SceneLibrary};
use crate::surface::ControlSurfaceDriver;
use crate::timeline::BeatSnapshot;

pub use overlay::{ColumnStatus, KeyboardStatus, OverlayStatus, NONE_LABEL};
pub use toggles::{ToggleBank, TOGGLE_COUNT, TOGGLE_LABELS};

/// Audio and tempo inputs for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInputs<'a> {
    pub audio_level: f32,
    pub audio_debug: bool,
    pub spectrum: &'a [f32],
    pub beat: BeatSnapshot,
}

/// One physical column: its scene variants, the live scene and its buffer.
pub struct ColumnSlot {
    variants: Vec<SceneDescriptor>,
    scene_index: Option<usize>,
    scene: Option<Box<dyn Scene>>,
    buffer: FrameBuffer,
}

impl ColumnSlot {
    fn new(variants: Vec<SceneDescriptor>, width: usize, height: usize) -> Self {
        Self {
            variants,
            scene_index: None,
            scene: None,
            buffer: FrameBuffer::new(width, height),
        }
    }

    pub fn variants(&self) -> &[SceneDescriptor] {
        &self.variants
    }

    pub fn scene_index(&self) -> Option<usize> {
        self.scene_index
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Name for diagnostics: the live scene's own name, else the variant's.
    pub fn scene_name(&self, selection: Option<usize>) -> String {
        if let Some(name) = self
            .scene
            .as_ref()
            .map(|scene| scene.name().trim())
            .filter(|name| !name.is_empty())
        {
            return name.to_string();
        }
        selection
            .and_then(|index| self.variants.get(index))
            .map(|descriptor| descriptor.name.clone())
            .unwrap_or_else(|| NONE_LABEL.to_string())
    }

    /// Replaces the scene when the selection changed. Returns true if a new
    /// scene was set up.
    fn refresh(&mut self, selection: Option<usize>, column: usize) -> bool {
        if selection == self.scene_index {
            return false;
        }
        self.scene_index = selection;
        self.scene = selection
            .and_then(|index| self.variants.get(index))
            .map(SceneDescriptor::instantiate);

        match self.scene.as_mut() {
            Some(scene) => {
                self.buffer.clear();
                scene.setup(&mut self.buffer, column);
                debug!(column, scene = scene.name(), "scene instantiated");
                true
            }
            None => false,
        }
    }

    fn drop_scene(&mut self) {
        self.scene_index = None;
        self.scene = None;
    }
}

impl std::fmt::Debug for ColumnSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnSlot")
            .field("variants", &self.variants.len())
            .field("scene_index", &self.scene_index)
            .field("scene", &self.scene.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Owns the control-surface driver and one [`ColumnSlot`] per column, and
/// turns driver state into visible, blended scenes.
///
/// Two opacity modes: with a device connected each column follows its
/// effective fader; without one (and with keyboard fallback enabled) a single
/// keyboard-chosen column is fully visible and the rest are hidden.
pub struct CompositionScheduler {
    driver: ControlSurfaceDriver,
    columns: Vec<ColumnSlot>,
    toggles: ToggleBank,
    width: usize,
    height: usize,
    elapsed_seconds: f32,
    keyboard_fallback: bool,
    keyboard_override_active: bool,
    keyboard_override_column: Option<usize>,
    device_ever_connected: bool,
    debug_overlay: bool,
    visible_columns: usize,
    audio_level: f32,
    audio_debug: bool,
    audio_spectrum: Vec<f32>,
}

impl CompositionScheduler {
    /// Builds the column slots from `library`, tells the driver how many
    /// variants each column has and sets up the initially selected scenes.
    pub fn new(
        mut driver: ControlSurfaceDriver,
        library: &SceneLibrary,
        config: &CompositorConfig,
        width: usize,
        height: usize,
    ) -> Self {
        let rows = driver.row_count();
        let mut columns: Vec<ColumnSlot> = (0..driver.column_count())
            .map(|column| {
                let variants = library.column(column).iter().take(rows).cloned().collect();
                ColumnSlot::new(variants, width, height)
            })
            .collect();

        let counts: Vec<usize> = columns.iter().map(|slot| slot.variants.len()).collect();
        driver.configure_slots(&counts);
        for (column, slot) in columns.iter_mut().enumerate() {
            slot.refresh(driver.column_scene_selection(column), column);
        }

        info!(
            columns = columns.len(),
            slots = counts.iter().sum::<usize>(),
            width,
            height,
            "composition scheduler ready"
        );

        Self {
            driver,
            columns,
            toggles: ToggleBank::new(config.toggle_time_constant),
            width,
            height,
            elapsed_seconds: 0.0,
            keyboard_fallback: config.keyboard_fallback,
            keyboard_override_active: config.keyboard_fallback,
            keyboard_override_column: None,
            device_ever_connected: false,
            debug_overlay: false,
            visible_columns: 0,
            audio_level: 0.0,
            audio_debug: false,
            audio_spectrum: Vec::new(),
        }
    }

    /// Advances one frame: ticks the driver, smooths toggles, follows the
    /// driver's selections and draws every visible column.
    pub fn update(&mut self, delta_seconds: f32, inputs: FrameInputs<'_>) {
        let delta_seconds = delta_seconds.max(0.0);
        self.elapsed_seconds += delta_seconds;
        self.audio_level = clamp01(inputs.audio_level);
        self.audio_debug = inputs.audio_debug;
        self.audio_spectrum.clear();
        self.audio_spectrum.extend_from_slice(inputs.spectrum);

        self.driver.update();
        self.toggles.advance(delta_seconds);
        self.sync_override_mode();

        for column in 0..self.columns.len() {
            let selection = self.driver.column_scene_selection(column);
            let opacity = self.column_opacity(column);
            let slot = &mut self.columns[column];
            slot.refresh(selection, column);

            let Some(scene) = slot.scene.as_mut() else {
                slot.buffer.clear();
                continue;
            };
            slot.buffer.clear();
            if opacity <= 0.0 {
                continue;
            }

            let context = SceneDrawContext {
                column_index: column,
                elapsed_seconds: self.elapsed_seconds,
                delta_seconds,
                toggles: self.toggles.values(),
                toggles_smooth: self.toggles.smoothed(),
                audio_level: self.audio_level,
                audio_debug: self.audio_debug,
                audio_spectrum: &self.audio_spectrum,
                beat: inputs.beat,
            };
            scene.draw(&mut slot.buffer, &context);
        }
    }

    /// Fades the canvas by the background fader, then blends each visible
    /// column in order.
    pub fn composite(&mut self, canvas: &mut FrameBuffer) {
        let background = clamp01(self.driver.background_fader_value());
        let alpha = ((1.0 - background) * 255.0).round() / 255.0;
        canvas.fade_to_black(alpha);

        if !self.driver.is_initialized() {
            return;
        }

        let mut visible = 0;
        for (column, slot) in self.columns.iter().enumerate() {
            if slot.scene.is_none() {
                continue;
            }
            let opacity = self.column_opacity(column);
            if opacity <= 0.0 {
                continue;
            }
            visible += 1;
            canvas.composite(&slot.buffer, opacity);
        }
        self.visible_columns = visible;
    }

    /// Recreates every column buffer and re-runs setup for live scenes.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        for (column, slot) in self.columns.iter_mut().enumerate() {
            slot.buffer = FrameBuffer::new(width, height);
            if let Some(scene) = slot.scene.as_mut() {
                scene.setup(&mut slot.buffer, column);
            }
        }
        debug!(width, height, "column buffers resized");
    }

    /// Restarts elapsed time and drops every live scene so the next update
    /// instantiates fresh ones.
    pub fn reset_beat(&mut self) {
        self.elapsed_seconds = 0.0;
        self.columns.iter_mut().for_each(ColumnSlot::drop_scene);
        debug!("beat reset");
    }

    /// Shows `column` alone (with its first variant), or nothing for `None`.
    /// Ignored while a device is connected or keyboard fallback is off.
    pub fn handle_keyboard_selection(&mut self, column: Option<usize>) {
        if !self.keyboard_available() {
            return;
        }
        if column.is_some_and(|c| c >= self.columns.len()) {
            return;
        }

        self.keyboard_override_active = true;
        self.keyboard_override_column = column;
        if let Some(column) = column {
            self.driver.set_column_scene_selection(column, 0);
        }
    }

    /// Shows `column` and advances it to its next variant.
    pub fn cycle_keyboard_selection(&mut self, column: usize) {
        if !self.keyboard_available() || column >= self.columns.len() {
            return;
        }

        self.keyboard_override_active = true;
        let count = self.driver.column_scene_count(column);
        if count == 0 {
            self.keyboard_override_column = None;
            return;
        }

        let next = self
            .driver
            .column_scene_selection(column)
            .map_or(0, |current| (current + 1) % count);
        self.driver.set_column_scene_selection(column, next);
        self.keyboard_override_column = Some(column);
    }

    pub fn toggle_parameter(&mut self, index: usize) {
        self.toggles.toggle(index);
    }

    pub fn set_parameter(&mut self, index: usize, active: bool) {
        self.toggles.set(index, active);
    }

    pub fn toggle_states(&self) -> &[f32] {
        self.toggles.values()
    }

    pub fn smoothed_toggle_states(&self) -> &[f32] {
        self.toggles.smoothed()
    }

    pub fn toggle_debug_overlay(&mut self) {
        self.debug_overlay = !self.debug_overlay;
    }

    pub fn is_debug_overlay_visible(&self) -> bool {
        self.debug_overlay
    }

    /// Status panel text, or nothing while the overlay is hidden.
    pub fn debug_overlay(&self, frame_rate: f32) -> Option<Vec<String>> {
        self.debug_overlay
            .then(|| overlay::format_lines(&self.overlay_status(frame_rate)))
    }

    pub fn overlay_status(&self, frame_rate: f32) -> OverlayStatus<'_> {
        let keyboard = match (self.keyboard_override(), self.keyboard_override_column) {
            (true, Some(column)) => KeyboardStatus::Column(column),
            (true, None) => KeyboardStatus::NoColumn,
            (false, _) => KeyboardStatus::Inactive,
        };
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(column, slot)| {
                let selection = self.driver.column_scene_selection(column);
                ColumnStatus {
                    selection,
                    count: self.driver.column_scene_count(column),
                    opacity: self.column_opacity(column),
                    scene_name: slot.scene_name(selection),
                }
            })
            .collect();

        OverlayStatus {
            width: self.width,
            height: self.height,
            frame_rate,
            elapsed_seconds: self.elapsed_seconds,
            connected: self.driver.is_connected(),
            keyboard,
            background_fader: self.driver.background_fader_value(),
            visible_columns: self.visible_columns,
            scene_slots: self.columns.iter().map(|slot| slot.variants.len()).sum(),
            toggles: self.toggles.values(),
            toggles_smooth: self.toggles.smoothed(),
            toggle_time_constant: self.toggles.time_constant(),
            audio_level: self.audio_level,
            audio_debug: self.audio_debug,
            spectrum: &self.audio_spectrum,
            columns,
        }
    }

    /// Opacity the column would be composited with right now.
    pub fn column_opacity(&self, column: usize) -> f32 {
        if self.keyboard_override() {
            return if self.keyboard_override_column == Some(column) {
                1.0
            } else {
                0.0
            };
        }

        let fader = self.driver.fader_value(column);
        if fader <= 0.0 && !self.driver.is_connected() && !self.device_ever_connected {
            1.0
        } else {
            fader
        }
    }

    /// Columns blended by the last `composite`.
    pub fn visible_column_count(&self) -> usize {
        self.visible_columns
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    pub fn keyboard_override(&self) -> bool {
        self.keyboard_override_active && !self.driver.is_connected()
    }

    pub fn keyboard_override_column(&self) -> Option<usize> {
        self.keyboard_override_column
    }

    pub fn columns(&self) -> &[ColumnSlot] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn driver(&self) -> &ControlSurfaceDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut ControlSurfaceDriver {
        &mut self.driver
    }

    fn keyboard_available(&self) -> bool {
        self.keyboard_fallback && !self.driver.is_connected()
    }

    fn sync_override_mode(&mut self) {
        if self.driver.is_connected() {
            self.device_ever_connected = true;
            if self.keyboard_override_active {
                self.keyboard_override_active = false;
                self.keyboard_override_column = None;
                info!("control surface connected; keyboard override off");
            }
        } else if self.keyboard_fallback && !self.keyboard_override_active {
            self.keyboard_override_active = true;
            self.keyboard_override_column = None;
            info!("control surface lost; keyboard override on");
        }
    }
}

impl std::fmt::Debug for CompositionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionScheduler")
            .field("columns", &self.columns)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("elapsed_seconds", &self.elapsed_seconds)
            .field("keyboard_override", &self.keyboard_override())
            .field("keyboard_override_column", &self.keyboard_override_column)
            .field("visible_columns", &self.visible_columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::SurfaceConfig;
    use crate::render::Rgba;
    use crate::surface::testing::LoopbackTransport;

    /// Scene that paints its buffer white and records calls.
    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Scene for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn setup(&mut self, _buffer: &mut FrameBuffer, column_index: usize) {
            self.log
                .lock()
                .unwrap()
                .push(format!("setup {} {}", self.name, column_index));
        }

        fn draw(&mut self, buffer: &mut FrameBuffer, context: &SceneDrawContext<'_>) {
            buffer.fill(Rgba::new(1.0, 1.0, 1.0, 1.0));
            self.log.lock().unwrap().push(format!(
                "draw {} {} {:.2}",
                self.name, context.column_index, context.audio_level
            ));
        }
    }

    fn probe(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> SceneDescriptor {
        let log = log.clone();
        SceneDescriptor::new(name, move || Probe {
            name,
            log: log.clone(),
        })
    }

    fn library(log: &Arc<Mutex<Vec<String>>>) -> SceneLibrary {
        SceneLibrary::new()
            .with_column(vec![probe("A0", log), probe("A1", log)])
            .with_column(Vec::new())
            .with_column(vec![probe("C0", log)])
    }

    fn surface_config() -> SurfaceConfig {
        SurfaceConfig {
            columns: 3,
            rows: 8,
            ..SurfaceConfig::default()
        }
    }

    fn scheduler_with(
        transport: Option<LoopbackTransport>,
        keyboard_fallback: bool,
    ) -> (CompositionScheduler, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let driver = match transport {
            Some(transport) => ControlSurfaceDriver::new(&surface_config(), Box::new(transport)),
            None => ControlSurfaceDriver::disconnected(&surface_config()),
        };
        let config = CompositorConfig {
            keyboard_fallback,
            ..CompositorConfig::default()
        };
        let scheduler = CompositionScheduler::new(driver, &library(&log), &config, 4, 4);
        (scheduler, log)
    }

    fn fader(column: u8, value: u8) -> [u8; 3] {
        [0xB0, 48 + column, value]
    }

    #[test]
    fn setup_instantiates_first_variants() {
        let (scheduler, log) = scheduler_with(None, true);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["setup A0 0".to_string(), "setup C0 2".to_string()]
        );
        assert_eq!(scheduler.columns()[0].scene_index(), Some(0));
        assert!(!scheduler.columns()[1].has_scene());
        assert_eq!(scheduler.driver().column_scene_count(0), 2);
    }

    #[test]
    fn keyboard_override_shows_one_column() {
        let (mut scheduler, log) = scheduler_with(None, true);
        scheduler.update(0.016, FrameInputs::default());
        assert!(scheduler.keyboard_override());
        assert_eq!(scheduler.column_opacity(0), 0.0);
        assert_eq!(scheduler.column_opacity(2), 0.0);

        scheduler.handle_keyboard_selection(Some(2));
        log.lock().unwrap().clear();
        scheduler.update(
            0.016,
            FrameInputs {
                audio_level: 3.0,
                ..FrameInputs::default()
            },
        );
        assert_eq!(*log.lock().unwrap(), vec!["draw C0 2 1.00".to_string()]);

        let mut canvas = FrameBuffer::new(4, 4);
        scheduler.composite(&mut canvas);
        assert_eq!(scheduler.visible_column_count(), 1);
        assert_eq!(canvas.pixel(0, 0).unwrap().r, 1.0);
    }

    #[test]
    fn cycling_advances_variant_and_wraps() {
        let (mut scheduler, log) = scheduler_with(None, true);
        scheduler.update(0.016, FrameInputs::default());

        scheduler.cycle_keyboard_selection(0);
        assert_eq!(scheduler.driver().column_scene_selection(0), Some(1));
        assert_eq!(scheduler.keyboard_override_column(), Some(0));
        log.lock().unwrap().clear();
        scheduler.update(0.016, FrameInputs::default());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["setup A1 0".to_string(), "draw A1 0 0.00".to_string()]
        );

        scheduler.cycle_keyboard_selection(0);
        assert_eq!(scheduler.driver().column_scene_selection(0), Some(0));

        scheduler.cycle_keyboard_selection(1);
        assert_eq!(scheduler.keyboard_override_column(), None);
    }

    #[test]
    fn device_mode_follows_faders_and_latches() {
        let transport = LoopbackTransport::available();
        let (mut scheduler, _) = scheduler_with(Some(transport.clone()), true);
        transport.push(&fader(0, 127));
        transport.push(&fader(2, 64));
        scheduler.update(0.016, FrameInputs::default());

        assert!(!scheduler.keyboard_override());
        assert_eq!(scheduler.column_opacity(0), 1.0);
        assert!((scheduler.column_opacity(2) - 64.0 / 127.0).abs() < 1e-6);

        transport.push(&[0x90, 100, 127]);
        scheduler.update(0.016, FrameInputs::default());
        assert_eq!(scheduler.column_opacity(0), 0.0);

        scheduler.handle_keyboard_selection(Some(0));
        assert_eq!(scheduler.keyboard_override_column(), None);
    }

    #[test]
    fn losing_the_device_darkens_every_column() {
        let transport = LoopbackTransport::available();
        let (mut scheduler, _) = scheduler_with(Some(transport.clone()), true);
        transport.push(&fader(0, 127));
        transport.push(&fader(2, 127));
        scheduler.update(0.016, FrameInputs::default());
        assert_eq!(scheduler.column_opacity(0), 1.0);

        transport.set_available(false);
        scheduler.update(0.016, FrameInputs::default());
        assert!(scheduler.keyboard_override());
        assert_eq!(scheduler.keyboard_override_column(), None);
        for column in 0..3 {
            assert_eq!(scheduler.column_opacity(column), 0.0);
        }

        let mut canvas = FrameBuffer::new(4, 4);
        scheduler.composite(&mut canvas);
        assert_eq!(scheduler.visible_column_count(), 0);
    }

    #[test]
    fn zero_fader_shows_columns_until_a_device_appears() {
        let transport = LoopbackTransport::default();
        let (mut scheduler, _) = scheduler_with(Some(transport.clone()), false);
        scheduler.update(0.016, FrameInputs::default());
        assert!(!scheduler.keyboard_override());
        assert_eq!(scheduler.column_opacity(0), 1.0);

        transport.set_available(true);
        scheduler.update(0.016, FrameInputs::default());
        assert_eq!(scheduler.column_opacity(0), 0.0);

        transport.set_available(false);
        scheduler.update(0.016, FrameInputs::default());
        assert_eq!(scheduler.column_opacity(0), 0.0);
    }

    #[test]
    fn background_fader_sets_fade_alpha() {
        let transport = LoopbackTransport::available();
        let (mut scheduler, _) = scheduler_with(Some(transport.clone()), true);
        transport.push(&fader(3, 127));
        scheduler.update(0.016, FrameInputs::default());

        let mut canvas = FrameBuffer::new(2, 2);
        canvas.fill(Rgba::new(1.0, 0.0, 0.0, 1.0));
        scheduler.composite(&mut canvas);
        assert_eq!(canvas.pixel(0, 0).unwrap().r, 1.0);

        transport.push(&fader(3, 0));
        scheduler.update(0.016, FrameInputs::default());
        scheduler.composite(&mut canvas);
        assert_eq!(canvas.pixel(0, 0).unwrap().r, 0.0);
    }

    #[test]
    fn composite_before_first_update_only_fades() {
        let (mut scheduler, _) = scheduler_with(None, false);
        let mut canvas = FrameBuffer::new(4, 4);
        scheduler.composite(&mut canvas);
        assert_eq!(scheduler.visible_column_count(), 0);
        assert_eq!(canvas.pixel(0, 0).unwrap(), Rgba::BLACK);
    }

    #[test]
    fn reset_beat_reinstantiates_scenes() {
        let (mut scheduler, log) = scheduler_with(None, true);
        scheduler.update(0.5, FrameInputs::default());
        assert!((scheduler.elapsed_seconds() - 0.5).abs() < 1e-6);

        scheduler.reset_beat();
        assert_eq!(scheduler.elapsed_seconds(), 0.0);
        assert!(!scheduler.columns()[0].has_scene());

        log.lock().unwrap().clear();
        scheduler.update(0.016, FrameInputs::default());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["setup A0 0".to_string(), "setup C0 2".to_string()]
        );
    }

    #[test]
    fn resize_rebuilds_buffers_and_reruns_setup() {
        let (mut scheduler, log) = scheduler_with(None, true);
        log.lock().unwrap().clear();
        scheduler.resize(16, 9);
        assert_eq!(scheduler.columns()[2].buffer().width(), 16);
        assert_eq!(scheduler.columns()[1].buffer().height(), 9);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["setup A0 0".to_string(), "setup C0 2".to_string()]
        );
    }

    #[test]
    fn toggles_reach_scenes_smoothed() {
        let (mut scheduler, _) = scheduler_with(None, true);
        scheduler.toggle_parameter(1);
        scheduler.set_parameter(4, true);
        scheduler.toggle_parameter(42);
        scheduler.update(0.1, FrameInputs::default());

        assert_eq!(scheduler.toggle_states()[1], 1.0);
        assert_eq!(scheduler.toggle_states()[4], 1.0);
        assert!((scheduler.smoothed_toggle_states()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn overlay_reports_columns() {
        let (mut scheduler, _) = scheduler_with(None, true);
        assert!(scheduler.debug_overlay(60.0).is_none());
        scheduler.toggle_debug_overlay();
        scheduler.update(0.016, FrameInputs::default());
        scheduler.handle_keyboard_selection(Some(0));

        let lines = scheduler.debug_overlay(60.0).unwrap();
        assert_eq!(lines[0], "Canvas: 4×4");
        assert!(lines.contains(&"Keyboard Override: col 1".to_string()));
        assert!(lines.contains(&"Scene Slots: 3".to_string()));
        assert!(lines.contains(&"Col 1: sel 1/2, α 1.00, A0".to_string()));
        assert!(lines.contains(&"Col 2: sel —/0, α 0.00, —".to_string()));
    }
}
