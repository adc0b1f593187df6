use std::sync::{Arc, Mutex};

use column_vj_core::analysis::{normalize_value, percentile, SampleHistory};
use column_vj_core::{
    AudioConfig, ColumnVjError, CompositionScheduler, CompositorConfig, ControlSurfaceDriver,
    FrameBuffer, FrameInputs, Rgba, SampleSource, Scene, SceneDescriptor, SceneDrawContext,
    SceneLibrary, SignalNormalizer, SurfaceConfig, SurfaceTransport, TempoConfig, TempoTracker,
};

#[derive(Debug, Default)]
struct Wire {
    available: bool,
    incoming: Vec<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryTransport {
    wire: Arc<Mutex<Wire>>,
}

impl MemoryTransport {
    fn connected() -> Self {
        let transport = Self::default();
        transport.set_available(true);
        transport
    }

    fn set_available(&self, available: bool) {
        self.wire.lock().unwrap().available = available;
    }

    fn push(&self, bytes: &[u8]) {
        self.wire.lock().unwrap().incoming.push(bytes.to_vec());
    }

    fn take_sent(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.wire.lock().unwrap().sent)
    }
}

impl SurfaceTransport for MemoryTransport {
    fn is_available(&self) -> bool {
        self.wire.lock().unwrap().available
    }

    fn drain_incoming(&mut self, out: &mut Vec<Vec<u8>>) {
        out.append(&mut self.wire.lock().unwrap().incoming);
    }

    fn send(&mut self, message: &[u8]) {
        self.wire.lock().unwrap().sent.push(message.to_vec());
    }
}

struct Solid;

impl Scene for Solid {
    fn name(&self) -> &str {
        "Solid"
    }

    fn setup(&mut self, _buffer: &mut FrameBuffer, _column_index: usize) {}

    fn draw(&mut self, buffer: &mut FrameBuffer, _context: &SceneDrawContext<'_>) {
        buffer.fill(Rgba::new(1.0, 1.0, 1.0, 1.0));
    }
}

fn three_column_config() -> SurfaceConfig {
    SurfaceConfig {
        columns: 3,
        ..SurfaceConfig::default()
    }
}

fn library() -> SceneLibrary {
    let solid = || SceneDescriptor::new("Solid", || Solid);
    SceneLibrary::new()
        .with_column(vec![solid(), solid()])
        .with_column(Vec::new())
        .with_column(vec![solid()])
}

fn session(transport: &MemoryTransport) -> CompositionScheduler {
    let driver = ControlSurfaceDriver::new(&three_column_config(), Box::new(transport.clone()));
    CompositionScheduler::new(driver, &library(), &CompositorConfig::default(), 8, 8)
}

#[test]
fn configure_press_and_fade() {
    let transport = MemoryTransport::connected();
    let mut scheduler = session(&transport);
    scheduler.update(1.0 / 60.0, FrameInputs::default());

    let driver = scheduler.driver();
    assert_eq!(driver.column_scene_selection(0), Some(0));
    assert_eq!(driver.column_scene_selection(1), None);
    assert_eq!(driver.column_scene_selection(2), Some(0));

    let note = driver.address_space().grid_note(0, 1).unwrap();
    transport.push(&[0x90, note, 127]);
    transport.push(&[0xB0, 48, 64]);
    scheduler.update(1.0 / 60.0, FrameInputs::default());

    let driver = scheduler.driver();
    assert_eq!(driver.column_scene_selection(0), Some(1));
    assert!((driver.faders().raw(0) - 0.504).abs() < 1e-3);
    assert_eq!(scheduler.columns()[0].scene_index(), Some(1));

    let mut canvas = FrameBuffer::new(8, 8);
    scheduler.composite(&mut canvas);
    assert_eq!(scheduler.visible_column_count(), 1);
    assert!((canvas.pixel(4, 4).unwrap().r - 64.0 / 127.0).abs() < 1e-4);
}

#[test]
fn selections_stay_in_range_across_reconfiguration() {
    let mut driver = ControlSurfaceDriver::new(&three_column_config(), Box::new(MemoryTransport::connected()));
    for counts in [[2, 0, 1], [8, 8, 8], [1, 3, 0], [0, 0, 0], [20, 2, 5]] {
        driver.configure_slots(&counts);
        for column in 0..3 {
            let count = driver.column_scene_count(column);
            match driver.column_scene_selection(column) {
                Some(index) => assert!(index < count),
                None => assert_eq!(count, 0),
            }
        }
        driver.set_column_scene_selection(0, 7);
    }
}

#[test]
fn latch_twice_restores_raw_fader() {
    let transport = MemoryTransport::connected();
    let mut driver = ControlSurfaceDriver::new(&three_column_config(), Box::new(transport.clone()));
    driver.update();
    transport.push(&[0xB0, 49, 100]);
    transport.push(&[0x90, 101, 127]);
    driver.update();
    assert_eq!(driver.fader_value(1), 0.0);

    transport.push(&[0x90, 101, 127]);
    driver.update();
    assert_eq!(driver.fader_value(1), driver.faders().raw(1));
    assert!(transport
        .take_sent()
        .iter()
        .any(|message| message.as_slice() == [0x90, 101, 0]));
}

#[test]
fn device_loss_goes_dark_on_next_update() {
    let transport = MemoryTransport::connected();
    let mut scheduler = session(&transport);
    transport.push(&[0xB0, 48, 127]);
    transport.push(&[0xB0, 50, 127]);
    scheduler.update(1.0 / 60.0, FrameInputs::default());
    assert_eq!(scheduler.column_opacity(0), 1.0);

    transport.set_available(false);
    scheduler.update(1.0 / 60.0, FrameInputs::default());
    assert!(scheduler.keyboard_override());
    assert!((0..3).all(|column| scheduler.column_opacity(column) == 0.0));

    transport.set_available(true);
    scheduler.update(1.0 / 60.0, FrameInputs::default());
    assert!(!scheduler.keyboard_override());
    assert_eq!(scheduler.column_opacity(0), 1.0);
}

#[test]
fn tapped_tempo_lands_on_the_next_beat() {
    let mut tracker = TempoTracker::new(&TempoConfig {
        initial_bpm: 90.0,
        ..TempoConfig::default()
    });
    tracker.start_at(0.0);
    for t in [0.0, 500.0, 1_000.0, 1_500.0] {
        tracker.tap_tempo_at(t);
    }
    assert_eq!(tracker.clock().pending_bpm(), Some(120.0));

    tracker.update_at(600.0);
    assert_eq!(tracker.bpm(), 90.0);
    assert_eq!(tracker.clock().beat_count(), 0);

    tracker.update_at(700.0);
    assert!(tracker.is_beat_updated_now());
    assert_eq!(tracker.bpm(), 120.0);
    assert_eq!(tracker.clock().beat_count(), 1);
}

#[test]
fn alternating_levels_normalize_around_midpoint() {
    let mut history = SampleHistory::new(10.0, 1200);
    for i in 0..20 {
        history.push(i as f64 * 0.1, if i % 2 == 0 { 0.1 } else { 0.9 });
    }
    let mut values: Vec<f32> = history.values().collect();
    let floor = percentile(&mut values, 0.1);
    let ceil = percentile(&mut values, 0.9);
    assert!((floor - 0.1).abs() < 1e-5);
    assert!((ceil - 0.9).abs() < 1e-5);
    assert!((normalize_value(0.5, floor, ceil) - 0.5).abs() < 1e-5);
}

struct Square {
    amplitude: f32,
    running: bool,
}

impl Square {
    fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            running: false,
        }
    }
}

impl SampleSource for Square {
    fn start(&mut self) -> column_vj_core::Result<()> {
        if self.amplitude < 0.0 {
            return Err(ColumnVjError::AudioDevice("denied".into()));
        }
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn read_latest(&mut self, out: &mut Vec<f32>) -> bool {
        out.clear();
        out.extend((0..256).map(|i| if i % 2 == 0 { self.amplitude } else { -self.amplitude }));
        true
    }
}

#[test]
fn normalizer_feeds_the_scheduler() {
    let config = AudioConfig {
        fft_size: 256,
        spectrum_bins: 16,
        ..AudioConfig::default()
    };
    let mut audio = SignalNormalizer::with_source(config.clone(), Box::new(Square::new(0.3)));
    audio.start().unwrap();

    let transport = MemoryTransport::default();
    let mut scheduler = session(&transport);
    scheduler.handle_keyboard_selection(Some(0));
    for frame in 0..30 {
        audio.update_at(frame as f64 / 30.0);
        scheduler.update(
            1.0 / 30.0,
            FrameInputs {
                audio_level: audio.level(),
                audio_debug: audio.is_debug_mode(),
                spectrum: audio.spectrum(),
                beat: Default::default(),
            },
        );
    }
    assert_eq!(audio.spectrum().len(), 16);
    assert!((0.0..=1.0).contains(&audio.level()));

    let mut failing = SignalNormalizer::with_source(config, Box::new(Square::new(-1.0)));
    assert!(matches!(failing.start(), Err(ColumnVjError::AudioDevice(_))));
    assert!(!failing.is_active());
    failing.update_at(1.0);
    assert_eq!(failing.history_len(), 0);
}
