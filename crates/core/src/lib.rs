//! Core library for the Column VJ performance rig.
//!
//! A grid of visual scenes is arranged in columns and blended live under the
//! control of a grid + fader controller, modulated by microphone input and a
//! tempo clock. Each module owns one subsystem: the controller protocol
//! (`surface`), scene scheduling and blending (`compositor`), audio
//! normalisation (`analysis`, `audio`), the beat clock (`timeline`) and the
//! software canvas scenes draw into (`render`).

pub mod analysis;
pub mod audio;
pub mod compositor;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod scene;
pub mod surface;
pub mod timeline;

pub use analysis::{SampleHistory, SignalNormalizer, SpectrumAnalyzer};
pub use audio::{MicrophoneCapture, SampleSource};
pub use compositor::{ColumnSlot, CompositionScheduler, FrameInputs, ToggleBank};
pub use config::{AppConfig, AudioConfig, CompositorConfig, SurfaceConfig, TempoConfig};
pub use error::{ColumnVjError, Result};
pub use input::KeyCommand;
pub use render::{FrameBuffer, Rgba};
pub use scene::{Scene, SceneDescriptor, SceneDrawContext, SceneLibrary};
pub use surface::{
    ControlSurfaceAddressSpace, ControlSurfaceDriver, MidirTransport, NullTransport,
    SurfaceMessage, SurfaceTransport,
};
pub use timeline::{BeatClock, BeatSnapshot, TempoTracker, TransportState};
