//! Grid controller protocol state machine and LED feedback.
//!
//! [`ControlSurfaceDriver`] turns the raw message stream of a grid + fader +
//! fader-button controller into per-column selection, fader and latch state,
//! and mirrors that state back onto the device LEDs. LED writes are batched:
//! state changes only mark LEDs dirty and [`ControlSurfaceDriver::update`]
//! flushes each dirty LED once per frame.

pub mod address;
pub mod message;
pub mod transport;

use std::collections::BTreeSet;

use tracing::{debug, info};

pub use address::{ControlSurfaceAddressSpace, FaderTarget};
pub use message::SurfaceMessage;
pub use transport::{MidirTransport, NullTransport, SurfaceTransport};

use crate::config::SurfaceConfig;

/// Channel used for grid LED writes (full-brightness palette page).
const GRID_LED_CHANNEL: u8 = 6;
/// Channel used for fader button LED writes.
const FADER_BUTTON_LED_CHANNEL: u8 = 0;

/// Fader readings for every column plus the background fader.
#[derive(Debug, Clone, PartialEq)]
pub struct FaderState {
    raw: Vec<f32>,
    effective: Vec<f32>,
    background: f32,
}

impl FaderState {
    fn new(columns: usize) -> Self {
        Self {
            raw: vec![0.0; columns],
            effective: vec![0.0; columns],
            background: 0.0,
        }
    }

    pub fn raw(&self, column: usize) -> f32 {
        self.raw.get(column).copied().unwrap_or(0.0)
    }

    pub fn effective(&self, column: usize) -> f32 {
        self.effective.get(column).copied().unwrap_or(0.0)
    }

    pub fn background(&self) -> f32 {
        self.background
    }
}

pub struct ControlSurfaceDriver {
    address: ControlSurfaceAddressSpace,
    transport: Box<dyn SurfaceTransport>,
    faders: FaderState,
    latched: Vec<bool>,
    selections: Vec<Option<usize>>,
    counts: Vec<usize>,
    active_velocities: Vec<u8>,
    dim_velocity: u8,
    latch_velocity: u8,
    dirty_columns: BTreeSet<usize>,
    dirty_fader_buttons: BTreeSet<usize>,
    inbox: Vec<Vec<u8>>,
    connected: bool,
    initialized: bool,
}

impl ControlSurfaceDriver {
    pub fn new(config: &SurfaceConfig, transport: Box<dyn SurfaceTransport>) -> Self {
        let columns = config.columns;
        Self {
            address: ControlSurfaceAddressSpace::new(columns, config.rows),
            transport,
            faders: FaderState::new(columns),
            latched: vec![false; columns],
            selections: vec![None; columns],
            counts: vec![0; columns],
            active_velocities: (0..columns).map(|c| config.active_velocity(c)).collect(),
            dim_velocity: config.dim_velocity,
            latch_velocity: config.latch_velocity,
            dirty_columns: BTreeSet::new(),
            dirty_fader_buttons: BTreeSet::new(),
            inbox: Vec::new(),
            connected: false,
            initialized: false,
        }
    }

    /// Driver with no device attached.
    pub fn disconnected(config: &SurfaceConfig) -> Self {
        Self::new(config, Box::new(NullTransport))
    }

    pub fn address_space(&self) -> ControlSurfaceAddressSpace {
        self.address
    }

    pub fn column_count(&self) -> usize {
        self.address.columns()
    }

    pub fn row_count(&self) -> usize {
        self.address.rows()
    }

    /// Sets how many variants each column offers, clamped to the row count.
    /// Columns missing from `counts` get zero.
    pub fn configure_slots(&mut self, counts: &[usize]) {
        let rows = self.address.rows();
        for column in 0..self.column_count() {
            let count = counts.get(column).copied().unwrap_or(0).min(rows);
            self.counts[column] = count;

            let selection = &mut self.selections[column];
            *selection = match *selection {
                _ if count == 0 => None,
                None => Some(0),
                Some(index) if index >= count => Some(count - 1),
                keep => keep,
            };

            self.dirty_columns.insert(column);
        }
    }

    /// Decodes one raw message and applies it. Anything outside the address
    /// space is dropped without complaint.
    pub fn handle_message(&mut self, bytes: &[u8]) {
        let Some(message) = SurfaceMessage::parse(bytes) else {
            debug!(?bytes, "dropping malformed surface message");
            return;
        };

        match message {
            SurfaceMessage::NoteOn { .. } => {
                let Some(note) = message.press() else {
                    return;
                };
                if let Some(column) = self.address.fader_button_column(note) {
                    self.toggle_latch(column, note);
                } else if let Some((column, row)) = self.address.grid_cell(note) {
                    if row < self.counts[column] {
                        self.set_column_scene_selection(column, row);
                    }
                } else {
                    debug!(note, "press outside the grid");
                }
            }
            SurfaceMessage::ControlChange {
                controller, value, ..
            } => self.handle_fader(controller, value),
            SurfaceMessage::NoteOff { .. } => {}
        }
    }

    fn handle_fader(&mut self, controller: u8, value: u8) {
        let normalized = f32::from(value) / 127.0;
        match self.address.fader_target(controller) {
            Some(FaderTarget::Column(column)) => {
                self.faders.raw[column] = normalized;
                if !self.latched[column] {
                    self.faders.effective[column] = normalized;
                }
            }
            Some(FaderTarget::Background) => self.faders.background = normalized,
            None => debug!(controller, "control change outside the fader range"),
        }
    }

    fn toggle_latch(&mut self, column: usize, note: u8) {
        let latched = !self.latched[column];
        self.latched[column] = latched;
        self.faders.effective[column] = if latched {
            0.0
        } else {
            self.faders.raw[column]
        };

        let velocity = if latched { self.latch_velocity } else { 0 };
        self.send_note(FADER_BUTTON_LED_CHANNEL, note, velocity);
        self.dirty_fader_buttons.insert(column);
    }

    /// Selects `index` for `column`, clamped into the configured range.
    /// Clears the selection when the column has no variants.
    pub fn set_column_scene_selection(&mut self, column: usize, index: usize) {
        if column >= self.column_count() {
            return;
        }

        let count = self.counts[column];
        let next = (count > 0).then(|| index.min(count - 1));
        if self.selections[column] != next {
            self.selections[column] = next;
            self.dirty_columns.insert(column);
        }
    }

    /// Changes the palette velocity lit on a column's selected row.
    pub fn set_column_active_velocity(&mut self, column: usize, velocity: u8) {
        if let Some(slot) = self.active_velocities.get_mut(column) {
            *slot = velocity.min(127);
            self.dirty_columns.insert(column);
        }
    }

    /// Effective fader for a column (0 while latched). The index right after
    /// the last column reads the background fader.
    pub fn fader_value(&self, column: usize) -> f32 {
        if column < self.column_count() {
            self.faders.effective(column)
        } else if column == self.column_count() {
            self.faders.background
        } else {
            0.0
        }
    }

    pub fn background_fader_value(&self) -> f32 {
        self.faders.background
    }

    pub fn faders(&self) -> &FaderState {
        &self.faders
    }

    pub fn is_latched(&self, column: usize) -> bool {
        self.latched.get(column).copied().unwrap_or(false)
    }

    pub fn column_scene_selection(&self, column: usize) -> Option<usize> {
        self.selections.get(column).copied().flatten()
    }

    pub fn column_scene_count(&self, column: usize) -> usize {
        self.counts.get(column).copied().unwrap_or(0)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// True once the transport has reported its availability at least once,
    /// whether or not a device was found.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Per-frame tick: tracks availability, applies queued input and flushes
    /// dirty LEDs.
    pub fn update(&mut self) {
        let available = self.transport.is_available();
        if !self.initialized || available != self.connected {
            self.on_availability_changed(available);
        }

        let mut inbox = std::mem::take(&mut self.inbox);
        self.transport.drain_incoming(&mut inbox);
        for message in inbox.drain(..) {
            self.handle_message(&message);
        }
        self.inbox = inbox;

        self.flush_pending_leds();
    }

    fn on_availability_changed(&mut self, available: bool) {
        self.connected = available;
        self.initialized = true;
        if available {
            info!("control surface available; resyncing LEDs");
            self.clear_all_leds();
            self.refresh_all_leds();
        } else {
            info!("control surface unavailable");
        }
    }

    fn flush_pending_leds(&mut self) {
        if !self.connected {
            return;
        }

        for column in std::mem::take(&mut self.dirty_columns) {
            self.render_column_leds(column);
        }
        for column in std::mem::take(&mut self.dirty_fader_buttons) {
            self.render_fader_button_led(column);
        }
    }

    fn refresh_all_leds(&mut self) {
        for column in 0..self.column_count() {
            self.render_column_leds(column);
            self.render_fader_button_led(column);
        }
        self.dirty_columns.clear();
        self.dirty_fader_buttons.clear();
    }

    fn clear_all_leds(&mut self) {
        for note in 0..self.address.grid_note_count() {
            self.send_note(GRID_LED_CHANNEL, note as u8, 0);
        }
        for column in 0..self.column_count() {
            if let Some(note) = self.address.fader_button_note(column) {
                self.send_note(FADER_BUTTON_LED_CHANNEL, note, 0);
            }
        }
    }

    fn render_column_leds(&mut self, column: usize) {
        let count = self.counts[column];
        let selected = self.selections[column];
        for row in 0..self.row_count() {
            let Some(note) = self.address.grid_note(column, row) else {
                continue;
            };
            let velocity = match row {
                r if r >= count => 0,
                r if selected == Some(r) => self.active_velocities[column],
                _ => self.dim_velocity,
            };
            self.send_note(GRID_LED_CHANNEL, note, velocity);
        }
    }

    fn render_fader_button_led(&mut self, column: usize) {
        let Some(note) = self.address.fader_button_note(column) else {
            return;
        };
        let velocity = if self.latched[column] {
            self.latch_velocity
        } else {
            0
        };
        self.send_note(FADER_BUTTON_LED_CHANNEL, note, velocity);
    }

    fn send_note(&mut self, channel: u8, note: u8, velocity: u8) {
        if !self.connected {
            return;
        }
        let message = SurfaceMessage::NoteOn {
            channel,
            note,
            velocity,
        };
        self.transport.send(&message.to_bytes());
    }
}

impl std::fmt::Debug for ControlSurfaceDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSurfaceDriver")
            .field("address", &self.address)
            .field("faders", &self.faders)
            .field("latched", &self.latched)
            .field("selections", &self.selections)
            .field("counts", &self.counts)
            .field("connected", &self.connected)
            .field("initialized", &self.initialized)
            .finish()
    }
}

/// In-memory transport for tests: records writes and lets the test inject
/// input and flip availability through a shared handle.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::SurfaceTransport;

    #[derive(Debug, Default)]
    pub struct Wire {
        pub available: bool,
        pub incoming: Vec<Vec<u8>>,
        pub sent: Vec<Vec<u8>>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct LoopbackTransport {
        pub wire: Arc<Mutex<Wire>>,
    }

    impl LoopbackTransport {
        pub fn available() -> Self {
            let transport = Self::default();
            transport.wire.lock().unwrap().available = true;
            transport
        }

        pub fn set_available(&self, available: bool) {
            self.wire.lock().unwrap().available = available;
        }

        pub fn push(&self, bytes: &[u8]) {
            self.wire.lock().unwrap().incoming.push(bytes.to_vec());
        }

        pub fn take_sent(&self) -> Vec<Vec<u8>> {
            std::mem::take(&mut self.wire.lock().unwrap().sent)
        }
    }

    impl SurfaceTransport for LoopbackTransport {
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
}
