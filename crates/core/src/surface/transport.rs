//! Raw byte transports for the control surface.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use crate::{ColumnVjError, Result};

/// A message pipe to the physical device.
///
/// Inbound messages are queued by the transport and drained once per frame
/// tick, so all driver state changes happen on the render thread.
pub trait SurfaceTransport {
    /// Whether the device can currently be written to.
    fn is_available(&self) -> bool;

    /// Moves every message received since the last call into `out`.
    fn drain_incoming(&mut self, out: &mut Vec<Vec<u8>>);

    /// Fire-and-forget write. Failures are the transport's to log.
    fn send(&mut self, message: &[u8]);
}

/// Transport used when no device is present.
#[derive(Debug, Default)]
pub struct NullTransport;

impl SurfaceTransport for NullTransport {
    fn is_available(&self) -> bool {
        false
    }

    fn drain_incoming(&mut self, _out: &mut Vec<Vec<u8>>) {}

    fn send(&mut self, _message: &[u8]) {}
}

/// Hardware transport backed by `midir` input/output connections.
pub struct MidirTransport {
    _input: MidiInputConnection<()>,
    output: MidiOutputConnection,
    incoming: Receiver<Vec<u8>>,
    available: bool,
    port: String,
}

impl MidirTransport {
    /// Opens the first input port whose name contains `port_name`, or the
    /// first port at all, and the output port that best matches it.
    pub fn connect(port_name: Option<&str>, queue_capacity: usize) -> Result<Self> {
        let mut midi_in = MidiInput::new("column-vj-in").map_err(midi_error)?;
        midi_in.ignore(Ignore::All);
        let midi_out = MidiOutput::new("column-vj-out").map_err(midi_error)?;

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|port| {
                let name = midi_in.port_name(port).unwrap_or_default();
                port_name.map_or(true, |wanted| name.contains(wanted))
            })
            .ok_or_else(|| {
                ColumnVjError::Midi(format!(
                    "no input port matching {}",
                    port_name.unwrap_or("<any>")
                ))
            })?
            .clone();
        let in_name = midi_in.port_name(&in_port).unwrap_or_default();

        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|port| midi_out.port_name(port).unwrap_or_default() == in_name)
            .or_else(|| {
                out_ports.iter().find(|port| {
                    let name = midi_out.port_name(port).unwrap_or_default();
                    port_name.map_or(true, |wanted| name.contains(wanted))
                })
            })
            .ok_or_else(|| ColumnVjError::Midi(format!("no output port for {in_name}")))?
            .clone();

        let (sender, incoming): (SyncSender<Vec<u8>>, _) = mpsc::sync_channel(queue_capacity);
        let input = midi_in
            .connect(
                &in_port,
                "column-vj-surface",
                move |_stamp, message, _| match sender.try_send(message.to_vec()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => debug!("surface queue full; dropping message"),
                    Err(TrySendError::Disconnected(_)) => {}
                },
                (),
            )
            .map_err(midi_error)?;
        let output = midi_out
            .connect(&out_port, "column-vj-surface")
            .map_err(midi_error)?;

        info!(port = %in_name, "control surface connected");

        Ok(Self {
            _input: input,
            output,
            incoming,
            available: true,
            port: in_name,
        })
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl SurfaceTransport for MidirTransport {
    fn is_available(&self) -> bool {
        self.available
    }

    fn drain_incoming(&mut self, out: &mut Vec<Vec<u8>>) {
        out.extend(self.incoming.try_iter());
    }

    fn send(&mut self, message: &[u8]) {
        if !self.available {
            return;
        }
        if let Err(err) = self.output.send(message) {
            warn!(port = %self.port, %err, "control surface write failed; marking unavailable");
            self.available = false;
        }
    }
}

impl std::fmt::Debug for MidirTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidirTransport")
            .field("port", &self.port)
            .field("available", &self.available)
            .finish()
    }
}

pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new("column-vj-list").map_err(midi_error)?;
    midi_in
        .ports()
        .iter()
        .map(|port| midi_in.port_name(port).map_err(midi_error))
        .collect()
}

pub fn list_output_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("column-vj-list").map_err(midi_error)?;
    midi_out
        .ports()
        .iter()
        .map(|port| midi_out.port_name(port).map_err(midi_error))
        .collect()
}

fn midi_error(err: impl std::fmt::Display) -> ColumnVjError {
    ColumnVjError::Midi(err.to_string())
}
