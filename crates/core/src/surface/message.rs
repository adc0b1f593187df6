//! Channel-voice messages spoken by the grid controller.

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// Decoded inbound or outbound message. Only the three channel-voice kinds
/// the controller uses are modelled; everything else decodes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl SurfaceMessage {
    /// Parses raw bytes, dispatching on the status nibble. Truncated messages
    /// and data bytes with the high bit set are rejected.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if data.len() < 2 || data[0] > 0x7F || data[1] > 0x7F {
            return None;
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            NOTE_ON => Some(Self::NoteOn {
                channel,
                note: data[0],
                velocity: data[1],
            }),
            NOTE_OFF => Some(Self::NoteOff {
                channel,
                note: data[0],
            }),
            CONTROL_CHANGE => Some(Self::ControlChange {
                channel,
                controller: data[0],
                value: data[1],
            }),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            Self::NoteOff { channel, note } => [NOTE_OFF | (channel & 0x0F), note & 0x7F, 0],
            Self::ControlChange {
                channel,
                controller,
                value,
            } => [
                CONTROL_CHANGE | (channel & 0x0F),
                controller & 0x7F,
                value & 0x7F,
            ],
        }
    }

    /// Note-on with non-zero velocity. Velocity 0 is a release on this device.
    pub fn press(&self) -> Option<u8> {
        match *self {
            Self::NoteOn { note, velocity, .. } if velocity > 0 => Some(note),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on_and_control_change() {
        assert_eq!(
            SurfaceMessage::parse(&[0x90, 12, 127]),
            Some(SurfaceMessage::NoteOn {
                channel: 0,
                note: 12,
                velocity: 127
            })
        );
        assert_eq!(
            SurfaceMessage::parse(&[0xB3, 48, 64]),
            Some(SurfaceMessage::ControlChange {
                channel: 3,
                controller: 48,
                value: 64
            })
        );
    }

    #[test]
    fn rejects_malformed_bytes() {
        assert_eq!(SurfaceMessage::parse(&[]), None);
        assert_eq!(SurfaceMessage::parse(&[0x90, 12]), None);
        assert_eq!(SurfaceMessage::parse(&[0x90, 200, 1]), None);
        assert_eq!(SurfaceMessage::parse(&[0xE0, 0, 64]), None);
        assert_eq!(SurfaceMessage::parse(&[0xF8]), None);
    }

    #[test]
    fn zero_velocity_is_not_a_press() {
        let release = SurfaceMessage::parse(&[0x90, 5, 0]).unwrap();
        assert_eq!(release.press(), None);
        let off = SurfaceMessage::parse(&[0x80, 5, 40]).unwrap();
        assert_eq!(off.press(), None);
        let press = SurfaceMessage::parse(&[0x90, 5, 1]).unwrap();
        assert_eq!(press.press(), Some(5));
    }

    #[test]
    fn encodes_led_writes_on_their_channel() {
        let led = SurfaceMessage::NoteOn {
            channel: 6,
            note: 56,
            velocity: 3,
        };
        assert_eq!(led.to_bytes(), [0x96, 56, 3]);
    }
}
