//! Keyboard fallback commands.

use tracing::debug;

use crate::analysis::SignalNormalizer;
use crate::compositor::{CompositionScheduler, TOGGLE_COUNT};
use crate::timeline::TempoTracker;

const TOGGLE_KEYS: [char; TOGGLE_COUNT] = ['z', 'x', 'c', 'v', 'b', 'n', 'm'];
const CYCLE_KEYS: [char; 8] = ['q', 'w', 'e', 'r', 't', 'y', 'u', 'i'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleOverlay,
    ToggleParameter(usize),
    TapTempo,
    /// Restart the tempo count and reset every column's scene.
    RestartTempo,
    ToggleAudioDebug,
    ClearColumn,
    SelectColumn(usize),
    CycleColumn(usize),
}

impl KeyCommand {
    /// Maps a key name (case-insensitive) to its command.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        match key.as_str() {
            "p" => return Some(Self::ToggleOverlay),
            "enter" | "return" => return Some(Self::TapTempo),
            "shift" | "s" => return Some(Self::RestartTempo),
            "a" => return Some(Self::ToggleAudioDebug),
            "0" => return Some(Self::ClearColumn),
            _ => {}
        }

        let mut chars = key.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if let Some(index) = TOGGLE_KEYS.iter().position(|&k| k == c) {
            return Some(Self::ToggleParameter(index));
        }
        if let Some(column) = CYCLE_KEYS.iter().position(|&k| k == c) {
            return Some(Self::CycleColumn(column));
        }
        match c.to_digit(10) {
            Some(digit @ 1..=8) => Some(Self::SelectColumn(digit as usize - 1)),
            _ => None,
        }
    }

    /// Column commands only act while no control surface is connected.
    pub fn needs_keyboard_override(self) -> bool {
        matches!(
            self,
            Self::ClearColumn | Self::SelectColumn(_) | Self::CycleColumn(_)
        )
    }

    pub fn apply(
        self,
        scheduler: &mut CompositionScheduler,
        tempo: &mut TempoTracker,
        audio: &mut SignalNormalizer,
    ) {
        if self.needs_keyboard_override() && scheduler.driver().is_connected() {
            debug!(command = ?self, "ignoring column key while a device is connected");
            return;
        }

        match self {
            Self::ToggleOverlay => scheduler.toggle_debug_overlay(),
            Self::ToggleParameter(index) => scheduler.toggle_parameter(index),
            Self::TapTempo => tempo.tap_tempo(),
            Self::RestartTempo => {
                tempo.restart();
                scheduler.reset_beat();
            }
            Self::ToggleAudioDebug => {
                audio.toggle_debug_mode();
            }
            Self::ClearColumn => scheduler.handle_keyboard_selection(None),
            Self::SelectColumn(column) => scheduler.handle_keyboard_selection(Some(column)),
            Self::CycleColumn(column) => scheduler.cycle_keyboard_selection(column),
        }
    }
}
