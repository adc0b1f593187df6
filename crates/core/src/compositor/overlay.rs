use super::toggles::TOGGLE_LABELS;

/// Placeholder shown for an absent selection or scene name.
pub const NONE_LABEL: &str = "—";

/// Keyboard override state as shown on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardStatus {
    Column(usize),
    NoColumn,
    Inactive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatus {
    pub selection: Option<usize>,
    pub count: usize,
    pub opacity: f32,
    pub scene_name: String,
}

/// Everything the status panel reports for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStatus<'a> {
    pub width: usize,
    pub height: usize,
    pub frame_rate: f32,
    pub elapsed_seconds: f32,
    pub connected: bool,
    pub keyboard: KeyboardStatus,
    pub background_fader: f32,
    pub visible_columns: usize,
    pub scene_slots: usize,
    pub toggles: &'a [f32],
    pub toggles_smooth: &'a [f32],
    pub toggle_time_constant: f32,
    pub audio_level: f32,
    pub audio_debug: bool,
    pub spectrum: &'a [f32],
    pub columns: Vec<ColumnStatus>,
}

/// Renders the panel text, one entry per line.
pub fn format_lines(status: &OverlayStatus<'_>) -> Vec<String> {
    let keyboard = match status.keyboard {
        KeyboardStatus::Column(column) => format!("col {}", column + 1),
        KeyboardStatus::NoColumn => "none".to_string(),
        KeyboardStatus::Inactive => "inactive".to_string(),
    };

    let mut lines = vec![
        format!("Canvas: {}×{}", status.width, status.height),
        format!("FrameRate: {:.1} fps", status.frame_rate),
        format!("Elapsed: {:.1} s", status.elapsed_seconds),
        format!(
            "MIDI Connected: {}",
            if status.connected { "yes" } else { "no" }
        ),
        format!("Keyboard Override: {keyboard}"),
        format!("Background Fader: {:.2}", status.background_fader),
        format!("Visible Columns: {}", status.visible_columns),
        format!("Scene Slots: {}", status.scene_slots),
    ];

    let toggles = toggle_segments(status.toggles, |v| format!("{v:.0}"));
    lines.push(format!("Toggles: {toggles}"));
    let smooth = toggle_segments(status.toggles_smooth, |v| format!("{v:.2}"));
    lines.push(format!(
        "Toggles Smooth ({}s): {smooth}",
        status.toggle_time_constant
    ));

    let source = if status.audio_debug { "debug" } else { "live" };
    lines.push(format!(
        "Audio Level (norm): {:.3} ({source})",
        status.audio_level
    ));
    lines.push(format!(
        "Audio Source: {}",
        if status.audio_debug {
            "debug noise"
        } else {
            "microphone"
        }
    ));

    if let (Some(low), Some(high)) = (status.spectrum.first(), status.spectrum.last()) {
        let mid = status.spectrum[status.spectrum.len() / 2];
        lines.push(format!(
            "Spectrum Low/Mid/High (norm): {low:.2} / {mid:.2} / {high:.2}"
        ));
    }

    for (index, column) in status.columns.iter().enumerate() {
        let selection = column
            .selection
            .map(|s| (s + 1).to_string())
            .unwrap_or_else(|| NONE_LABEL.to_string());
        lines.push(format!(
            "Col {}: sel {selection}/{}, α {:.2}, {}",
            index + 1,
            column.count,
            column.opacity,
            column.scene_name
        ));
    }

    lines
}

fn toggle_segments(values: &[f32], format: impl Fn(f32) -> String) -> String {
    TOGGLE_LABELS
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let value = values.get(index).copied().unwrap_or(0.0);
            format!("{label}:{}", format(value))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
