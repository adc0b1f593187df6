//! Line-based keyboard input read from stdin on a background thread.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use column_vj_core::KeyCommand;
use tracing::{debug, warn};

/// Spawns the reader. Each line is one key name, a run of single-key
/// characters, or empty for enter.
pub fn spawn_reader() -> Receiver<KeyCommand> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("keyboard".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                for command in parse_line(&line) {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
            }
            debug!("keyboard reader finished");
        });
    if let Err(err) = spawned {
        warn!(error = %err, "keyboard reader unavailable");
    }
    rx
}

pub fn parse_line(line: &str) -> Vec<KeyCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return vec![KeyCommand::TapTempo];
    }
    if let Some(command) = KeyCommand::from_key(trimmed) {
        return vec![command];
    }
    trimmed
        .chars()
        .filter_map(|c| KeyCommand::from_key(c.encode_utf8(&mut [0; 4])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines() {
        assert_eq!(parse_line(""), vec![KeyCommand::TapTempo]);
        assert_eq!(parse_line("shift"), vec![KeyCommand::RestartTempo]);
        assert_eq!(
            parse_line("z2?"),
            vec![KeyCommand::ToggleParameter(0), KeyCommand::SelectColumn(1)]
        );
    }
}
