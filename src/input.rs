//! Terminal input parsing.
//!
//! The binary reads stdin line by line. A line holds either a command word
//! or raw arrow-key escape sequences (`ESC [ D` / `ESC [ C`), which a
//! terminal in line mode passes through when the user presses the arrows
//! before Enter.

use crate::core::{Button, InputField};

/// Navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    /// Any other escape sequence (up/down, home, ...).
    Other,
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Activate a navigation button.
    Press(Button),
    /// One or more key presses, in order.
    Keys(Vec<Key>),
    /// Start a sampling draw.
    Draw,
    /// Change a numeric input.
    Set { field: InputField, raw: String },
    /// Jump to a step (1-based on the command line, stored 0-based).
    Goto(usize),
    Help,
    Quit,
    /// Anything unrecognised, kept for the error message.
    Unknown(String),
}

/// Parse one line of user input.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.contains('\x1B') {
        let keys = parse_escape_keys(line);
        if !keys.is_empty() {
            return Command::Keys(keys);
        }
    }

    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Command::Press(Button::Next);
    };

    match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Command::Press(Button::Next),
        "p" | "prev" | "previous" => Command::Press(Button::Prev),
        "r" | "reset" => Command::Press(Button::Reset),
        "s" | "sample" | "draw" => Command::Draw,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "g" | "goto" => match words.next().and_then(|w| w.parse::<usize>().ok()) {
            Some(n) if n > 0 => Command::Goto(n - 1),
            _ => Command::Unknown(line.to_string()),
        },
        "set" => {
            let field = words.next().and_then(InputField::from_id);
            let raw = words.collect::<Vec<_>>().join(" ");
            match field {
                Some(field) => Command::Set { field, raw },
                None => Command::Unknown(line.to_string()),
            }
        }
        _ => Command::Unknown(line.to_string()),
    }
}

/// Extract CSI arrow sequences from a line.
///
/// Both `ESC [ X` and the application-mode `ESC O X` forms are accepted.
/// Returns an empty vector if anything other than escape sequences and
/// whitespace is present.
pub fn parse_escape_keys(line: &str) -> Vec<Key> {
    let bytes = line.as_bytes();
    let mut keys = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            0x1B if i + 2 < bytes.len() && matches!(bytes[i + 1], b'[' | b'O') => {
                keys.push(match bytes[i + 2] {
                    b'D' => Key::ArrowLeft,
                    b'C' => Key::ArrowRight,
                    _ => Key::Other,
                });
                i += 3;
            }
            b' ' | b'\t' => i += 1,
            _ => return Vec::new(),
        }
    }

    keys
}
