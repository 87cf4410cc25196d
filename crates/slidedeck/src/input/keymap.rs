use std::fmt;
use std::str::FromStr;

use super::{Key, KeyInput};
use crate::error::Error;

/// A key plus the exact set of modifiers it needs.
///
/// `command` stands for Ctrl or Cmd, so one chord serves every platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub key: Key,
    pub command: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Chord {
    pub fn command(key: Key) -> Self {
        Self {
            key,
            command: true,
            shift: false,
            alt: false,
        }
    }

    pub fn alt(key: Key) -> Self {
        Self {
            key,
            command: false,
            shift: false,
            alt: true,
        }
    }

    pub fn shifted(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn matches(&self, input: &KeyInput) -> bool {
        let mods = input.modifiers;
        self.key.matches(&input.key)
            && self.command == mods.command()
            && self.shift == mods.shift
            && self.alt == mods.alt
    }
}

impl FromStr for Chord {
    type Err = Error;

    /// Parse `ctrl+shift+enter`, `cmd+k`, `alt+Enter`, ... `ctrl`, `cmd` and
    /// `meta` all mean the platform shortcut modifier.
    fn from_str(chord: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidChord {
            chord: chord.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = chord.split('+').map(str::trim).collect();
        let Some((key_name, modifiers)) = parts.split_last() else {
            return Err(invalid("empty chord"));
        };
        if key_name.is_empty() {
            return Err(invalid("missing key"));
        }

        let mut parsed = Self {
            key: Key::from_name(key_name),
            command: false,
            shift: false,
            alt: false,
        };
        for modifier in modifiers {
            let slot = match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" | "meta" => &mut parsed.command,
                "shift" => &mut parsed.shift,
                "alt" | "option" => &mut parsed.alt,
                _ => return Err(invalid(&format!("unknown modifier '{modifier}'"))),
            };
            if std::mem::replace(slot, true) {
                return Err(invalid(&format!("modifier '{modifier}' given twice")));
            }
        }
        Ok(parsed)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command {
            f.write_str("ctrl+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// The global quick-command chords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    pub panel: Chord,
    pub resume: Chord,
    pub start: Chord,
    pub join_notes: Chord,
    pub full_screen: Chord,
    pub end: Chord,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            panel: Chord::command(Key::Char('k')),
            resume: Chord::command(Key::Enter),
            start: Chord::command(Key::Enter).shifted(),
            join_notes: Chord::alt(Key::Enter),
            full_screen: Chord::command(Key::Char('f')).shifted(),
            end: Chord::command(Key::Char('e')).shifted(),
        }
    }
}
