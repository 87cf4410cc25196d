use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the pieces of the engine that touch the outside world.
///
/// Navigation itself never fails; these only come out of storage areas and
/// keymap parsing, and the deck logs and swallows storage errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file-backed storage area failed.
    #[error("failed to access store {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file-backed storage area holds something other than a JSON object of strings.
    #[error("store {path} is not a valid JSON object: {source}")]
    StoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A key chord such as `ctrl+shift+enter` could not be parsed.
    #[error("invalid key chord '{chord}': {reason}")]
    InvalidChord { chord: String, reason: String },

    /// A control named a command the deck does not have.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, Error>;
