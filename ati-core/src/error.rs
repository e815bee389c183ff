//! Error taxonomy of the bridge.
//!
//! [`AtiError`] is returned synchronously to callers of command and setup
//! operations. [`UpdateError`] is produced on the watcher thread while turning
//! an update file into a record; it is never returned to a caller but
//! published on the [`Diagnostics`](crate::diagnostics::Diagnostics) bus.

use std::path::PathBuf;
use thiserror::Error;

pub use ati::InvalidEnumValue;

/// Errors surfaced to the caller of a bridge operation.
#[derive(Error, Debug)]
pub enum AtiError {
    /// Caller-supplied parameters cannot be encoded.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Writing a command or preparing a directory failed.
    #[error("File system error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The change-notification backend refused to start.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Settings could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Operation not allowed in the component's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The watcher thread could not be started.
    #[error("Failed to spawn watcher thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl AtiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for bridge operations.
pub type Result<T> = std::result::Result<T, AtiError>;

/// Malformed content in an update file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} ';'-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid integer in field '{field}': '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid decimal in field '{field}': '{value}'")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("update file is empty")]
    EmptyContent,
}

/// Why an update file was discarded by the watcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    InvalidEnumValue(#[from] InvalidEnumValue),

    /// The file vanished or could not be read between notification and read.
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_spawn_error_keeps_io_source() {
        let err = AtiError::Spawn(std::io::Error::new(
            std::io::ErrorKind::OutOfMemory,
            "no threads left",
        ));
        assert!(!matches!(err, AtiError::InvalidState(_)));
        assert_eq!(err.to_string(), "Failed to spawn watcher thread: no threads left");

        let source = err.source().unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::OutOfMemory);
    }

    #[test]
    fn test_update_error_wraps_parse_error() {
        let err = UpdateError::from(ParseError::EmptyContent);
        assert_eq!(err, UpdateError::Parse(ParseError::EmptyContent));
    }
}
