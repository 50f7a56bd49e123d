//! Error types for roomchat operations.
//!
//! This module provides the error hierarchy using `thiserror` for the room
//! store, the synchronization engine, the relay and the CLI.
//!
//! A relay with no pending item is deliberately absent from this hierarchy:
//! a non-blocking receive reports it as `Ok(None)`.

use thiserror::Error;

/// Result type alias for roomchat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session lifecycle errors.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Relay channel errors.
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    /// I/O errors (console and file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Returns true for errors the user can recover from by re-prompting
    /// (missing or duplicate rooms and accounts).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Storage(
                StorageError::RoomNotFound { .. }
                    | StorageError::RoomExists { .. }
                    | StorageError::UserNotFound { .. }
                    | StorageError::UserExists { .. }
            )
        )
    }
}

/// Storage-specific errors for database operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The shared store could not be opened, read or written.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Storage not initialized (init command not run).
    #[error("roomchat not initialized. Run: roomchat init")]
    NotInitialized,

    /// Room not found by name.
    #[error("room not found: {name}")]
    RoomNotFound {
        /// Room name that was not found.
        name: String,
    },

    /// A room with this name already exists.
    #[error("room already exists: {name}")]
    RoomExists {
        /// Conflicting room name.
        name: String,
    },

    /// Account not found by username.
    #[error("user not found: {name}")]
    UserNotFound {
        /// Username that was not found.
        name: String,
    },

    /// An account with this username already exists.
    #[error("user already exists: {name}")]
    UserExists {
        /// Conflicting username.
        name: String,
    },

    /// Stored update signal is not one of `0`, `1`, `-1`.
    #[error("invalid update signal: {0:?}")]
    InvalidSignal(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Errors raised while running a room session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The watcher thread could not be started.
    #[error("failed to spawn watcher: {0}")]
    SpawnFailed(String),

    /// The watcher thread panicked.
    #[error("watcher panicked")]
    WatcherPanicked,

    /// The watcher did not exit within the shutdown limit.
    #[error("watcher did not exit after {ticks} poll intervals")]
    WatcherStuck {
        /// Number of poll intervals waited.
        ticks: u32,
    },

    /// The watcher gave up after repeated store failures.
    #[error("watcher stopped: {reason}")]
    WatcherFailed {
        /// Reason reported by the watcher.
        reason: String,
    },
}

/// Relay channel errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// The other end of the relay is gone.
    #[error("relay disconnected")]
    Disconnected,
}

/// I/O-specific errors.
#[derive(Error, Debug)]
pub enum IoError {
    /// Console input ended or failed.
    #[error("console closed")]
    ConsoleClosed,

    /// Failed to write to the console.
    #[error("failed to write output: {0}")]
    WriteFailed(String),

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Unavailable(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config {
            message: "poll interval must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: poll interval must be greater than zero"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotInitialized;
        assert_eq!(err.to_string(), "roomchat not initialized. Run: roomchat init");

        let err = StorageError::RoomNotFound {
            name: "lobby".to_string(),
        };
        assert_eq!(err.to_string(), "room not found: lobby");

        let err = StorageError::InvalidSignal("7".to_string());
        assert_eq!(err.to_string(), "invalid update signal: \"7\"");
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::WatcherStuck { ticks: 10 };
        assert_eq!(
            err.to_string(),
            "watcher did not exit after 10 poll intervals"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        let err: Error = StorageError::RoomExists {
            name: "lobby".to_string(),
        }
        .into();
        assert!(err.is_recoverable());

        let err: Error = StorageError::UserNotFound {
            name: "alice".to_string(),
        }
        .into();
        assert!(err.is_recoverable());

        let err: Error = StorageError::Unavailable("disk gone".to_string()).into();
        assert!(!err.is_recoverable());

        let err: Error = RelayError::Disconnected.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(IoError::Generic(_))));
    }

    #[test]
    fn test_from_rusqlite_error_to_error() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: Error = rusqlite_err.into();
        assert!(matches!(err, Error::Storage(StorageError::Unavailable(_))));
    }

    #[test]
    fn test_from_serde_json_error_to_command_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: CommandError = json_err.into();
        assert!(matches!(err, CommandError::ExecutionFailed(_)));
    }
}
