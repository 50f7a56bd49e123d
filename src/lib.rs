//! # roomchat
//!
//! Multi-session terminal chat rooms over a shared `SQLite` file.
//!
//! Each participant runs their own process. A session appends framed
//! messages to a room, while a background watcher polls the same room and
//! relays whatever the session has not seen yet.
//!
//! ## Features
//!
//! - **Room store**: durable rooms with serialized appends and an update
//!   signal that coordinates watchers and sessions
//! - **Cursor diffs**: each session tracks how far it has read, so history
//!   is never replayed and its own messages are not echoed twice
//! - **Structured shutdown**: leaving a room waits for the watcher thread
//!   to exit before control returns to the menu
//! - **Unicode aware**: message frames are laid out by grapheme cluster

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod core;
pub mod error;
pub mod format;
pub mod storage;
pub mod sync;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Account, Room, RoomSummary, UpdateSignal};

// Re-export storage types
pub use storage::{AccountStore, DEFAULT_DB_PATH, RoomStore, SqliteStorage, StorageStats};

// Re-export engine types
pub use app::ChatApp;
pub use config::ChatConfig;
pub use console::Console;
pub use format::format_message;
pub use sync::{
    RelayMessage, SessionOutcome, SessionReport, SessionState, compute_diff, diff_since, relay,
    run_session,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
