//! Storage layer for roomchat.
//!
//! Provides the shared room store and account table using `SQLite`. Every
//! session component opens its own connection to the same file.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{AccountStore, RoomStore, StorageStats};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".roomchat/chatroom.db";
