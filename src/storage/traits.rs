//! Storage trait definitions.
//!
//! The engine only talks to these traits, so every component receives its
//! store handle explicitly and tests can swap backends.

use crate::core::{Account, Room, RoomSummary, UpdateSignal};
use crate::error::{Error, Result, StorageError};
use serde::Serialize;

/// Durable, name-keyed room storage.
///
/// Implementations must serialize `append_content` per room: two
/// concurrent appends never lose either contribution.
pub trait RoomStore: Send {
    /// Initializes storage (creates schema, runs migrations).
    ///
    /// Should be idempotent - safe to call multiple times.
    fn init(&mut self) -> Result<()>;

    /// Checks if storage is initialized.
    fn is_initialized(&self) -> Result<bool>;

    /// Creates an empty room.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RoomExists` if the name is taken.
    fn create_room(&mut self, name: &str) -> Result<Room>;

    /// Checks whether a room exists.
    fn room_exists(&self, name: &str) -> Result<bool>;

    /// Loads a room.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RoomNotFound` if there is no such room.
    fn get_room(&self, name: &str) -> Result<Room>;

    /// Atomically appends `text` to the room content and returns the room
    /// as it is right after the append.
    fn append_content(&mut self, name: &str, text: &str) -> Result<Room>;

    /// Overwrites the update signal.
    fn set_signal(&mut self, name: &str, signal: UpdateSignal) -> Result<()>;

    /// Reads the update signal.
    fn get_signal(&self, name: &str) -> Result<UpdateSignal>;

    /// Moves the signal to `PENDING` unless the room is closed.
    ///
    /// Returns false if the room was closed.
    fn raise_pending(&mut self, name: &str) -> Result<bool>;

    /// Moves the signal from `PENDING` back to `NONE`.
    ///
    /// Returns false if the signal was not pending.
    fn acknowledge_pending(&mut self, name: &str) -> Result<bool>;

    /// Lists all rooms ordered by name.
    fn list_rooms(&self) -> Result<Vec<RoomSummary>>;

    /// Gets storage statistics.
    fn stats(&self) -> Result<StorageStats>;
}

/// Account storage consumed by the login flow.
pub trait AccountStore: Send {
    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UserExists` if the username is taken.
    fn create_user(&mut self, username: &str, password: &str) -> Result<()>;

    /// Checks whether a username is registered.
    fn user_exists(&self, username: &str) -> Result<bool>;

    /// Loads an account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UserNotFound` if there is no such user.
    fn get_user(&self, username: &str) -> Result<Account>;

    /// Verifies a username/password pair.
    ///
    /// Unknown users verify as false.
    fn verify_login(&self, username: &str, password: &str) -> Result<bool> {
        match self.get_user(username) {
            Ok(account) => Ok(account.matches(password)),
            Err(Error::Storage(StorageError::UserNotFound { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Storage statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    /// Number of rooms.
    pub room_count: usize,
    /// Number of registered accounts.
    pub account_count: usize,
    /// Number of rooms currently closed.
    pub closed_rooms: usize,
    /// Total size of all room content in bytes.
    pub total_content_size: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
