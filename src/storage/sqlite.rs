//! `SQLite` storage implementation.
//!
//! Every session component opens its own connection to the same database
//! file. WAL mode lets the watcher read while a session writes, and appends
//! run inside an immediate transaction so writers to a room are serialized.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::room::current_timestamp;
use crate::core::{Account, Room, RoomSummary, UpdateSignal};
use crate::error::{IoError, Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{AccountStore, RoomStore, StorageStats};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits for a competing writer before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage implementation.
///
/// # Examples
///
/// ```no_run
/// use roomchat::storage::{RoomStore, SqliteStorage};
///
/// let mut storage = SqliteStorage::open("chatroom.db").unwrap();
/// storage.init().unwrap();
/// ```
pub struct SqliteStorage {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| IoError::DirectoryFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(StorageError::from)?;

        // WAL lets watchers read while a session holds the write lock
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// Useful for testing. An in-memory database is private to its
    /// connection, so it cannot back a watcher.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the current schema version.
    fn get_schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    /// Sets the schema version.
    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Reads a room through any connection (plain or transaction).
    fn read_room(conn: &Connection, name: &str) -> Result<Option<Room>> {
        let row = conn
            .query_row(
                r"
            SELECT room_name, room_content, room_update, created_at, updated_at
            FROM rooms WHERE room_name = ?
        ",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(StorageError::from)?;

        let Some((name, content, update, created_at, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Room {
            name,
            content,
            update_signal: update.parse()?,
            created_at,
            updated_at,
        }))
    }

    fn room_not_found(name: &str) -> StorageError {
        StorageError::RoomNotFound {
            name: name.to_string(),
        }
    }
}

impl RoomStore for SqliteStorage {
    fn init(&mut self) -> Result<()> {
        let is_init: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;

        if is_init == 0 {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .map_err(StorageError::from)?;
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        } else if let Some(current) = self.get_schema_version()?
            && current < CURRENT_SCHEMA_VERSION
        {
            for migration in crate::storage::schema::get_migrations_from(current) {
                tracing::info!(
                    from = migration.from_version,
                    to = migration.to_version,
                    "running schema migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
            }
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn create_room(&mut self, name: &str) -> Result<Room> {
        let room = Room::new(name.to_string());

        let inserted = self
            .conn
            .execute(
                r"
            INSERT OR IGNORE INTO rooms (room_name, room_content, room_update, created_at, updated_at)
            VALUES (?, '', ?, ?, ?)
        ",
                params![
                    room.name,
                    UpdateSignal::None.as_db_str(),
                    room.created_at,
                    room.updated_at
                ],
            )
            .map_err(StorageError::from)?;

        if inserted == 0 {
            return Err(StorageError::RoomExists {
                name: name.to_string(),
            }
            .into());
        }

        tracing::debug!(room = name, "room created");
        Ok(room)
    }

    fn room_exists(&self, name: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM rooms WHERE room_name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(found.is_some())
    }

    fn get_room(&self, name: &str) -> Result<Room> {
        Self::read_room(&self.conn, name)?.ok_or_else(|| Self::room_not_found(name).into())
    }

    fn append_content(&mut self, name: &str, text: &str) -> Result<Room> {
        // IMMEDIATE takes the write lock up front; dropping the transaction
        // on any error path rolls back and releases it.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        let changed = tx
            .execute(
                r"
            UPDATE rooms SET room_content = room_content || ?, updated_at = ?
            WHERE room_name = ?
        ",
                params![text, current_timestamp(), name],
            )
            .map_err(StorageError::from)?;

        if changed == 0 {
            return Err(Self::room_not_found(name).into());
        }

        let room = Self::read_room(&tx, name)?.ok_or_else(|| Self::room_not_found(name))?;
        tx.commit().map_err(StorageError::from)?;

        tracing::trace!(room = name, appended = text.len(), size = room.size(), "content appended");
        Ok(room)
    }

    fn set_signal(&mut self, name: &str, signal: UpdateSignal) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE rooms SET room_update = ? WHERE room_name = ?",
                params![signal.as_db_str(), name],
            )
            .map_err(StorageError::from)?;

        if changed == 0 {
            return Err(Self::room_not_found(name).into());
        }
        Ok(())
    }

    fn get_signal(&self, name: &str) -> Result<UpdateSignal> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT room_update FROM rooms WHERE room_name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;

        let raw = raw.ok_or_else(|| Self::room_not_found(name))?;
        Ok(raw.parse()?)
    }

    fn raise_pending(&mut self, name: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE rooms SET room_update = ? WHERE room_name = ? AND room_update != ?",
                params![
                    UpdateSignal::Pending.as_db_str(),
                    name,
                    UpdateSignal::Closed.as_db_str()
                ],
            )
            .map_err(StorageError::from)?;
        Ok(changed > 0)
    }

    fn acknowledge_pending(&mut self, name: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE rooms SET room_update = ? WHERE room_name = ? AND room_update = ?",
                params![
                    UpdateSignal::None.as_db_str(),
                    name,
                    UpdateSignal::Pending.as_db_str()
                ],
            )
            .map_err(StorageError::from)?;
        Ok(changed > 0)
    }

    fn list_rooms(&self) -> Result<Vec<RoomSummary>> {
        let mut stmt = self
            .conn
            .prepare(
                r"
            SELECT room_name, LENGTH(CAST(room_content AS BLOB)), room_update, updated_at
            FROM rooms ORDER BY room_name
        ",
            )
            .map_err(StorageError::from)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|(name, size, update, updated_at)| -> Result<RoomSummary> {
                Ok(RoomSummary {
                    name,
                    size: size as usize,
                    update_signal: update.parse()?,
                    updated_at,
                })
            })
            .collect()
    }

    fn stats(&self) -> Result<StorageStats> {
        let (room_count, closed_rooms, total_content_size): (i64, i64, i64) = self
            .conn
            .query_row(
                r"
            SELECT COUNT(*),
                   COALESCE(SUM(room_update = '-1'), 0),
                   COALESCE(SUM(LENGTH(CAST(room_content AS BLOB))), 0)
            FROM rooms
        ",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(StorageError::from)?;

        let account_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len());

        Ok(StorageStats {
            room_count: room_count as usize,
            account_count: account_count as usize,
            closed_rooms: closed_rooms as usize,
            total_content_size: total_content_size as usize,
            schema_version: self.get_schema_version()?.unwrap_or(0),
            db_size,
        })
    }
}

impl AccountStore for SqliteStorage {
    fn create_user(&mut self, username: &str, password: &str) -> Result<()> {
        let account = Account::new(username.to_string(), password.to_string());
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO accounts (username, password, created_at) VALUES (?, ?, ?)",
                params![account.username, account.password, account.created_at],
            )
            .map_err(StorageError::from)?;

        if inserted == 0 {
            return Err(StorageError::UserExists {
                name: username.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn user_exists(&self, username: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM accounts WHERE username = ?",
                params![username],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(found.is_some())
    }

    fn get_user(&self, username: &str) -> Result<Account> {
        self.conn
            .query_row(
                "SELECT username, password, created_at FROM accounts WHERE username = ?",
                params![username],
                |row| {
                    Ok(Account {
                        username: row.get(0)?,
                        password: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| {
                StorageError::UserNotFound {
                    name: username.to_string(),
                }
                .into()
            })
    }
}
