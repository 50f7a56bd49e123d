//! Room model and the tri-state update signal.
//!
//! A room is a named, append-only text log. Its `content` is the
//! concatenation of formatted message frames; its update signal coordinates
//! the background watcher and the interactive session.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Update signal stored alongside a room.
///
/// Stored in the `room_update` column as `"0"`, `"1"` or `"-1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSignal {
    /// Nothing unseen.
    #[default]
    None,
    /// A watcher has observed content its session has not printed yet.
    Pending,
    /// A session left the room; watchers must terminate.
    Closed,
}

impl UpdateSignal {
    /// Returns the storage encoding of the signal.
    #[must_use]
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Pending => "1",
            Self::Closed => "-1",
        }
    }

    /// Returns true once the room has been closed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl FromStr for UpdateSignal {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::None),
            "1" => Ok(Self::Pending),
            "-1" => Ok(Self::Closed),
            other => Err(StorageError::InvalidSignal(other.to_string())),
        }
    }
}

impl fmt::Display for UpdateSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// A chat room as stored in the room store.
///
/// # Examples
///
/// ```
/// use roomchat::core::{Room, UpdateSignal};
///
/// let room = Room::new("lobby".to_string());
/// assert!(room.is_empty());
/// assert_eq!(room.update_signal, UpdateSignal::None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room name.
    pub name: String,

    /// Concatenated message frames.
    pub content: String,

    /// Coordination flag between watcher and session.
    pub update_signal: UpdateSignal,

    /// Unix timestamp when the room was created.
    pub created_at: i64,

    /// Unix timestamp of the last append.
    pub updated_at: i64,
}

impl Room {
    /// Creates an empty, open room.
    #[must_use]
    pub fn new(name: String) -> Self {
        let now = current_timestamp();
        Self {
            name,
            content: String::new(),
            update_signal: UpdateSignal::None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the content size in bytes.
    ///
    /// This is also the cursor a new session starts from.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns true if nothing has been said in the room yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns a summary without the content.
    #[must_use]
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            size: self.size(),
            update_signal: self.update_signal,
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight room listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room name.
    pub name: String,
    /// Content size in bytes.
    pub size: usize,
    /// Current update signal.
    pub update_signal: UpdateSignal,
    /// Unix timestamp of the last append.
    pub updated_at: i64,
}

/// Returns current Unix timestamp.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", UpdateSignal::None ; "none")]
    #[test_case("1", UpdateSignal::Pending ; "pending")]
    #[test_case("-1", UpdateSignal::Closed ; "closed")]
    #[test_case(" -1 ", UpdateSignal::Closed ; "padded")]
    fn test_signal_parse(raw: &str, expected: UpdateSignal) {
        assert_eq!(raw.parse::<UpdateSignal>().unwrap(), expected);
    }

    #[test_case("2" ; "out of range")]
    #[test_case("" ; "empty")]
    #[test_case("closed" ; "label")]
    fn test_signal_parse_invalid(raw: &str) {
        assert!(matches!(
            raw.parse::<UpdateSignal>(),
            Err(StorageError::InvalidSignal(_))
        ));
    }

    #[test]
    fn test_signal_db_encoding_round_trips() {
        for signal in [UpdateSignal::None, UpdateSignal::Pending, UpdateSignal::Closed] {
            assert_eq!(signal.as_db_str().parse::<UpdateSignal>().unwrap(), signal);
        }
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(UpdateSignal::Pending.to_string(), "pending");
        assert!(UpdateSignal::Closed.is_closed());
        assert!(!UpdateSignal::None.is_closed());
    }

    #[test]
    fn test_room_new() {
        let room = Room::new("lobby".to_string());
        assert_eq!(room.name, "lobby");
        assert!(room.is_empty());
        assert_eq!(room.size(), 0);
        assert!(room.created_at > 0);
    }

    #[test]
    fn test_room_summary() {
        let mut room = Room::new("lobby".to_string());
        room.content.push_str("hello");
        room.update_signal = UpdateSignal::Pending;

        let summary = room.summary();
        assert_eq!(summary.name, "lobby");
        assert_eq!(summary.size, 5);
        assert_eq!(summary.update_signal, UpdateSignal::Pending);
    }

    #[test]
    fn test_signal_serialization() {
        let json = serde_json::to_string(&UpdateSignal::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
    }
}
