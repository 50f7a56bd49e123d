//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{Room, RoomSummary};
use crate::error::Error;
use crate::format::unicode::{grapheme_count, truncate_graphemes};
use crate::storage::traits::StorageStats;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StorageStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats),
        OutputFormat::Json => format_json(stats),
    }
}

fn format_status_text(stats: &StorageStats) -> String {
    let mut output = String::new();
    output.push_str("roomchat status\n");
    output.push_str("===============\n\n");
    let _ = writeln!(output, "  Rooms:         {}", stats.room_count);
    let _ = writeln!(output, "  Closed rooms:  {}", stats.closed_rooms);
    let _ = writeln!(output, "  Accounts:      {}", stats.account_count);
    let _ = writeln!(
        output,
        "  Content size:  {}",
        format_size(stats.total_content_size)
    );
    let _ = writeln!(output, "  Schema:        v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:       {size} bytes");
    }
    output
}

/// Formats a room list.
#[must_use]
pub fn format_room_list(rooms: &[RoomSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_room_list_text(rooms),
        OutputFormat::Json => format_json(&rooms),
    }
}

fn format_room_list_text(rooms: &[RoomSummary]) -> String {
    if rooms.is_empty() {
        return "No rooms found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str("Rooms:\n");
    let _ = writeln!(output, "{:<24} {:<12} Signal", "Name", "Size");
    output.push_str(&"-".repeat(46));
    output.push('\n');

    for room in rooms {
        let _ = writeln!(
            output,
            "{:<24} {:<12} {}",
            truncate(&room.name, 24),
            format_size(room.size),
            room.update_signal
        );
    }

    output
}

/// Formats a room's content for `history`.
#[must_use]
pub fn format_history(room: &Room, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text if room.is_empty() => format!("{} is empty.\n", room.name),
        OutputFormat::Text => room.content.clone(),
        OutputFormat::Json => format_json(room),
    }
}

/// Formats a short confirmation message.
///
/// JSON output wraps the message with the affected name so scripts can
/// check it.
#[must_use]
pub fn format_confirmation(action: &str, name: &str, message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Confirmation<'a> {
                action: &'a str,
                name: &'a str,
                message: &'a str,
            }
            format_json(&Confirmation {
                action,
                name,
                message,
            })
        }
    }
}

/// Formats an error for display.
///
/// Text output is the error message; JSON output also carries whether the
/// user can recover by retrying.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
                recoverable: bool,
            }
            format_json(&ErrorOutput {
                error: error.to_string(),
                recoverable: error.is_recoverable(),
            })
        }
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Truncates a name to `max` grapheme clusters with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if grapheme_count(s) <= max {
        s.to_string()
    } else if max <= 3 {
        truncate_graphemes(s, max).to_string()
    } else {
        format!("{}...", truncate_graphemes(s, max - 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UpdateSignal;
    use crate::error::StorageError;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("lobby", 10), "lobby");
        assert_eq!(truncate("a-very-long-room", 8), "a-ver...");
        assert_eq!(truncate("日本語の部屋です", 5), "日本...");
    }

    #[test]
    fn test_format_status() {
        let stats = StorageStats {
            room_count: 2,
            account_count: 3,
            closed_rooms: 1,
            total_content_size: 1024,
            schema_version: 2,
            db_size: Some(4096),
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Rooms:         2"));
        assert!(text.contains("Accounts:      3"));
        assert!(text.contains("1.0 KB"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"room_count\": 2"));
    }

    #[test]
    fn test_format_room_list() {
        assert_eq!(
            format_room_list(&[], OutputFormat::Text),
            "No rooms found.\n"
        );

        let rooms = vec![RoomSummary {
            name: "lobby".to_string(),
            size: 12,
            update_signal: UpdateSignal::Pending,
            updated_at: 0,
        }];
        let text = format_room_list(&rooms, OutputFormat::Text);
        assert!(text.contains("lobby"));
        assert!(text.contains("12 B"));
        assert!(text.contains("pending"));

        let json = format_room_list(&rooms, OutputFormat::Json);
        assert!(json.contains("\"update_signal\": \"pending\""));
    }

    #[test]
    fn test_format_history() {
        let mut room = Room::new("lobby".to_string());
        assert_eq!(format_history(&room, OutputFormat::Text), "lobby is empty.\n");
        room.content = "hello\n".to_string();
        assert_eq!(format_history(&room, OutputFormat::Text), "hello\n");
    }

    #[test]
    fn test_format_error_json() {
        let err: Error = StorageError::RoomNotFound {
            name: "x".to_string(),
        }
        .into();
        let json = format_error(&err, OutputFormat::Json);
        assert!(json.contains("\"recoverable\": true"));
        assert!(json.contains("room not found: x"));
    }
}
