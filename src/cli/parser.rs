//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{ChatConfig, DEFAULT_POLL_INTERVAL_MS};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// roomchat: terminal chat rooms over a shared `SQLite` file.
///
/// Every participant runs their own process against the same database;
/// sessions see each other's messages by polling the room.
#[derive(Parser, Debug)]
#[command(name = "roomchat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the chat database file.
    ///
    /// Defaults to `.roomchat/chatroom.db` in the current directory.
    #[arg(short, long, env = "ROOMCHAT_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Watcher poll interval in milliseconds.
    #[arg(long, env = "ROOMCHAT_POLL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_ms: u64,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the chat database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show database statistics.
    Status,

    /// List all rooms.
    #[command(alias = "ls")]
    Rooms,

    /// Create an empty room.
    CreateRoom {
        /// Room name.
        name: String,
    },

    /// Register a user account.
    AddUser {
        /// Username.
        name: String,

        /// Password.
        password: String,
    },

    /// Print a room's content.
    History {
        /// Room name.
        room: String,
    },

    /// Append one message to a room.
    Send {
        /// Room name.
        room: String,

        /// Sending user (must exist).
        #[arg(short, long)]
        user: String,

        /// Message text.
        text: String,
    },

    /// Start the interactive chat.
    Chat {
        /// Log in as this user, skipping the login menu.
        #[arg(short, long)]
        user: Option<String>,

        /// Join this room right after login.
        #[arg(short, long)]
        room: Option<String>,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }

    /// Builds the session configuration from the command line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the resulting configuration is invalid.
    pub fn chat_config(&self) -> Result<ChatConfig> {
        let config = ChatConfig::with_poll_interval(Duration::from_millis(self.poll_ms));
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn make_cli(command: Commands) -> Cli {
        Cli {
            db_path: None,
            poll_ms: DEFAULT_POLL_INTERVAL_MS,
            verbose: false,
            format: "text".to_string(),
            command,
        }
    }

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_db_path() {
        let cli = make_cli(Commands::Status);
        assert_eq!(
            cli.get_db_path(),
            PathBuf::from(crate::storage::DEFAULT_DB_PATH)
        );
    }

    #[test]
    fn test_custom_db_path() {
        let cli = Cli {
            db_path: Some(PathBuf::from("/custom/path.db")),
            ..make_cli(Commands::Status)
        };
        assert_eq!(cli.get_db_path(), PathBuf::from("/custom/path.db"));
    }

    #[test]
    fn test_chat_config_from_poll_ms() {
        let cli = Cli {
            poll_ms: 250,
            ..make_cli(Commands::Rooms)
        };
        let config = cli.chat_config().unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(250));

        let cli = Cli {
            poll_ms: 0,
            ..make_cli(Commands::Rooms)
        };
        assert!(cli.chat_config().is_err());
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "roomchat", "send", "lobby", "--user", "alice", "hello there",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Send { ref room, ref user, ref text }
                if room == "lobby" && user == "alice" && text == "hello there"
        ));
    }

    #[test]
    fn test_parse_chat_options() {
        let cli = Cli::try_parse_from(["roomchat", "chat", "-u", "bob", "-r", "lobby"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Chat {
                user: Some(_),
                room: Some(_)
            }
        ));
    }
}
