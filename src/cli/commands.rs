//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::app::ChatApp;
use crate::cli::output::{
    OutputFormat, format_confirmation, format_history, format_room_list, format_status,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::ChatConfig;
use crate::console::Console;
use crate::error::{CommandError, Result, StorageError};
use crate::format::format_message;
use crate::storage::{AccountStore, RoomStore, SqliteStorage};
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. The interactive `chat` command
/// writes to the terminal itself and returns an empty string.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Rooms => cmd_rooms(&db_path, format),
        Commands::CreateRoom { name } => cmd_create_room(&db_path, name, format),
        Commands::AddUser { name, password } => cmd_add_user(&db_path, name, password, format),
        Commands::History { room } => cmd_history(&db_path, room, format),
        Commands::Send { room, user, text } => cmd_send(&db_path, room, user, text, format),
        Commands::Chat { user, room } => cmd_chat(
            &db_path,
            user.clone(),
            room.clone(),
            cli.chat_config()?,
        ),
    }
}

/// Opens storage and ensures it's initialized.
fn open_storage(db_path: &Path) -> Result<SqliteStorage> {
    let storage = SqliteStorage::open(db_path)?;

    if !storage.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }

    Ok(storage)
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() || name.trim() != name {
        return Err(CommandError::InvalidArgument(format!(
            "{kind} name must be non-empty without surrounding whitespace"
        ))
        .into());
    }
    Ok(())
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
    }

    let mut storage = SqliteStorage::open(db_path)?;
    storage.init()?;
    tracing::info!(path = %db_path.display(), "database initialized");

    let path = db_path.display().to_string();
    Ok(format_confirmation(
        "init",
        &path,
        &format!("Initialized roomchat database at: {path}"),
        format,
    ))
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let stats = storage.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_rooms(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let rooms = storage.list_rooms()?;
    Ok(format_room_list(&rooms, format))
}

fn cmd_create_room(db_path: &Path, name: &str, format: OutputFormat) -> Result<String> {
    require_name("room", name)?;
    let mut storage = open_storage(db_path)?;
    storage.create_room(name)?;
    Ok(format_confirmation(
        "create-room",
        name,
        &format!("Created room {name}"),
        format,
    ))
}

fn cmd_add_user(db_path: &Path, name: &str, password: &str, format: OutputFormat) -> Result<String> {
    require_name("user", name)?;
    let mut storage = open_storage(db_path)?;
    storage.create_user(name, password)?;
    Ok(format_confirmation(
        "add-user",
        name,
        &format!("Added user {name}"),
        format,
    ))
}

fn cmd_history(db_path: &Path, room: &str, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let room = storage.get_room(room)?;
    Ok(format_history(&room, format))
}

fn cmd_send(
    db_path: &Path,
    room: &str,
    user: &str,
    text: &str,
    format: OutputFormat,
) -> Result<String> {
    if text.trim().is_empty() {
        return Err(CommandError::InvalidArgument("message text is empty".to_string()).into());
    }

    let mut storage = open_storage(db_path)?;
    if !storage.user_exists(user)? {
        return Err(StorageError::UserNotFound {
            name: user.to_string(),
        }
        .into());
    }

    let frame = format_message(user, text);
    let updated = storage.append_content(room, &frame)?;
    tracing::debug!(room, user, size = updated.size(), "message appended");

    Ok(match format {
        OutputFormat::Text => frame,
        OutputFormat::Json => format_confirmation("send", room, &frame, format),
    })
}

fn cmd_chat(
    db_path: &Path,
    user: Option<String>,
    room: Option<String>,
    config: ChatConfig,
) -> Result<String> {
    let storage = open_storage(db_path)?;
    if let Some(name) = &user
        && !storage.user_exists(name)?
    {
        return Err(StorageError::UserNotFound { name: name.clone() }.into());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to start runtime: {e}")))?;

    let watcher_path = db_path.to_path_buf();
    let result = runtime.block_on(async move {
        let open_store = move || SqliteStorage::open(&watcher_path);
        let mut app = ChatApp::new(storage, Console::stdio(), open_store, config)
            .with_user(user)
            .with_room(room);
        app.run().await
    });
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();

    result.map(|()| String::new())
}
