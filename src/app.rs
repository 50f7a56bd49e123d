//! Interactive chat application.
//!
//! Menu-driven front end over the console: log in or create an account,
//! join or create a room, chat, then decide whether to log off. The account
//! and room menus accept `q` to go back; the log-off prompt only takes yes
//! or no.

use crate::config::ChatConfig;
use crate::console::Console;
use crate::error::{Error, IoError, Result, StorageError};
use crate::storage::{AccountStore, RoomStore};
use crate::sync::{QUIT, SessionOutcome, SessionReport, run_session};
use tokio::io::AsyncWrite;

const BACK_HINT: &str = "Press 'q' to return to the main menu";

/// The interactive application for one console.
pub struct ChatApp<S, W, F> {
    store: S,
    console: Console<W>,
    open_store: F,
    config: ChatConfig,
    user: Option<String>,
    room: Option<String>,
}

impl<S, WS, W, F> ChatApp<S, W, F>
where
    S: RoomStore + AccountStore,
    WS: RoomStore + 'static,
    W: AsyncWrite + Unpin,
    F: Fn() -> Result<WS>,
{
    /// Creates the application.
    ///
    /// `open_store` opens a fresh connection for each session's watcher.
    pub const fn new(store: S, console: Console<W>, open_store: F, config: ChatConfig) -> Self {
        Self {
            store,
            console,
            open_store,
            config,
            user: None,
            room: None,
        }
    }

    /// Starts already logged in as `user`.
    #[must_use]
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    /// Joins `room` straight after login, skipping the room menu once.
    #[must_use]
    pub fn with_room(mut self, room: Option<String>) -> Self {
        self.room = room;
        self
    }

    /// Consumes the application and returns its console.
    pub fn into_console(self) -> Console<W> {
        self.console
    }

    /// Runs until the user logs off or input ends.
    pub async fn run(&mut self) -> Result<()> {
        match self.run_menus().await {
            Err(Error::Io(IoError::ConsoleClosed)) => {
                tracing::debug!("console closed, exiting");
                Ok(())
            }
            other => other,
        }
    }

    async fn run_menus(&mut self) -> Result<()> {
        loop {
            let user = self.ensure_logged_in().await?;
            tracing::info!(user = %user, "logged in");
            self.console.println("Congratulations on logging in!").await?;

            let direct = match self.room.take() {
                Some(room) => self.enter(&user, &room).await?,
                None => None,
            };
            if direct.is_none() {
                self.room_menu(&user).await?;
            }

            if self.confirm_log_off().await? {
                self.user = None;
                self.console.println("Goodbye!").await?;
                return Ok(());
            }
        }
    }

    async fn ensure_logged_in(&mut self) -> Result<String> {
        if let Some(user) = &self.user {
            return Ok(user.clone());
        }

        loop {
            self.console
                .println(
                    "Do you have an account or do you want to create one?\n\n\
                     a) Log in to my account\nb) Create account\n\n",
                )
                .await?;
            let answer = self.console.prompt().await?.trim().to_lowercase();

            let user = match answer.as_str() {
                "a" => self.log_in().await?,
                "b" => self.create_account().await?,
                _ => {
                    self.console
                        .println("\nInvalid option. Please enter 'a' to log in or 'b' to create an account.")
                        .await?;
                    continue;
                }
            };
            if let Some(user) = user {
                self.user = Some(user.clone());
                return Ok(user);
            }
        }
    }

    async fn log_in(&mut self) -> Result<Option<String>> {
        let username = loop {
            self.console.println(BACK_HINT).await?;
            self.console.println("What is your username?").await?;
            let username = self.console.prompt().await?;
            if username == QUIT {
                return Ok(None);
            }
            if self.store.user_exists(&username)? {
                break username;
            }
            self.console.println("Invalid username!\n").await?;
        };
        self.console
            .println(&format!("Thank you, {username}!"))
            .await?;

        loop {
            self.console.println("What is your password?").await?;
            self.console.println(BACK_HINT).await?;
            let password = self.console.prompt().await?;
            if password == QUIT {
                return Ok(None);
            }
            if self.store.verify_login(&username, &password)? {
                return Ok(Some(username));
            }
            tracing::debug!(user = %username, "wrong password");
            self.console.println("Incorrect password!\n").await?;
        }
    }

    async fn create_account(&mut self) -> Result<Option<String>> {
        self.console.println(BACK_HINT).await?;
        self.console.println("Please create a username").await?;
        let username = self.console.prompt().await?.trim().to_string();
        if username == QUIT {
            return Ok(None);
        }
        if username.is_empty() {
            self.console.println("Invalid username!\n").await?;
            return Ok(None);
        }

        self.console.println("Please create a password").await?;
        let password = self.console.prompt().await?;

        match self.store.create_user(&username, &password) {
            Ok(()) => Ok(Some(username)),
            Err(e) if e.is_recoverable() => {
                self.console
                    .println(&format!("{username} is already taken!\n"))
                    .await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Loops until a session has run or the user backs out with `q`.
    async fn room_menu(&mut self, user: &str) -> Result<()> {
        loop {
            self.console
                .println("Press 'a' to join a shared chat room or 'b' to create your own")
                .await?;
            let response = self.console.prompt().await?;

            match response.trim() {
                "a" => {
                    if self.join_menu(user).await?.is_some() {
                        return Ok(());
                    }
                }
                "b" => self.create_menu().await?,
                QUIT => return Ok(()),
                _ => {
                    self.console
                        .println(&format!("Invalid choice: \"{response}\""))
                        .await?;
                }
            }
        }
    }

    async fn create_menu(&mut self) -> Result<()> {
        loop {
            self.console
                .println("What is the name of the chat room you want to create?")
                .await?;
            self.console.println(BACK_HINT).await?;
            let name = self.console.prompt().await?.trim().to_string();
            if name == QUIT {
                return Ok(());
            }
            if name.is_empty() {
                continue;
            }

            match self.store.create_room(&name) {
                Ok(_) => {
                    tracing::info!(room = %name, "room created");
                    self.console
                        .println(&format!("Congratulations! You've created room {name}"))
                        .await?;
                    return Ok(());
                }
                Err(Error::Storage(StorageError::RoomExists { .. })) => {
                    self.console
                        .println(&format!(
                            "{name} already exists. Do you want to return to the main menu to join it?"
                        ))
                        .await?;
                    match self.console.prompt().await?.trim() {
                        "yes" => return Ok(()),
                        "no" => self.console.println("ok!").await?,
                        _ => self.console.println("Please write 'yes' or 'no'!\n").await?,
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn join_menu(&mut self, user: &str) -> Result<Option<SessionReport>> {
        loop {
            self.console
                .println("What is the name of the room you would like to join?")
                .await?;
            self.console.println(BACK_HINT).await?;
            let name = self.console.prompt().await?.trim().to_string();
            if name == QUIT {
                return Ok(None);
            }

            if let Some(report) = self.enter(user, &name).await? {
                return Ok(Some(report));
            }
        }
    }

    /// Runs a session; `None` if the room does not exist.
    async fn enter(&mut self, user: &str, room: &str) -> Result<Option<SessionReport>> {
        let result = run_session(
            &mut self.store,
            &self.open_store,
            &mut self.console,
            user,
            room,
            &self.config,
        )
        .await;

        match result {
            Ok(report) => {
                tracing::info!(
                    room,
                    user,
                    outcome = ?report.outcome,
                    sent = report.stats.sent,
                    received = report.stats.received,
                    "session ended"
                );
                if report.outcome == SessionOutcome::RoomClosed {
                    self.console
                        .println(&format!("\n{room} was closed."))
                        .await?;
                }
                Ok(Some(report))
            }
            Err(Error::Storage(StorageError::RoomNotFound { .. })) => {
                self.console.println("Room doesn't exist!\n").await?;
                self.console
                    .println("If you would like to create the room, please return to the main menu")
                    .await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn confirm_log_off(&mut self) -> Result<bool> {
        loop {
            self.console.println("Do you want to log off? (yes/no)").await?;
            match self.console.prompt().await?.trim().to_lowercase().as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => {
                    self.console
                        .println("\nPlease answer 'yes' or 'no'!")
                        .await?;
                }
            }
        }
    }
}
