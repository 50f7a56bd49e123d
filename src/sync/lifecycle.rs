//! Session lifecycle coordinator.
//!
//! Drives one user's stay in one room through
//! `JOINING -> ACTIVE -> LEAVING -> TERMINATED` and owns the watcher thread
//! for that stay. [`run_session`] only returns once the watcher has exited.

use crate::config::ChatConfig;
use crate::console::Console;
use crate::core::UpdateSignal;
use crate::error::{Result, SessionError};
use crate::storage::RoomStore;
use crate::sync::relay::{RelayReceiver, relay};
use crate::sync::session::{LoopExit, SessionLoop, SessionOutcome, SessionState, SessionStats};
use crate::sync::watcher::{Watcher, WatcherHandle};
use tokio::io::AsyncWrite;
use tracing::Instrument;

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// How the session ended.
    pub outcome: SessionOutcome,
    /// Message counters.
    pub stats: SessionStats,
    /// Poll intervals spent waiting for the watcher to exit.
    pub shutdown_ticks: u32,
    /// Relay items discarded while shutting down.
    pub discarded: usize,
}

/// Runs a complete session for `user` in `room`.
///
/// `store` serves the foreground loop; `open_watcher_store` is called once
/// to give the watcher thread its own connection to the same database.
///
/// # Errors
///
/// - `StorageError::RoomNotFound` if the room does not exist (nothing is
///   started in that case).
/// - `SessionError::WatcherFailed` if the watcher stopped without the room
///   being closed.
/// - `SessionError::WatcherStuck` if the watcher outlived the shutdown
///   limit.
pub async fn run_session<S, WS, W, F>(
    store: &mut S,
    open_watcher_store: F,
    console: &mut Console<W>,
    user: &str,
    room: &str,
    config: &ChatConfig,
) -> Result<SessionReport>
where
    S: RoomStore,
    WS: RoomStore + 'static,
    W: AsyncWrite + Unpin,
    F: FnOnce() -> Result<WS>,
{
    config.validate()?;

    let mut state = SessionState::Joining;
    tracing::debug!(room, user, %state, "session state");
    let cursor = enter_room(store, console, room).await?;

    let (tx, mut rx) = relay(config.relay_capacity);
    let watcher = Watcher::new(open_watcher_store()?, room, cursor, tx, config).spawn()?;

    state = state.next();
    tracing::debug!(room, user, %state, cursor, "session state");

    let (exit, stats) = {
        let mut session = SessionLoop::new(
            store,
            console,
            &mut rx,
            user,
            room,
            cursor,
            config.clear_lines,
        );
        let span = tracing::debug_span!("session", room, user);
        let exit = match session.print_prompt().await {
            Ok(()) => session.run().instrument(span).await,
            Err(e) => Err(e),
        };
        (exit, session.stats())
    };

    state = state.next();
    tracing::debug!(room, user, %state, "session state");

    let exit = match exit {
        Ok(exit) => exit,
        Err(e) => {
            watcher.cancel();
            if let Err(shutdown) = await_watcher_exit(&watcher, &mut rx, config).await {
                tracing::warn!(room, error = %shutdown, "watcher shutdown failed after session error");
            }
            return Err(e);
        }
    };

    let (shutdown_ticks, mut discarded) = await_watcher_exit(&watcher, &mut rx, config).await?;

    let watcher_exit = watcher.join();
    discarded += rx.drain();
    rx.close();

    state = state.next();
    tracing::debug!(room, user, %state, shutdown_ticks, discarded, "session state");

    let outcome = match exit {
        LoopExit::Quit => SessionOutcome::Left,
        LoopExit::InputClosed => SessionOutcome::InputClosed,
        LoopExit::RoomClosed => SessionOutcome::RoomClosed,
        LoopExit::WatcherGone => {
            return Err(match watcher_exit {
                Err(e) => e,
                Ok(reason) => SessionError::WatcherFailed {
                    reason: format!("relay closed without terminate ({reason:?})"),
                }
                .into(),
            });
        }
    };
    if let Err(e) = watcher_exit {
        tracing::warn!(room, error = %e, "watcher failed while leaving");
    }

    Ok(SessionReport {
        outcome,
        stats,
        shutdown_ticks,
        discarded,
    })
}

/// Loads the room, reopens it and prints its history.
///
/// Returns the byte cursor the watcher starts from.
async fn enter_room<S: RoomStore, W: AsyncWrite + Unpin>(
    store: &mut S,
    console: &mut Console<W>,
    room: &str,
) -> Result<usize> {
    let snapshot = store.get_room(room)?;
    store.set_signal(room, UpdateSignal::None)?;

    if snapshot.is_empty() {
        console
            .println(&format!("Congratulations on joining {room}!"))
            .await?;
        console.println("Send a message!").await?;
    } else {
        console.print(&snapshot.content).await?;
    }
    console.println("Press 'q' to leave").await?;

    Ok(snapshot.size())
}

/// Waits for the watcher to exit, one poll interval at a time.
///
/// The relay is drained on every pass so a full channel can never keep the
/// watcher blocked. Returns the intervals waited and the items discarded.
async fn await_watcher_exit(
    watcher: &WatcherHandle,
    relay: &mut RelayReceiver,
    config: &ChatConfig,
) -> Result<(u32, usize)> {
    let mut ticks = 0;
    let mut discarded = 0;

    loop {
        discarded += relay.drain();
        if watcher.is_finished() {
            return Ok((ticks, discarded));
        }
        if ticks >= config.shutdown_limit_ticks {
            return Err(SessionError::WatcherStuck { ticks }.into());
        }
        if ticks == config.shutdown_grace_ticks {
            tracing::warn!(ticks, "watcher still running, cancelling");
            watcher.cancel();
        }

        tokio::time::sleep(config.poll_interval).await;
        ticks += 1;
    }
}
