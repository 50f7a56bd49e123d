//! Background watcher: polls one room and feeds its session's relay.
//!
//! The watcher owns its own store connection and runs on a dedicated OS
//! thread, so a session stuck on input or output cannot starve polling.
//! It stops when the room is closed, when its cancellation token fires, or
//! when the session drops the relay.

use crate::config::ChatConfig;
use crate::error::{Result, SessionError};
use crate::storage::RoomStore;
use crate::sync::diff::diff_since;
use crate::sync::relay::{RelayMessage, RelaySender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Name shared by all watcher threads; the room is recorded on the span.
const THREAD_NAME: &str = "room-watcher";

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Nothing new.
    Idle,
    /// New content beyond the cursor; the room was marked `PENDING`.
    NewContent {
        /// Byte offset of `text` within the room content.
        start: usize,
        /// The new content.
        text: String,
    },
    /// The room signal is `CLOSED`.
    Closed,
}

/// Why a watcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherExit {
    /// Observed `CLOSED` and sent `Terminate`.
    Closed,
    /// The cancellation token fired.
    Cancelled,
    /// The session dropped its end of the relay.
    RelayClosed,
}

/// Polls a room and relays what its session has not seen.
pub struct Watcher<S> {
    store: S,
    room: String,
    cursor: usize,
    relay: RelaySender,
    interval: Duration,
    max_store_failures: u32,
    cancel: CancellationToken,
}

impl<S: RoomStore> Watcher<S> {
    /// Creates a watcher starting at `cursor` (usually the room size at
    /// join time, so history is not replayed).
    pub fn new(
        store: S,
        room: impl Into<String>,
        cursor: usize,
        relay: RelaySender,
        config: &ChatConfig,
    ) -> Self {
        Self {
            store,
            room: room.into(),
            cursor,
            relay,
            interval: config.poll_interval,
            max_store_failures: config.max_store_failures,
            cancel: CancellationToken::new(),
        }
    }

    /// Byte offset up to which content has been relayed.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Performs one poll.
    ///
    /// Reads the signal first; a closed room wins over pending content.
    pub fn tick(&mut self) -> Result<Tick> {
        if self.store.get_signal(&self.room)?.is_closed() {
            return Ok(Tick::Closed);
        }

        let room = self.store.get_room(&self.room)?;
        let Some(diff) = diff_since(&room.content, self.cursor) else {
            return Ok(Tick::Idle);
        };
        let (start, text) = (diff.start, diff.text.to_string());

        if !self.store.raise_pending(&self.room)? {
            tracing::debug!(room = %self.room, "room closed while diffing");
        }
        self.cursor = start + text.len();

        Ok(Tick::NewContent { start, text })
    }

    /// Runs the poll loop on the current thread until the watcher stops.
    ///
    /// Transient store errors are retried on the next tick; after
    /// `max_store_failures` in a row the watcher gives up.
    pub fn run(mut self) -> Result<WatcherExit> {
        let mut failures = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!(room = %self.room, "watcher cancelled");
                return Ok(WatcherExit::Cancelled);
            }

            match self.tick() {
                Ok(Tick::Idle) => failures = 0,
                Ok(Tick::NewContent { start, text }) => {
                    failures = 0;
                    tracing::debug!(room = %self.room, start, len = text.len(), "relaying new content");
                    if self
                        .relay
                        .send_blocking(RelayMessage::NewContent { start, text })
                        .is_err()
                    {
                        return Ok(WatcherExit::RelayClosed);
                    }
                }
                Ok(Tick::Closed) => {
                    tracing::debug!(room = %self.room, "room closed, terminating");
                    // The session may already be gone; nothing left to tell it.
                    let _ = self.relay.send_blocking(RelayMessage::Terminate);
                    return Ok(WatcherExit::Closed);
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(room = %self.room, failures, error = %e, "watcher poll failed");
                    if failures >= self.max_store_failures {
                        return Err(SessionError::WatcherFailed {
                            reason: e.to_string(),
                        }
                        .into());
                    }
                }
            }

            if self.relay.is_closed() {
                return Ok(WatcherExit::RelayClosed);
            }
            self.pause();
        }
    }

    /// Sleeps one interval, waking early if cancelled.
    fn pause(&self) {
        let deadline = Instant::now() + self.interval;
        while !self.cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::park_timeout(deadline - now);
        }
    }
}

impl<S: RoomStore + 'static> Watcher<S> {
    /// Starts the watcher on its own named thread.
    pub fn spawn(self) -> Result<WatcherHandle> {
        let cancel = self.cancel.clone();
        let span = tracing::debug_span!("watcher", room = %self.room);

        let thread = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let _entered = span.enter();
                self.run()
            })
            .map_err(|e| SessionError::SpawnFailed(e.to_string()))?;

        Ok(WatcherHandle { thread, cancel })
    }
}

/// Supervision handle for a spawned watcher.
pub struct WatcherHandle {
    thread: JoinHandle<Result<WatcherExit>>,
    cancel: CancellationToken,
}

impl WatcherHandle {
    /// True once the watcher thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Asks the watcher to stop without waiting for `CLOSED`.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.thread.thread().unpark();
    }

    /// Waits for the watcher thread and returns how it stopped.
    ///
    /// Blocks; call it once `is_finished` is true.
    pub fn join(self) -> Result<WatcherExit> {
        self.thread
            .join()
            .map_err(|_| SessionError::WatcherPanicked)?
    }
}
