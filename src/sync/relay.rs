//! Relay: the bounded hand-off from a watcher to its session.
//!
//! Single producer (the watcher thread, which sends blocking) and single
//! consumer (the session loop, which receives async or non-blocking).
//! Messages arrive in the order the watcher sent them.

use crate::error::RelayError;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Item carried on the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// Content the watcher found beyond its cursor.
    NewContent {
        /// Byte offset of `text` within the room content.
        start: usize,
        /// The new content.
        text: String,
    },
    /// The room was closed; no more messages follow.
    Terminate,
}

/// Creates a relay with room for `capacity` pending messages.
///
/// # Panics
///
/// Panics if `capacity` is zero; `ChatConfig::validate` rejects that.
#[must_use]
pub fn relay(capacity: usize) -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (RelaySender { tx }, RelayReceiver { rx })
}

/// Watcher side of the relay.
#[derive(Debug)]
pub struct RelaySender {
    tx: mpsc::Sender<RelayMessage>,
}

impl RelaySender {
    /// Sends a message, waiting for space if the relay is full.
    ///
    /// Must be called outside an async runtime (the watcher thread).
    pub fn send_blocking(&self, message: RelayMessage) -> Result<(), RelayError> {
        self.tx
            .blocking_send(message)
            .map_err(|_| RelayError::Disconnected)
    }

    /// True once the session dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Session side of the relay.
#[derive(Debug)]
pub struct RelayReceiver {
    rx: mpsc::Receiver<RelayMessage>,
}

impl RelayReceiver {
    /// Waits for the next message; `None` once the watcher is gone and the
    /// relay is empty.
    ///
    /// Cancel safe, so it can sit in a `tokio::select!` next to input.
    pub async fn recv(&mut self) -> Option<RelayMessage> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    ///
    /// An empty relay is the normal case and yields `Ok(None)`; only a
    /// watcher that went away is an error.
    pub fn try_next(&mut self) -> Result<Option<RelayMessage>, RelayError> {
        match self.rx.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RelayError::Disconnected),
        }
    }

    /// Discards everything currently queued and returns how many items
    /// were dropped.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(Some(_)) = self.try_next() {
            dropped += 1;
        }
        dropped
    }

    /// Closes the relay: the watcher's next send fails. Queued items can
    /// still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
