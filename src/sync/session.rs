//! Session state and the interactive room loop.
//!
//! The loop multiplexes console input and relay messages with
//! `tokio::select!`: waiting for a line never delays relayed content and
//! vice versa.

use crate::console::{Console, PROMPT};
use crate::core::UpdateSignal;
use crate::error::Result;
use crate::format::format_message;
use crate::storage::RoomStore;
use crate::sync::relay::{RelayMessage, RelayReceiver};
use std::fmt;
use std::ops::Range;
use tokio::io::AsyncWrite;

/// Input that leaves the room.
pub const QUIT: &str = "q";

/// Lifecycle of one user's stay in one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Loading and printing history.
    Joining,
    /// Watcher and session loop running.
    Active,
    /// Waiting for the watcher to exit.
    Leaving,
    /// Watcher gone, relay drained.
    Terminated,
}

impl SessionState {
    /// Returns the state that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Joining => Self::Active,
            Self::Active => Self::Leaving,
            Self::Leaving | Self::Terminated => Self::Terminated,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Joining => "joining",
            Self::Active => "active",
            Self::Leaving => "leaving",
            Self::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user typed `q`.
    Left,
    /// Another session closed the room.
    RoomClosed,
    /// Console input ended.
    InputClosed,
}

/// Why the interactive loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopExit {
    Quit,
    InputClosed,
    RoomClosed,
    WatcherGone,
}

/// The session's view of the room: how far it has read and which byte
/// spans it wrote itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalView {
    cursor: usize,
    own: Vec<Range<usize>>,
}

impl LocalView {
    /// Starts a view at `cursor`.
    #[must_use]
    pub const fn new(cursor: usize) -> Self {
        Self {
            cursor,
            own: Vec::new(),
        }
    }

    /// Byte offset up to which the session has seen the room.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Records a span this session appended.
    pub fn record_own(&mut self, span: Range<usize>) {
        self.cursor = self.cursor.max(span.end);
        self.own.push(span);
    }

    /// Merges relayed content and returns the part written by others.
    ///
    /// Own spans covered by the relayed range are dropped afterwards.
    pub fn absorb(&mut self, start: usize, text: &str) -> String {
        let end = start + text.len();
        let mut visible = String::with_capacity(text.len());
        let mut pos = start;

        for span in self.own.iter().filter(|s| s.start < end && s.end > start) {
            let own_start = span.start.max(pos);
            if own_start > pos
                && let Some(piece) = text.get(pos - start..own_start - start)
            {
                visible.push_str(piece);
            }
            pos = pos.max(span.end.min(end));
        }
        if pos < end
            && let Some(piece) = text.get(pos - start..)
        {
            visible.push_str(piece);
        }

        self.own.retain(|s| s.end > end);
        self.cursor = self.cursor.max(end);
        visible
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages this session appended.
    pub sent: usize,
    /// Relayed updates that carried other users' content.
    pub received: usize,
}

/// The foreground loop of an active session.
pub(crate) struct SessionLoop<'a, S, W> {
    store: &'a mut S,
    console: &'a mut Console<W>,
    relay: &'a mut RelayReceiver,
    user: &'a str,
    room: &'a str,
    clear_lines: usize,
    view: LocalView,
    stats: SessionStats,
}

impl<'a, S: RoomStore, W: AsyncWrite + Unpin> SessionLoop<'a, S, W> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new(
        store: &'a mut S,
        console: &'a mut Console<W>,
        relay: &'a mut RelayReceiver,
        user: &'a str,
        room: &'a str,
        cursor: usize,
        clear_lines: usize,
    ) -> Self {
        Self {
            store,
            console,
            relay,
            user,
            room,
            clear_lines,
            view: LocalView::new(cursor),
            stats: SessionStats {
                sent: 0,
                received: 0,
            },
        }
    }

    pub(crate) const fn stats(&self) -> SessionStats {
        self.stats
    }

    pub(crate) async fn print_prompt(&mut self) -> Result<()> {
        self.console.print(PROMPT).await
    }

    pub(crate) async fn run(&mut self) -> Result<LoopExit> {
        loop {
            tokio::select! {
                line = self.console.next_line() => match line {
                    None => {
                        self.close_room()?;
                        return Ok(LoopExit::InputClosed);
                    }
                    Some(line) if line.trim() == QUIT => {
                        self.close_room()?;
                        return Ok(LoopExit::Quit);
                    }
                    Some(line) => self.send(&line).await?,
                },
                message = self.relay.recv() => match message {
                    Some(RelayMessage::NewContent { start, text }) => self.show(start, &text).await?,
                    Some(RelayMessage::Terminate) => return Ok(LoopExit::RoomClosed),
                    None => return Ok(LoopExit::WatcherGone),
                },
            }
        }
    }

    /// Marks the room closed; the watcher sees it on its next poll.
    fn close_room(&mut self) -> Result<()> {
        tracing::debug!(room = self.room, user = self.user, "closing room");
        self.store.set_signal(self.room, UpdateSignal::Closed)
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return self.console.print(PROMPT).await;
        }

        let frame = format_message(self.user, line);
        let room = self.store.append_content(self.room, &frame)?;
        let end = room.size();
        self.view.record_own(end - frame.len()..end);
        self.stats.sent += 1;

        self.console.print(&frame).await?;
        self.console.print(PROMPT).await
    }

    async fn show(&mut self, start: usize, text: &str) -> Result<()> {
        self.store.acknowledge_pending(self.room)?;

        let visible = self.view.absorb(start, text);
        if visible.is_empty() {
            return Ok(());
        }
        self.stats.received += 1;

        self.console.print(&"\n".repeat(self.clear_lines)).await?;
        self.console.print(&visible).await?;
        self.console.print(PROMPT).await
    }
}
