//! Room synchronization engine.
//!
//! A session is a foreground loop plus a background watcher joined by a
//! bounded relay:
//!
//! - [`watcher`] polls the room store and relays unseen content.
//! - [`relay`] carries diffs and the terminate sentinel, in order.
//! - [`session`] multiplexes console input with relayed content.
//! - [`lifecycle`] runs the whole thing and tears it down deterministically.

pub mod diff;
pub mod lifecycle;
pub mod relay;
pub mod session;
pub mod watcher;

pub use diff::{Diff, compute_diff, diff_since};
pub use lifecycle::{SessionReport, run_session};
pub use relay::{RelayMessage, RelayReceiver, RelaySender, relay};
pub use session::{LocalView, QUIT, SessionOutcome, SessionState, SessionStats};
pub use watcher::{Tick, Watcher, WatcherExit, WatcherHandle};
