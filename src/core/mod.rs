//! Core domain models for roomchat.
//!
//! Rooms, their update signal, and accounts. These are pure domain models
//! with no I/O dependencies.

pub mod account;
pub mod room;

pub use account::Account;
pub use room::{Room, RoomSummary, UpdateSignal};
