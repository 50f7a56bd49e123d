//! Message formatting.
//!
//! Turns chat lines into the framed text stored in a room.

pub mod bubble;
pub mod unicode;

pub use bubble::{INNER_WIDTH, OUTER_WIDTH, format_message};
