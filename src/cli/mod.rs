//! CLI layer for roomchat.
//!
//! Provides the command-line interface using clap, with commands for
//! initializing the database, managing rooms and accounts, and chatting.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
