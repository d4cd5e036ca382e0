//! CLI module - command-line interface
//!
//! Contains the REPL, command parsing, the chat session and display helpers.

pub mod commands;
pub mod render;
pub mod repl;
pub mod session;

pub use repl::Repl;
pub use session::ChatSession;
