// Discord layer - commands and event handlers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "invites/mod.rs"]
pub mod invites;

// Re-export command types for convenience
pub use commands::log_channels::{Context, Data, Error};
