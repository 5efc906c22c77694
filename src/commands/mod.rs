//! Bot command parsing and response formatting.
//!
//! This module provides the command processing pipeline of the bot.
//!
//! # Overview
//!
//! 1. **Parsing** - Converting a post text into a [`command::Command`]
//! 2. **Selection** - Filtering the channel members (bots, offline users)
//! 3. **Execution** - Picking one member, or shuffling all of them
//! 4. **Response** - Formatting the mentions as Markdown
//!
//! # Architecture
//!
//! ```text
//! Post text
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← Entry point: parse() + parse_command()
//! └─────────────┘
//!      │
//!      └── parse_command() ───────────┐
//!                                     ▼
//!                          ┌─────────────────────┐
//!                          │ Action Handlers     │
//!                          │  - handle_user      │
//!                          │  - handle_users     │
//!                          └─────────────────────┘
//!                                     │
//!                                     ▼
//!                          ┌────────────────────┐
//!                          │  CommandResult     │
//!                          │  - message (MD)    │
//!                          └────────────────────┘
//! ```
//!
//! # Available Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `user` (default) | Mention one random member |
//! | `users` | Mention every member in a random order |
//! | `user-here` | Mention one random member who is not offline |
//! | `users-here` | Mention every member who is not offline, in a random order |
//!
//! Bot accounts are never mentioned. Unknown actions behave like `user`.
//!
//! # Module Organization
//!
//! - [`commander`] - Parses and executes commands
//! - [`command`] - Command enum and parsing logic
//! - [`actions`] - Handler of each selection mode
//! - [`selection`] - Filtering, shuffling and picking
//! - [`markdown_response`] - Response formatting utilities

mod actions;
mod command;
mod commander;
mod markdown_response;
mod selection;

pub use crate::commands::command::Command;
pub use crate::commands::commander::Commander;
use crate::mattermost::{PresenceStatus, User};

/// Runtime context for command execution.
///
/// # Fields
///
/// * `channel_id` - Channel where the command was issued
/// * `users` - Members of the channel
/// * `statuses` - Presence of the members, only fetched for `-here` commands
#[derive(Debug)]
pub struct CommandContext {
    /// Channel where the command was issued
    pub channel_id: String,
    /// Members of the channel, bots included
    pub users: Vec<User>,
    /// Presence statuses of the members
    pub statuses: Vec<PresenceStatus>,
}

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Markdown message to post in the channel
    pub message: String,
}

/// Errors that can occur during command parsing.
///
/// None of them should produce a response: regular chat messages end up here.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParseError {
    /// Message doesn't start with the command prefix
    NotACommand,
    /// Message is a command for another bot
    NotForBot,
}
