//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, the entry point for
//! processing bot commands.
//!
//! # Flow
//!
//! ```text
//! Post text → parse() → Command → parse_command() → Option<CommandResult>
//! ```
//!
//! # Examples
//!
//! ```no_run
//! # use random_user::commands::{Commander, CommandContext};
//! # async fn example() {
//! let commander = Commander::new("!", "random-user");
//!
//! let command = commander.parse("!random-user users").unwrap();
//! let context = CommandContext {
//!     channel_id: "channel_id".to_string(),
//!     users: vec![],
//!     statuses: vec![],
//! };
//! let result = commander.parse_command(&command, &context).await;
//! # }
//! ```

use log::debug;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::Mutex;

use crate::commands::{
    CommandContext, CommandParseError, CommandResult,
    actions::{handle_user, handle_users},
    command::Command,
    markdown_response::format_post_error,
};

/// Command orchestrator for parsing and executing bot commands.
///
/// The Commander owns the random generator used by every command. It is
/// seeded from the operating system once, when the bot starts.
pub struct Commander {
    /// Characters a command starts with
    prefix: String,
    /// Command name
    trigger: String,
    /// Random generator shared by the invocations
    rng: Mutex<StdRng>,
}

impl Commander {
    /// Creates a new Commander with a generator seeded from the OS.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Characters a command starts with, e.g. `!`
    /// * `trigger` - Command name, e.g. `random-user`
    pub fn new(prefix: &str, trigger: &str) -> Self {
        Self::with_rng(prefix, trigger, StdRng::from_os_rng())
    }

    /// Creates a new Commander with the given generator.
    pub fn with_rng(prefix: &str, trigger: &str, rng: StdRng) -> Self {
        Commander {
            prefix: prefix.to_owned(),
            trigger: trigger.to_owned(),
            rng: Mutex::new(rng),
        }
    }

    /// Parses a post text into a command.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandParseError`] for every post that isn't a command for
    /// this bot. None of them should be answered.
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.prefix, &self.trigger, body)
    }

    /// Executes a parsed command.
    ///
    /// # Returns
    ///
    /// * `Some(CommandResult)` - The message to post
    /// * `None` - No member is eligible, nothing should be posted
    ///
    /// # Command Handlers
    ///
    /// - [`Command::User`], [`Command::UserHere`] → [`handle_user`]
    /// - [`Command::Users`], [`Command::UsersHere`] → [`handle_users`]
    pub async fn parse_command(
        &self,
        command: &Command,
        context: &CommandContext,
    ) -> Option<CommandResult> {
        let mut rng = self.rng.lock().await;

        let result = if command.mentions_all() {
            handle_users(context, command, &mut *rng)
        } else {
            handle_user(context, command, &mut *rng)
        };

        if result.is_none() {
            debug!(
                "no member to mention in channel {} for {:?}",
                context.channel_id, command
            );
        }

        result
    }

    /// Message shown to the invoking user when the post can't be created.
    pub fn get_post_error_message() -> String {
        format_post_error()
    }
}
