//! Command parsing.
//!
//! This module converts a post text into a structured [`Command`]. A post is
//! a command when its first word is the prefix immediately followed by the
//! trigger, e.g. `!random-user users-here`.

use log::debug;

use crate::commands::CommandParseError;

/// Represents a parsed bot command.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Command {
    /// Mention one random member (`user`, default)
    User,
    /// Mention every member in a random order (`users`)
    Users,
    /// Mention one random member who is not offline (`user-here`)
    UserHere,
    /// Mention every member who is not offline, in a random order (`users-here`)
    UsersHere,
}

impl Command {
    /// Parses a post text into a Command.
    ///
    /// Only the first two words are considered. A missing or unknown action
    /// falls back to [`Command::User`].
    ///
    /// # Arguments
    ///
    /// * `prefix` - Characters the command has to start with, e.g. `!`
    /// * `trigger` - Name of the command, e.g. `random-user`
    /// * `body` - The post text to parse
    ///
    /// # Errors
    ///
    /// - [`CommandParseError::NotACommand`] if the text doesn't start with `prefix`
    /// - [`CommandParseError::NotForBot`] if the command name is not `trigger`
    pub fn parse(prefix: &str, trigger: &str, body: &str) -> Result<Self, CommandParseError> {
        let mut words = body.split_whitespace();

        let name = words
            .next()
            .and_then(|word| word.strip_prefix(prefix))
            .ok_or(CommandParseError::NotACommand)?;

        if name != trigger {
            return Err(CommandParseError::NotForBot);
        }

        let action = words.next();
        debug!("parsing {} command, action={:?}", trigger, action);

        let command = match action {
            Some("users") => Command::Users,
            Some("user-here") => Command::UserHere,
            Some("users-here") => Command::UsersHere,
            _ => Command::User,
        };

        Ok(command)
    }

    /// Whether every member is mentioned instead of a single one.
    pub fn mentions_all(&self) -> bool {
        matches!(self, Command::Users | Command::UsersHere)
    }

    /// Whether offline members are left out.
    pub fn online_only(&self) -> bool {
        matches!(self, Command::UserHere | Command::UsersHere)
    }
}
