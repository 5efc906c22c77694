//! Internal data structures for channel members, presence and invocations.
//!
//! These types are built from the Mattermost API responses and only live for
//! the duration of a single invocation.

use std::fmt;

/// Represents a member of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier for the user
    pub id: String,
    /// Username, used to mention the user
    pub username: String,
    /// Whether the account is a bot account
    pub is_bot: bool,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, username={}, is_bot={}",
            self.id, self.username, self.is_bot
        )
    }
}

/// Presence of a user as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Online,
    Away,
    /// Do not disturb
    Dnd,
    Offline,
    /// Any other value reported by the server, such as `ooo` (out of office)
    Other(String),
}

impl From<&str> for Status {
    /// Only the literal `offline` is considered offline.
    fn from(status: &str) -> Self {
        match status {
            "online" => Status::Online,
            "away" => Status::Away,
            "dnd" => Status::Dnd,
            "offline" => Status::Offline,
            other => Status::Other(other.to_owned()),
        }
    }
}

/// Presence status of a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceStatus {
    /// Identifier of the user the status belongs to
    pub user_id: String,
    /// Current presence
    pub status: Status,
}

/// A post recognised from the event stream.
///
/// Carries everything needed to answer the post in the right channel and
/// thread, and to reach its author with an ephemeral message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Identifier of the invoking post
    pub post_id: String,
    /// Channel where the post was sent
    pub channel_id: String,
    /// Thread root of the post, empty outside of a thread
    pub root_id: String,
    /// Author of the post
    pub user_id: String,
    /// Raw post text
    pub message: String,
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "post_id={}, channel_id={}, root_id={}, user_id={}",
            self.post_id, self.channel_id, self.root_id, self.user_id
        )
    }
}
