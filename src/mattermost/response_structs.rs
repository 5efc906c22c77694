//! Request and response structures for the Mattermost API v4.
//!
//! This module contains structures for (de)serializing the JSON bodies
//! exchanged with the REST endpoints and the WebSocket event stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User from `/api/v4/users` and `/api/v4/users/me`.
///
/// Only the fields used by the bot are kept. `is_bot` is omitted by the
/// server for regular accounts.
#[derive(Deserialize, Debug, Clone)]
pub struct UserResponse {
    /// Unique identifier for the user.
    pub id: String,
    /// Username of the account.
    pub username: String,
    /// Whether the account is a bot.
    #[serde(default)]
    pub is_bot: bool,
}

impl fmt::Display for UserResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "id={}, username={}", self.id, self.username)
    }
}

/// Status entry from `/api/v4/users/status/ids`.
#[derive(Deserialize, Debug, Clone)]
pub struct StatusResponse {
    /// User the status belongs to.
    pub user_id: String,
    /// Usually one of `online`, `away`, `dnd` or `offline`.
    pub status: String,
}

/// Body of `POST /api/v4/posts`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    /// Channel to post in.
    pub channel_id: String,
    /// Thread root, empty to post at the channel level.
    pub root_id: String,
    /// Post text.
    pub message: String,
}

/// Body of `POST /api/v4/posts/ephemeral`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EphemeralPostRequest {
    /// The only user who will see the post.
    pub user_id: String,
    /// The post itself.
    pub post: PostRequest,
}

/// Created post returned by the post endpoints.
#[derive(Deserialize, Debug, Clone)]
pub struct PostResponse {
    /// Identifier of the created post.
    pub id: String,
}

/// Frame received on the WebSocket event stream.
///
/// Replies to actions (`{"status": "OK", "seq_reply": 1}`) carry no `event`.
#[derive(Deserialize, Debug)]
pub struct WebSocketEvent {
    /// Event name, such as `posted` or `hello`.
    #[serde(default)]
    pub event: Option<String>,
    /// Event payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Outcome of an action, `OK` or `FAIL`.
    #[serde(default)]
    pub status: Option<String>,
    /// Sequence number of the action being replied to.
    #[serde(default)]
    pub seq_reply: Option<u64>,
}

/// Post embedded as a JSON string in `posted` events.
#[derive(Deserialize, Debug)]
pub struct PostedPost {
    pub id: String,
    pub user_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub message: String,
}
