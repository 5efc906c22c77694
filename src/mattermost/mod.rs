//! Mattermost integration for the bot.
//!
//! This module provides everything the bot needs from the Mattermost server:
//! - REST requests (bot account, channel members, presence statuses, posts)
//! - Conversion of API responses into internal structures
//! - Real-time post events through the WebSocket event stream
//!
//! # Modules
//!
//! - `requester` - HTTP client for the Mattermost REST API v4
//! - `response_structs` - Request and response bodies
//! - `structs` - Internal structures for users, statuses and invocations
//! - `client` - High level client on top of a requester
//! - `sync` - Event stream listener
//!
//! # Examples
//!
//! ```no_run
//! use random_user::mattermost::{MattermostClient, MattermostRequester};
//!
//! let requester = MattermostRequester::new("https://chat.example.com", "bot-token");
//! let client = MattermostClient::new(requester, 1000);
//! ```

mod client;
mod requester;
mod response_structs;
mod structs;
mod sync;

pub use crate::mattermost::client::MattermostClient;
#[cfg(test)]
pub use crate::mattermost::requester::MockRequester;
pub use crate::mattermost::requester::{MattermostRequester, Requester};
#[cfg(test)]
pub use crate::mattermost::response_structs::{PostResponse, StatusResponse, UserResponse};
pub use crate::mattermost::structs::{CommandInvocation, PresenceStatus, Status, User};
pub use crate::mattermost::sync::MattermostSync;
