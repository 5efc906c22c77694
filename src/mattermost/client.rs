//! High-level Mattermost client used by the bot.
//!
//! This module provides the [`MattermostClient`] struct which wraps a
//! [`Requester`] and converts its raw responses into the internal
//! [`User`] and [`PresenceStatus`] structures.

use log::{debug, error, info};
use reqwest::Error;

use crate::mattermost::{
    requester::Requester,
    response_structs::{PostRequest, StatusResponse, UserResponse},
    structs::{PresenceStatus, Status, User},
};

/// Largest page accepted by `/api/v4/users`.
const PAGE_SIZE: usize = 200;

/// High-level client for the operations the bot needs.
///
/// # Examples
///
/// ```no_run
/// use random_user::mattermost::{MattermostClient, MattermostRequester};
///
/// # #[tokio::main]
/// # async fn main() {
/// let requester = MattermostRequester::new("https://chat.example.com", "bot-token");
/// let client = MattermostClient::new(requester, 1000);
/// let users = client.get_channel_users("channel_id").await.unwrap();
/// # }
/// ```
pub struct MattermostClient<R: Requester> {
    /// Requester to interact with the mattermost server
    requester: R,
    /// Maximum number of members fetched for a channel
    max_members: usize,
}

impl<R: Requester> MattermostClient<R> {
    /// Create a new [MattermostClient].
    ///
    /// # Arguments
    ///
    /// * `requester` - An implementation of the [Requester] trait.
    /// * `max_members` - Upper bound of members fetched for a channel.
    pub fn new(requester: R, max_members: usize) -> Self {
        MattermostClient {
            requester,
            max_members,
        }
    }

    /// Fetches the account of the bot.
    pub async fn get_bot_user(&self) -> Result<User, Error> {
        let me = self.requester.get_me().await?;
        Ok(convert_user(me))
    }

    /// Fetches the members of a channel, page by page.
    ///
    /// Stops at the first page shorter than the page size, or once
    /// `max_members` users have been fetched.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing page request.
    pub async fn get_channel_users(&self, channel_id: &str) -> Result<Vec<User>, Error> {
        let per_page = PAGE_SIZE.min(self.max_members);
        let mut users = Vec::new();
        let mut page = 0;

        while users.len() < self.max_members && per_page > 0 {
            let members = self
                .requester
                .get_channel_members(channel_id, page, per_page)
                .await?;
            let fetched = members.len();

            users.extend(members.into_iter().map(convert_user));
            debug!(
                "fetched page {} of channel {}: {} members",
                page, channel_id, fetched
            );

            if fetched < per_page {
                break;
            }
            page += 1;
        }

        users.truncate(self.max_members);
        info!("channel {} has {} members", channel_id, users.len());

        Ok(users)
    }

    /// Fetches the presence statuses of the given users.
    ///
    /// No request is sent for an empty user list.
    pub async fn get_presence_statuses(
        &self,
        users: &[User],
    ) -> Result<Vec<PresenceStatus>, Error> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids = users
            .iter()
            .map(|user| user.id.clone())
            .collect::<Vec<String>>();
        let statuses = self.requester.get_statuses(&user_ids).await?;

        Ok(statuses.into_iter().map(convert_status).collect())
    }

    /// Posts `message` in a channel, as a reply in the thread `root_id` if not empty.
    pub async fn send_message(
        &self,
        channel_id: &str,
        root_id: &str,
        message: &str,
    ) -> Result<(), Error> {
        let post = PostRequest {
            channel_id: channel_id.to_owned(),
            root_id: root_id.to_owned(),
            message: message.to_owned(),
        };

        self.requester.create_post(&post).await?;
        Ok(())
    }

    /// Posts `message` only visible to `user_id`.
    ///
    /// The bot account needs the `create_post_ephemeral` permission. Failures
    /// are logged and not returned, there is nobody left to tell.
    pub async fn send_ephemeral(
        &self,
        user_id: &str,
        channel_id: &str,
        root_id: &str,
        message: &str,
    ) {
        let post = PostRequest {
            channel_id: channel_id.to_owned(),
            root_id: root_id.to_owned(),
            message: message.to_owned(),
        };

        if let Err(e) = self.requester.create_ephemeral_post(user_id, &post).await {
            error!("failed to send ephemeral post to {}: {:?}", user_id, e);
        }
    }

    /// Url of the WebSocket event stream.
    pub fn get_websocket_url(&self) -> String {
        self.requester.get_websocket_url()
    }

    /// Token used to authenticate on the event stream.
    pub fn get_token(&self) -> String {
        self.requester.get_token()
    }
}

fn convert_user(user: UserResponse) -> User {
    User {
        id: user.id,
        username: user.username,
        is_bot: user.is_bot,
    }
}

fn convert_status(status: StatusResponse) -> PresenceStatus {
    PresenceStatus {
        status: Status::from(status.status.as_str()),
        user_id: status.user_id,
    }
}
