//! HTTP client for the Mattermost REST API.
//!
//! This module provides the [`MattermostRequester`] struct for making the
//! authenticated requests the bot needs: its own account, channel members,
//! presence statuses and post creation.

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, Error};

use crate::mattermost::response_structs::{
    EphemeralPostRequest, PostRequest, PostResponse, StatusResponse, UserResponse,
};

/// HTTP client for requesting data from a Mattermost server.
///
/// Every request is authenticated with the bot access token.
///
/// # Examples
///
/// ```no_run
/// let requester = MattermostRequester::new("https://chat.example.com", "bot-token");
/// let me = requester.get_me().await.unwrap();
/// println!("Bot: {}", me);
/// ```
pub struct MattermostRequester {
    /// Mattermost server url, without trailing slash
    url: String,
    /// Bot access token
    token: String,
    /// HTTP client
    client: Client,
}

/// Trait for making requests to the Mattermost server.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Requester {
    /// Fetches the account owning the access token.
    async fn get_me(&self) -> Result<UserResponse, Error>;
    /// Fetches one page of the members of a channel.
    async fn get_channel_members(
        &self,
        channel_id: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<UserResponse>, Error>;
    /// Fetches the presence statuses of the given users.
    async fn get_statuses(&self, user_ids: &[String]) -> Result<Vec<StatusResponse>, Error>;
    /// Creates a post visible to every channel member.
    async fn create_post(&self, post: &PostRequest) -> Result<PostResponse, Error>;
    /// Creates a post only visible to `user_id`.
    async fn create_ephemeral_post(
        &self,
        user_id: &str,
        post: &PostRequest,
    ) -> Result<PostResponse, Error>;
    fn get_websocket_url(&self) -> String;
    fn get_token(&self) -> String;
}

impl MattermostRequester {
    /// Create a new [MattermostRequester].
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL of the Mattermost server.
    /// * `token` - The bot access token.
    pub fn new(url: &str, token: &str) -> Self {
        let client = reqwest::Client::new();
        MattermostRequester {
            url: url.to_string(),
            token: token.to_string(),
            client,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", &self.url, path)
    }
}

impl Requester for MattermostRequester {
    /// Request `GET /api/v4/users/me` to identify the bot account.
    async fn get_me(&self) -> Result<UserResponse, Error> {
        let url = self.api_url("/users/me");
        info!("request bot account");
        debug!("request {}", &url);

        let user: UserResponse = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("response from {} -> {:?}", &url, &user);

        Ok(user)
    }

    /// Request `GET /api/v4/users?in_channel={channelId}&page={page}&per_page={perPage}`.
    ///
    /// This api call returns a json array of users, ordered by username:
    /// ```
    /// [
    ///   { "id": "userId1", "username": "alice" },
    ///   { "id": "userId2", "username": "random-user", "is_bot": true }
    /// ]
    /// ```
    async fn get_channel_members(
        &self,
        channel_id: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<UserResponse>, Error> {
        let url = self.api_url("/users");
        info!("request members of channel {} (page {})", channel_id, page);
        debug!(
            "request {}?in_channel={}&page={}&per_page={}",
            &url, channel_id, page, per_page
        );

        let users: Vec<UserResponse> = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("in_channel", channel_id.to_owned()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("response from {} -> {} users", &url, users.len());

        Ok(users)
    }

    /// Request `POST /api/v4/users/status/ids` with a json array of user ids.
    ///
    /// This api call returns a json array of statuses:
    /// ```
    /// [
    ///   { "user_id": "userId1", "status": "online" },
    ///   { "user_id": "userId2", "status": "offline" }
    /// ]
    /// ```
    async fn get_statuses(&self, user_ids: &[String]) -> Result<Vec<StatusResponse>, Error> {
        let url = self.api_url("/users/status/ids");
        info!("request statuses of {} users", user_ids.len());
        debug!("request {} with {:?}", &url, user_ids);

        let statuses: Vec<StatusResponse> = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(user_ids)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("response from {} -> {:?}", &url, &statuses);

        Ok(statuses)
    }

    /// Request `POST /api/v4/posts`. The post author is the token owner.
    async fn create_post(&self, post: &PostRequest) -> Result<PostResponse, Error> {
        let url = self.api_url("/posts");
        info!("create post in channel {}", &post.channel_id);
        debug!("request {} with {:?}", &url, post);

        let created: PostResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(post)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("created post {}", &created.id);

        Ok(created)
    }

    /// Request `POST /api/v4/posts/ephemeral`.
    async fn create_ephemeral_post(
        &self,
        user_id: &str,
        post: &PostRequest,
    ) -> Result<PostResponse, Error> {
        let url = self.api_url("/posts/ephemeral");
        info!(
            "create ephemeral post for {} in channel {}",
            user_id, &post.channel_id
        );

        let body = EphemeralPostRequest {
            user_id: user_id.to_owned(),
            post: post.clone(),
        };

        let created: PostResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("created ephemeral post {}", &created.id);

        Ok(created)
    }

    fn get_websocket_url(&self) -> String {
        websocket_url(&self.url)
    }

    fn get_token(&self) -> String {
        self.token.clone()
    }
}

/// Builds the event stream url from the server url, swapping `http(s)` for `ws(s)`.
fn websocket_url(url: &str) -> String {
    let base = if let Some(host) = url.strip_prefix("https://") {
        format!("wss://{}", host)
    } else if let Some(host) = url.strip_prefix("http://") {
        format!("ws://{}", host)
    } else {
        url.to_owned()
    };

    format!("{}/api/v4/websocket", base)
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    const TOKEN: &str = "secret-token";

    #[tokio::test]
    async fn test_get_me() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("GET", "/api/v4/users/me")
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "bot1", "username": "random-user", "is_bot": true}"#)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let me = requester.get_me().await.unwrap();
        assert_eq!(me.id, "bot1");
        assert_eq!(me.username, "random-user");
        assert!(me.is_bot);
    }

    #[tokio::test]
    async fn test_get_me_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("GET", "/api/v4/users/me")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "api.context.session_expired.app_error"}"#)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let error = requester.get_me().await.unwrap_err();
        assert_eq!(error.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_get_channel_members() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();
        let body = r#"[{"id": "u1", "username": "alice"}, {"id": "b1", "username": "random-user", "is_bot": true}]"#;

        server
            .mock("GET", "/api/v4/users")
            .match_header("authorization", "Bearer secret-token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("in_channel".to_owned(), "channel1".to_owned()),
                Matcher::UrlEncoded("page".to_owned(), "2".to_owned()),
                Matcher::UrlEncoded("per_page".to_owned(), "200".to_owned()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let users = requester
            .get_channel_members("channel1", 2, 200)
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert!(!users[0].is_bot);
        assert!(users[1].is_bot);
    }

    #[tokio::test]
    async fn test_get_statuses() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();
        let body = r#"[{"user_id": "u1", "status": "online", "manual": false, "last_activity_at": 0}, {"user_id": "u2", "status": "offline"}]"#;

        server
            .mock("POST", "/api/v4/users/status/ids")
            .match_header("authorization", "Bearer secret-token")
            .match_body(Matcher::Json(json!(["u1", "u2"])))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let statuses = requester
            .get_statuses(&["u1".to_owned(), "u2".to_owned()])
            .await
            .unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].user_id, "u1");
        assert_eq!(statuses[0].status, "online");
        assert_eq!(statuses[1].status, "offline");
    }

    #[tokio::test]
    async fn test_create_post() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("POST", "/api/v4/posts")
            .match_header("authorization", "Bearer secret-token")
            .match_body(Matcher::Json(json!({
                "channel_id": "channel1",
                "root_id": "root1",
                "message": "@alice"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "post1", "message": "@alice"}"#)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let post = PostRequest {
            channel_id: "channel1".to_owned(),
            root_id: "root1".to_owned(),
            message: "@alice".to_owned(),
        };
        let created = requester.create_post(&post).await.unwrap();
        assert_eq!(created.id, "post1");
    }

    #[tokio::test]
    async fn test_create_post_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("POST", "/api/v4/posts")
            .with_status(403)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let post = PostRequest {
            channel_id: "channel1".to_owned(),
            root_id: "".to_owned(),
            message: "@alice".to_owned(),
        };
        assert!(requester.create_post(&post).await.is_err());
    }

    #[tokio::test]
    async fn test_create_ephemeral_post() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("POST", "/api/v4/posts/ephemeral")
            .match_body(Matcher::Json(json!({
                "user_id": "u1",
                "post": {"channel_id": "channel1", "root_id": "", "message": "oops"}
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "post2"}"#)
            .create_async()
            .await;

        let requester = MattermostRequester::new(&url, TOKEN);
        let post = PostRequest {
            channel_id: "channel1".to_owned(),
            root_id: "".to_owned(),
            message: "oops".to_owned(),
        };
        let created = requester.create_ephemeral_post("u1", &post).await.unwrap();
        assert_eq!(created.id, "post2");
    }

    #[test]
    fn test_get_websocket_url() {
        let requester = MattermostRequester::new("https://chat.example.com", TOKEN);
        assert_eq!(
            requester.get_websocket_url(),
            "wss://chat.example.com/api/v4/websocket"
        );

        let requester = MattermostRequester::new("http://localhost:8065", TOKEN);
        assert_eq!(
            requester.get_websocket_url(),
            "ws://localhost:8065/api/v4/websocket"
        );
    }

    #[test]
    fn test_get_token() {
        let requester = MattermostRequester::new("http://localhost:8065", TOKEN);
        assert_eq!(requester.get_token(), TOKEN);
    }
}
