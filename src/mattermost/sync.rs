//! Mattermost event stream synchronization.
//!
//! This module provides the [`MattermostSync`] struct for listening to the
//! server WebSocket and turning `posted` events into [`CommandInvocation`]s.
//!
//! # Overview
//!
//! The [`MattermostSync::sync`] method:
//! 1. Connects to `/api/v4/websocket`
//! 2. Authenticates with an `authentication_challenge` action
//! 3. Forwards every post not written by the bot to the callback
//! 4. Reconnects with an exponential back-off when the stream ends

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde_json::json;
use tokio::{
    net::TcpStream,
    time::{Duration, sleep},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::mattermost::{
    response_structs::{PostedPost, WebSocketEvent},
    structs::CommandInvocation,
};

/// First reconnection delay, in seconds.
const INITIAL_RECONNECT_DELAY: u64 = 2;
/// Reconnection delay ceiling, in seconds.
const MAX_RECONNECT_DELAY: u64 = 3600;
/// Sequence number of the authentication action.
const AUTHENTICATION_SEQ: u64 = 1;

type EventStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Listens to the Mattermost event stream.
///
/// # Fields
///
/// * `websocket_url` - Url of the event stream
/// * `token` - Bot access token used for the authentication challenge
/// * `bot_user_id` - Posts from this user are never forwarded
pub struct MattermostSync {
    websocket_url: String,
    token: String,
    bot_user_id: String,
}

impl MattermostSync {
    /// Creates a new MattermostSync instance.
    ///
    /// This does not connect; call [`MattermostSync::sync`] to start listening.
    pub fn new(websocket_url: &str, token: &str, bot_user_id: &str) -> Self {
        MattermostSync {
            websocket_url: websocket_url.to_owned(),
            token: token.to_owned(),
            bot_user_id: bot_user_id.to_owned(),
        }
    }

    /// Listens to the event stream forever.
    ///
    /// `on_post` is invoked for each new post written by someone else than
    /// the bot. Connection failures and closed streams are logged and
    /// followed by a reconnection. The back-off starts over once a
    /// connection has been established.
    pub async fn sync<F>(&self, on_post: F) -> Result<()>
    where
        F: Fn(CommandInvocation) + Send + Sync + 'static,
    {
        info!("start listening to {}", &self.websocket_url);
        let mut delay = 0;

        loop {
            let connected = match self.connect().await {
                Ok(stream) => {
                    match self.listen(stream, &on_post).await {
                        Ok(()) => warn!("event stream closed"),
                        Err(e) => error!("event stream failed: {:?}", e),
                    }
                    true
                }
                Err(e) => {
                    error!("unable to connect to the event stream: {:?}", e);
                    false
                }
            };

            delay = reconnect_delay(delay, connected);
            info!("reconnecting in {delay}s");
            sleep(Duration::from_secs(delay)).await;
        }
    }

    /// Opens the stream and sends the authentication challenge.
    async fn connect(&self) -> Result<EventStream> {
        let (mut stream, _) = connect_async(self.websocket_url.as_str()).await?;

        stream
            .send(Message::text(authentication_challenge(
                &self.token,
                AUTHENTICATION_SEQ,
            )))
            .await?;
        info!("connected to the event stream");

        Ok(stream)
    }

    /// Runs a single connection until the server closes it.
    async fn listen<F>(&self, mut stream: EventStream, on_post: &F) -> Result<()>
    where
        F: Fn(CommandInvocation),
    {
        while let Some(message) = stream.next().await {
            match message? {
                Message::Text(text) => {
                    if let Some(invocation) = self.invocation_from_frame(text.as_str()) {
                        on_post(invocation);
                    }
                }
                Message::Close(frame) => {
                    info!("event stream closed by the server: {:?}", frame);
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Turns a text frame into an invocation.
    ///
    /// Returns `None` for frames other than `posted` events and for the
    /// posts of the bot itself. A rejected authentication is logged.
    fn invocation_from_frame(&self, text: &str) -> Option<CommandInvocation> {
        let event = parse_event(text)?;

        if let Some(status) = authentication_failure(&event) {
            warn!(
                "event stream rejected the authentication ({}), check the bot token",
                status
            );
            return None;
        }

        let invocation = parse_posted_event(event)?;
        if invocation.user_id == self.bot_user_id {
            debug!("ignore own post {}", invocation.post_id);
            return None;
        }

        Some(invocation)
    }
}

/// Delay before the next connection attempt, in seconds.
///
/// `previous` is the last delay waited, `0` before the first attempt. The
/// delay doubles after each failed attempt up to an hour and starts over
/// after a connection was established.
fn reconnect_delay(previous: u64, connected: bool) -> u64 {
    if connected || previous == 0 {
        INITIAL_RECONNECT_DELAY
    } else {
        (previous * 2).min(MAX_RECONNECT_DELAY)
    }
}

/// Builds the first action sent on the stream, authenticating the connection.
fn authentication_challenge(token: &str, seq: u64) -> String {
    json!({
        "seq": seq,
        "action": "authentication_challenge",
        "data": { "token": token }
    })
    .to_string()
}

/// Status of the reply to the authentication action, when it is not `OK`.
fn authentication_failure(event: &WebSocketEvent) -> Option<&str> {
    if event.seq_reply != Some(AUTHENTICATION_SEQ) {
        return None;
    }

    match event.status.as_deref() {
        Some("OK") => None,
        status => Some(status.unwrap_or("no status")),
    }
}

fn parse_event(text: &str) -> Option<WebSocketEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("unable to parse event stream frame: {}", e);
            None
        }
    }
}

/// Extracts the post of a `posted` event.
///
/// Returns `None` for any other event, including malformed posts.
fn parse_posted_event(event: WebSocketEvent) -> Option<CommandInvocation> {
    if event.event.as_deref() != Some("posted") {
        return None;
    }

    // The post is a JSON document serialized as a string
    let raw_post = event.data.get("post")?.as_str()?;
    let post: PostedPost = match serde_json::from_str(raw_post) {
        Ok(post) => post,
        Err(e) => {
            warn!("unable to parse posted event: {}", e);
            return None;
        }
    };

    Some(CommandInvocation {
        post_id: post.id,
        channel_id: post.channel_id,
        root_id: post.root_id,
        user_id: post.user_id,
        message: post.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_sync() -> MattermostSync {
        MattermostSync::new("wss://chat.example.com/api/v4/websocket", "secret", "bot1")
    }

    fn posted_frame(post: &serde_json::Value) -> String {
        json!({
            "event": "posted",
            "data": {
                "channel_display_name": "Town Square",
                "post": post.to_string(),
                "sender_name": "@alice"
            },
            "broadcast": {"channel_id": "channel1"},
            "seq": 3
        })
        .to_string()
    }

    fn event(text: &str) -> WebSocketEvent {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_authentication_challenge() {
        let challenge: serde_json::Value =
            serde_json::from_str(&authentication_challenge("secret", 1)).unwrap();

        assert_eq!(
            challenge,
            json!({
                "seq": 1,
                "action": "authentication_challenge",
                "data": {"token": "secret"}
            })
        );
    }

    #[test]
    fn test_reconnect_delay_doubles_until_capped() {
        let mut delay = 0;
        let mut delays = Vec::new();
        for _ in 0..13 {
            delay = reconnect_delay(delay, false);
            delays.push(delay);
        }

        assert_eq!(delays[..4], [2, 4, 8, 16]);
        assert_eq!(delays[10], 2048);
        assert_eq!(delays[11], 3600);
        assert_eq!(delays[12], 3600);
    }

    #[test]
    fn test_reconnect_delay_resets_after_connection() {
        assert_eq!(reconnect_delay(3600, true), 2);
        assert_eq!(reconnect_delay(64, true), 2);
        assert_eq!(reconnect_delay(0, true), 2);
        assert_eq!(reconnect_delay(reconnect_delay(3600, true), false), 4);
    }

    #[test]
    fn test_invocation_from_frame() {
        let frame = posted_frame(&json!({
            "id": "post1",
            "user_id": "u1",
            "channel_id": "channel1",
            "root_id": "root1",
            "message": "!random-user users"
        }));

        let invocation = create_sync().invocation_from_frame(&frame).unwrap();
        assert_eq!(
            invocation,
            CommandInvocation {
                post_id: "post1".to_owned(),
                channel_id: "channel1".to_owned(),
                root_id: "root1".to_owned(),
                user_id: "u1".to_owned(),
                message: "!random-user users".to_owned(),
            }
        );
    }

    #[test]
    fn test_invocation_from_frame_ignores_own_posts() {
        let frame = posted_frame(&json!({
            "id": "post2",
            "user_id": "bot1",
            "channel_id": "channel1",
            "message": "@alice"
        }));

        assert!(create_sync().invocation_from_frame(&frame).is_none());
    }

    #[test]
    fn test_invocation_from_frame_without_root() {
        let frame = posted_frame(&json!({
            "id": "post1",
            "user_id": "u1",
            "channel_id": "channel1",
            "message": "hello"
        }));

        let invocation = create_sync().invocation_from_frame(&frame).unwrap();
        assert_eq!(invocation.root_id, "");
    }

    #[test]
    fn test_invocation_from_other_event() {
        let frame = r#"{"event": "hello", "data": {"server_version": "9.0.0"}, "seq": 0}"#;
        assert!(create_sync().invocation_from_frame(frame).is_none());
    }

    #[test]
    fn test_invocation_from_action_reply() {
        let sync = create_sync();
        let accepted = r#"{"status": "OK", "seq_reply": 1}"#;
        let rejected = r#"{"status": "FAIL", "seq_reply": 1}"#;

        assert!(sync.invocation_from_frame(accepted).is_none());
        assert!(sync.invocation_from_frame(rejected).is_none());
    }

    #[test]
    fn test_invocation_from_invalid_frame() {
        let sync = create_sync();
        let broken_post = r#"{"event": "posted", "data": {"post": "{"}}"#;

        assert!(sync.invocation_from_frame("not json").is_none());
        assert!(sync.invocation_from_frame(broken_post).is_none());
    }

    #[test]
    fn test_authentication_failure() {
        let rejected = event(
            r#"{"status": "FAIL", "seq_reply": 1, "error": {"id": "api.web_socket_router.not_authenticated.app_error"}}"#,
        );
        assert_eq!(authentication_failure(&rejected), Some("FAIL"));

        let missing_status = event(r#"{"seq_reply": 1}"#);
        assert_eq!(authentication_failure(&missing_status), Some("no status"));
    }

    #[test]
    fn test_authentication_success() {
        let accepted = event(r#"{"status": "OK", "seq_reply": 1}"#);
        let other_action = event(r#"{"status": "FAIL", "seq_reply": 2}"#);
        let hello = event(r#"{"event": "hello", "seq": 0}"#);

        assert!(authentication_failure(&accepted).is_none());
        assert!(authentication_failure(&other_action).is_none());
        assert!(authentication_failure(&hello).is_none());
    }
}
