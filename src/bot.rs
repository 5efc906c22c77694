//! Bot module tying the Mattermost event stream to the command pipeline.
//!
//! # Overview
//!
//! When someone posts `!random-user [action]` in a channel, the bot mentions
//! one random member of that channel, or all of them in a random order. Bot
//! accounts are never mentioned, and `-here` actions skip offline members.
//!
//! # Invocation Flow
//!
//! ```text
//! Post → Parse Command → List Members → (Fetch Statuses) → Select → Post Mentions
//! ```
//!
//! # Error Handling
//!
//! - Listing failures are logged and handled as an empty channel: nothing is posted
//! - Post failures are reported to the invoking user with an ephemeral post
//!
//! # Example
//!
//! ```no_run
//! # use random_user::bot::Bot;
//! # use random_user::config::Config;
//! # async fn run() -> Result<(), anyhow::Error> {
//! let config = Config::load("config.yaml")?;
//!
//! let bot = Bot::new(config).await?;
//! bot.start().await?; // Runs indefinitely
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    commands::{Command, CommandContext, CommandParseError, Commander},
    config::Config,
    mattermost::{
        CommandInvocation, MattermostClient, MattermostRequester, MattermostSync, Requester,
    },
};

/// Outcome of a single invocation.
#[derive(Debug, PartialEq, Eq)]
enum InvocationOutcome {
    /// The post is not a command for this bot
    Ignored,
    /// No member is eligible, nothing was posted
    NobodyToMention,
    /// The mentions were posted
    Posted(String),
    /// The post couldn't be created, the invoking user was told
    Failed,
}

/// Main bot structure.
///
/// # Thread Safety
///
/// The Mattermost client and the commander are wrapped in `Arc` to be shared
/// with the task spawned for each invocation. The only mutable state, the
/// random generator, lives behind a mutex inside the [`Commander`].
pub struct Bot {
    /// Mattermost client for listing members and posting messages.
    mattermost_client: Arc<MattermostClient<MattermostRequester>>,

    /// Event stream listener.
    mattermost_sync: MattermostSync,

    /// Command parser and executor.
    commander: Arc<Commander>,
}

impl Bot {
    /// Creates a new Bot instance from the configuration.
    ///
    /// The bot account is resolved once here and its id is kept for the whole
    /// process lifetime, to ignore the bot's own posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the bot account can't be resolved (invalid token,
    /// unreachable server, etc.).
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let requester = MattermostRequester::new(&config.mattermost.url, &config.mattermost.token);
        let mattermost_client = MattermostClient::new(requester, config.command.max_members);

        let bot_user = mattermost_client.get_bot_user().await?;
        info!("logged in as {} ({})", bot_user.username, bot_user.id);
        if !bot_user.is_bot {
            warn!("{} is not a bot account", bot_user.username);
        }

        let mattermost_sync = MattermostSync::new(
            &mattermost_client.get_websocket_url(),
            &mattermost_client.get_token(),
            &bot_user.id,
        );

        let commander = Commander::new(&config.command.prefix, &config.command.trigger);

        Ok(Bot {
            mattermost_client: Arc::new(mattermost_client),
            mattermost_sync,
            commander: Arc::new(commander),
        })
    }

    /// Starts listening to the event stream and answering invocations.
    ///
    /// Runs until the process is terminated. Each invocation is handled in its
    /// own task so the stream keeps being read.
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let mattermost_client = Arc::clone(&self.mattermost_client);
        let commander = Arc::clone(&self.commander);

        let on_post = move |invocation: CommandInvocation| {
            let mattermost_client = Arc::clone(&mattermost_client);
            let commander = Arc::clone(&commander);

            tokio::spawn(async move {
                handle_invocation(&mattermost_client, &commander, &invocation).await;
            });
        };

        self.mattermost_sync.sync(on_post).await
    }
}

/// Handles a post, answering it if it is a command for the bot.
///
/// 1. Parse the post text, silently ignoring anything but our command
/// 2. List the channel members, a failure counts as an empty channel
/// 3. Fetch the statuses for `-here` commands
/// 4. Execute the command, posting nothing if nobody is eligible
/// 5. Post the mentions in the channel (and thread) of the invocation
/// 6. Tell the invoking user with an ephemeral post if the post failed
async fn handle_invocation<R: Requester>(
    mattermost_client: &MattermostClient<R>,
    commander: &Commander,
    invocation: &CommandInvocation,
) -> InvocationOutcome {
    let command = match commander.parse(&invocation.message) {
        Ok(command) => command,
        Err(CommandParseError::NotACommand) => return InvocationOutcome::Ignored,
        Err(CommandParseError::NotForBot) => {
            debug!("ignore command for another bot in post {}", invocation.post_id);
            return InvocationOutcome::Ignored;
        }
    };

    info!("received {:?} from {}", command, invocation);

    let command_context = build_context(mattermost_client, &command, invocation).await;

    let Some(command_result) = commander.parse_command(&command, &command_context).await else {
        info!("nobody to mention in channel {}", invocation.channel_id);
        return InvocationOutcome::NobodyToMention;
    };

    match mattermost_client
        .send_message(
            &invocation.channel_id,
            &invocation.root_id,
            &command_result.message,
        )
        .await
    {
        Ok(()) => InvocationOutcome::Posted(command_result.message),
        Err(e) => {
            error!(
                "failed to post in channel {}: {:?}",
                invocation.channel_id, e
            );
            mattermost_client
                .send_ephemeral(
                    &invocation.user_id,
                    &invocation.channel_id,
                    &invocation.root_id,
                    &Commander::get_post_error_message(),
                )
                .await;
            InvocationOutcome::Failed
        }
    }
}

/// Gathers the members, and their statuses when needed, of the invocation channel.
async fn build_context<R: Requester>(
    mattermost_client: &MattermostClient<R>,
    command: &Command,
    invocation: &CommandInvocation,
) -> CommandContext {
    let users = mattermost_client
        .get_channel_users(&invocation.channel_id)
        .await
        .unwrap_or_else(|e| {
            warn!(
                "failed to list members of channel {}: {:?}",
                invocation.channel_id, e
            );
            Vec::new()
        });

    let statuses = if command.online_only() {
        mattermost_client
            .get_presence_statuses(&users)
            .await
            .unwrap_or_else(|e| {
                warn!("failed to fetch statuses: {:?}", e);
                Vec::new()
            })
    } else {
        Vec::new()
    };

    CommandContext {
        channel_id: invocation.channel_id.clone(),
        users,
        statuses,
    }
}
