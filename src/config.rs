//! Configuration file structures for the random-user bot.
//!
//! The configuration is read from a YAML file and can be overridden with
//! environment variables prefixed by `RANDOM_USER_`, nested keys being
//! separated by `__` (e.g. `RANDOM_USER_MATTERMOST__TOKEN`).
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Mattermost server configuration
//! mattermost:
//!   # Base URL of the Mattermost server
//!   url: "https://chat.example.com"
//!   # Access token of the bot account
//!   token: "bot-access-token"
//!
//! # Optional, defaults shown
//! command:
//!   # Command name
//!   trigger: "random-user"
//!   # Characters a command starts with
//!   prefix: "!"
//!   # Maximum number of channel members considered
//!   max_members: 1000
//! ```
//!
//! # Bot Account Permissions
//!
//! Failures to post the mentions are reported to the invoking user with an
//! ephemeral post, which requires the `create_post_ephemeral` permission.
//! Only system admins have it by default: grant it to the bot account (for
//! instance through a custom role), otherwise these failures are only logged.

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Prefix of the environment variables overriding the configuration file.
const ENV_PREFIX: &str = "RANDOM_USER_";

/// Root configuration structure.
#[derive(Deserialize, Debug)]
pub struct Config {
    /// Mattermost server configuration
    pub mattermost: Mattermost,
    /// Command configuration
    #[serde(default)]
    pub command: CommandSettings,
}

/// Mattermost server configuration.
///
/// # YAML Section
///
/// ```yaml
/// mattermost:
///   url: "https://chat.example.com"
///   token: "bot-access-token"
/// ```
#[derive(Deserialize, Debug)]
pub struct Mattermost {
    /// Base URL of the Mattermost server.
    ///
    /// Should include the protocol (http/https). Trailing slashes are removed
    /// when loading.
    pub url: String,

    /// Personal access token of the bot account.
    ///
    /// Posts are created on behalf of the owner of this token.
    pub token: String,
}

/// Command configuration.
#[derive(Deserialize, Debug, PartialEq, Eq)]
pub struct CommandSettings {
    /// Command name, typed right after the prefix.
    #[serde(default = "default_trigger")]
    pub trigger: String,

    /// Characters a command starts with.
    ///
    /// Mattermost clients intercept messages starting with `/`, so the default
    /// is `!`.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Maximum number of channel members considered for a mention.
    #[serde(default = "default_max_members")]
    pub max_members: usize,
}

fn default_trigger() -> String {
    "random-user".to_owned()
}

fn default_prefix() -> String {
    "!".to_owned()
}

fn default_max_members() -> usize {
    1000
}

impl Default for CommandSettings {
    fn default() -> Self {
        CommandSettings {
            trigger: default_trigger(),
            prefix: default_prefix(),
            max_members: default_max_members(),
        }
    }
}

impl Config {
    /// Loads the configuration from a YAML file and the environment.
    ///
    /// Environment variables take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid or a required value is missing
    /// from both the file and the environment.
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        let mut config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        // Normalize Mattermost URL by removing trailing slashes
        config.mattermost.url = config.mattermost.url.trim_end_matches('/').to_owned();

        Ok(config)
    }
}
