//! random-user - A Mattermost bot mentioning a random member of a channel.
//!
//! # Overview
//!
//! The bot listens to the posts of every channel it is a member of. When
//! someone posts the command, it mentions one random member of the channel,
//! or all of them in a random order. Bot accounts are never mentioned.
//!
//! # Bot Commands
//!
//! - `!random-user` or `!random-user user` - Mention one random member
//! - `!random-user users` - Mention every member, shuffled
//! - `!random-user user-here` - Mention one random member who is not offline
//! - `!random-user users-here` - Mention every member who is not offline, shuffled
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! mattermost:
//!   url: "https://chat.example.com"
//!   token: "bot-access-token"
//! ```
//!
//! The bot account needs the `create_post_ephemeral` permission to report
//! failures to the invoking user, see [`config`].
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `RANDOM_USER_` prefix:
//!
//! ```bash
//! export RANDOM_USER_MATTERMOST__URL="https://chat.example.com"
//! export RANDOM_USER_MATTERMOST__TOKEN="bot-access-token"
//! ```
//!
//! # Usage
//!
//! ```bash
//! random-user --config config.yaml
//! ```
//!
//! # Architecture
//!
//! - [`bot`] - Activation and handling of each invocation
//! - [`commands`] - Command parsing, member selection and response formatting
//! - [`config`] - YAML configuration with environment variable support
//! - [`mattermost`] - Mattermost REST client and event stream
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod commands;
mod config;
mod mattermost;

/// Command-line arguments.
///
/// # Examples
///
/// ```bash
/// random-user --config config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Values can be overridden with `RANDOM_USER_` environment variables,
    /// e.g. `RANDOM_USER_MATTERMOST__TOKEN`.
    #[arg(short, long)]
    config: String,
}

/// Main entry point.
///
/// 1. Configures the logger with `info` level by default
/// 2. Parses command-line arguments
/// 3. Loads the configuration file and environment overrides
/// 4. Resolves the bot account
/// 5. Listens to the event stream until the process is terminated
///
/// Configuration and start-up errors are logged and end the process.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting random-user {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let bot = match Bot::new(config).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {}", e);
            return;
        }
    };

    if let Err(e) = bot.start().await {
        error!("Bot stopped: {}", e);
    }
}
