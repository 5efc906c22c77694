//! Command action handlers.
//!
//! Individual handler functions for each selection mode. Each handler receives
//! a [`CommandContext`](crate::commands::CommandContext), picks the members to
//! mention and returns a [`CommandResult`](crate::commands::CommandResult), or
//! `None` when nobody is left to mention.
//!
//! # Available Handlers
//!
//! - [`handle_user`] - Mention one random member
//! - [`handle_users`] - Mention every member in a random order

mod user;
mod users;

pub use crate::commands::actions::{user::handle_user, users::handle_users};

use log::debug;

use crate::{
    commands::{
        CommandContext,
        command::Command,
        selection::{filter_bots, filter_online},
    },
    mattermost::User,
};

/// Members eligible for a mention: no bots, and nobody offline for `-here` commands.
fn candidates(context: &CommandContext, command: &Command) -> Vec<User> {
    let humans = filter_bots(context.users.clone());

    if !command.online_only() {
        return humans;
    }

    let online = filter_online(humans, &context.statuses);
    debug!(
        "{} members not offline in channel {}",
        online.len(),
        context.channel_id
    );
    online
}
