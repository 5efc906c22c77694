//! Single user command handler.
//!
//! Handles `user` and `user-here`: one member of the channel is drawn
//! uniformly among the candidates and mentioned.

use log::debug;
use rand::Rng;

use crate::commands::{
    CommandContext, CommandResult, actions::candidates, command::Command,
    markdown_response::format_mention, selection::pick_user,
};

/// Mentions one random member of the channel.
///
/// # Returns
///
/// - `Some(CommandResult)`: the mention of the drawn member
/// - `None`: no member is eligible, nothing should be posted
pub fn handle_user<R: Rng + ?Sized>(
    context: &CommandContext,
    command: &Command,
    rng: &mut R,
) -> Option<CommandResult> {
    debug!("handling user command: {:?}", command);

    let candidates = candidates(context, command);
    let user = pick_user(&candidates, rng)?;

    let result = CommandResult {
        message: format_mention(user),
    };

    debug!("user command result {:?}", result);

    Some(result)
}
