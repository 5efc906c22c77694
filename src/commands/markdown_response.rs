//! Markdown response formatters.
//!
//! Mattermost turns `@username` into a mention, notifying the user.

use crate::mattermost::User;

/// Formats the mention of a single user.
///
/// # Examples
///
/// ```
/// # use random_user::commands::markdown_response::format_mention;
/// # use random_user::mattermost::User;
/// let user = User { id: "u1".to_owned(), username: "alice".to_owned(), is_bot: false };
/// assert_eq!(format_mention(&user), "@alice");
/// ```
pub fn format_mention(user: &User) -> String {
    format!("@{}", user.username)
}

/// Formats the mentions of several users, keeping their order.
pub fn format_mentions(users: &[User]) -> String {
    users
        .iter()
        .map(format_mention)
        .collect::<Vec<String>>()
        .join(", ")
}

/// Formats the error shown to the invoking user when the post can't be created.
pub fn format_post_error() -> String {
    "Error: unable to post the random user message.".to_owned()
}
