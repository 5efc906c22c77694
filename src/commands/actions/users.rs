//! All users command handler.
//!
//! Handles `users` and `users-here`: every candidate is mentioned, in a
//! random order, separated by commas.

use log::debug;
use rand::Rng;

use crate::commands::{
    CommandContext, CommandResult, actions::candidates, command::Command,
    markdown_response::format_mentions, selection::shuffle_users,
};

/// Mentions every eligible member of the channel in a random order.
///
/// Returns `None` when no member is eligible.
pub fn handle_users<R: Rng + ?Sized>(
    context: &CommandContext,
    command: &Command,
    rng: &mut R,
) -> Option<CommandResult> {
    debug!("handling users command: {:?}", command);

    let mut candidates = candidates(context, command);
    if candidates.is_empty() {
        return None;
    }

    shuffle_users(&mut candidates, rng);

    let result = CommandResult {
        message: format_mentions(&candidates),
    };

    debug!("users command result {:?}", result);

    Some(result)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::mattermost::{PresenceStatus, Status, User};

    fn create_user(username: &str, is_bot: bool) -> User {
        User {
            id: format!("id_{}", username),
            username: username.to_owned(),
            is_bot,
        }
    }

    fn create_test_context(users: Vec<User>, statuses: Vec<PresenceStatus>) -> CommandContext {
        CommandContext {
            channel_id: "channel1".to_owned(),
            users,
            statuses,
        }
    }

    fn mentions(result: &CommandResult) -> Vec<String> {
        let mut mentions = result
            .message
            .split(", ")
            .map(|mention| mention.to_owned())
            .collect::<Vec<String>>();
        mentions.sort();
        mentions
    }

    #[test]
    fn test_handle_users_mentions_every_human_once() {
        let context = create_test_context(
            vec![
                create_user("alice", false),
                create_user("bot1", true),
                create_user("bob", false),
                create_user("charlie", false),
            ],
            vec![],
        );

        let mut rng = StdRng::seed_from_u64(2);

        let result = handle_users(&context, &Command::Users, &mut rng).unwrap();
        assert_eq!(mentions(&result), vec!["@alice", "@bob", "@charlie"]);
    }

    #[test]
    fn test_handle_users_here() {
        let context = create_test_context(
            vec![
                create_user("alice", false),
                create_user("bob", false),
                create_user("charlie", false),
                create_user("bot1", true),
            ],
            vec![
                PresenceStatus {
                    user_id: "id_alice".to_owned(),
                    status: Status::Online,
                },
                PresenceStatus {
                    user_id: "id_bob".to_owned(),
                    status: Status::Offline,
                },
                PresenceStatus {
                    user_id: "id_charlie".to_owned(),
                    status: Status::Dnd,
                },
                PresenceStatus {
                    user_id: "id_bot1".to_owned(),
                    status: Status::Online,
                },
            ],
        );

        let result =
            handle_users(&context, &Command::UsersHere, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(mentions(&result), vec!["@alice", "@charlie"]);
    }

    #[test]
    fn test_handle_users_order_changes() {
        let users = (0..10)
            .map(|i| create_user(&format!("user{}", i), false))
            .collect::<Vec<User>>();
        let context = create_test_context(users, vec![]);
        let mut rng = StdRng::seed_from_u64(8);

        let orders = (0..10)
            .map(|_| handle_users(&context, &Command::Users, &mut rng).unwrap().message)
            .collect::<std::collections::HashSet<String>>();
        assert!(orders.len() > 1);
    }

    #[test]
    fn test_handle_users_nobody() {
        let mut rng = StdRng::seed_from_u64(1);

        let context = create_test_context(vec![create_user("bot1", true)], vec![]);
        assert!(handle_users(&context, &Command::Users, &mut rng).is_none());

        let context = create_test_context(vec![create_user("alice", false)], vec![]);
        assert!(handle_users(&context, &Command::UsersHere, &mut rng).is_none());
    }
}
