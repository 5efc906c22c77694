//! Member filtering and random selection.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::mattermost::{PresenceStatus, Status, User};

/// Removes bot accounts.
pub fn filter_bots(users: Vec<User>) -> Vec<User> {
    users.into_iter().filter(|user| !user.is_bot).collect()
}

/// Keeps the users whose status is anything but [`Status::Offline`].
///
/// Unknown statuses such as `ooo` are kept. Users without a status are
/// considered offline.
pub fn filter_online(users: Vec<User>, statuses: &[PresenceStatus]) -> Vec<User> {
    let not_offline = statuses
        .iter()
        .filter(|presence| presence.status != Status::Offline)
        .map(|presence| presence.user_id.as_str())
        .collect::<HashSet<&str>>();

    users
        .into_iter()
        .filter(|user| not_offline.contains(user.id.as_str()))
        .collect()
}

/// Shuffles users in place (Fisher–Yates).
pub fn shuffle_users<R: Rng + ?Sized>(users: &mut [User], rng: &mut R) {
    users.shuffle(rng);
}

/// Picks one user with a uniform index draw, `None` when `users` is empty.
pub fn pick_user<'a, R: Rng + ?Sized>(users: &'a [User], rng: &mut R) -> Option<&'a User> {
    if users.is_empty() {
        return None;
    }

    users.get(rng.random_range(0..users.len()))
}
