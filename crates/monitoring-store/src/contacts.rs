//! Chat contact lists: friends, everyone else, and blocked users.

use tracing::debug;

use monitoring_shared::types::{Contact, UserId};

/// The three contact lists of the chat widget. A user sits in at most one of
/// `friends` and `blocked`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    friends: Vec<Contact>,
    others: Vec<Contact>,
    blocked: Vec<Contact>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the lists with what the hub reported. `all_users` is every
    /// user except the current one; friends are taken out of it.
    pub fn load(&mut self, friends: Vec<Contact>, all_users: Vec<Contact>) {
        self.others = all_users
            .into_iter()
            .filter(|u| !friends.iter().any(|f| f.user_id == u.user_id))
            .collect();
        self.friends = friends;
        self.blocked.clear();
        debug!(
            friends = self.friends.len(),
            others = self.others.len(),
            "Roster loaded"
        );
    }

    pub fn friends(&self) -> &[Contact] {
        &self.friends
    }

    /// Users that can still be added as friends.
    pub fn others(&self) -> &[Contact] {
        &self.others
    }

    pub fn blocked(&self) -> &[Contact] {
        &self.blocked
    }

    pub fn find(&self, user_id: UserId) -> Option<&Contact> {
        self.friends
            .iter()
            .chain(&self.others)
            .chain(&self.blocked)
            .find(|c| c.user_id == user_id)
    }

    pub fn is_friend(&self, user_id: UserId) -> bool {
        self.friends.iter().any(|c| c.user_id == user_id)
    }

    pub fn is_blocked(&self, user_id: UserId) -> bool {
        self.blocked.iter().any(|c| c.user_id == user_id)
    }

    /// Move a user into friends. Returns false when the user is unknown or
    /// already a friend.
    pub fn add_friend(&mut self, user_id: UserId) -> bool {
        if self.is_friend(user_id) {
            return false;
        }
        let Some(contact) = take(&mut self.others, user_id).or_else(|| take(&mut self.blocked, user_id))
        else {
            return false;
        };
        self.friends.push(contact);
        true
    }

    /// Move a friend back to the "others" list.
    pub fn remove_friend(&mut self, user_id: UserId) -> bool {
        match take(&mut self.friends, user_id) {
            Some(contact) => {
                self.others.push(contact);
                true
            }
            None => false,
        }
    }

    /// Block a user, removing them from friends.
    pub fn block(&mut self, user_id: UserId) -> bool {
        if self.is_blocked(user_id) {
            return false;
        }
        let Some(contact) = take(&mut self.friends, user_id).or_else(|| take(&mut self.others, user_id))
        else {
            return false;
        };
        self.blocked.push(contact);
        true
    }

    pub fn unblock(&mut self, user_id: UserId) -> bool {
        match take(&mut self.blocked, user_id) {
            Some(contact) => {
                self.others.push(contact);
                true
            }
            None => false,
        }
    }
}

fn take(list: &mut Vec<Contact>, user_id: UserId) -> Option<Contact> {
    let idx = list.iter().position(|c| c.user_id == user_id)?;
    Some(list.remove(idx))
}
