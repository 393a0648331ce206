//! Users marked for removal, keyed by email.

use std::collections::BTreeSet;

use lodestar_core::EngagementUser;

/// Emails of users marked deleted.
///
/// Marking is kept beside the user list so a removal can be undone by
/// toggling again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedUsers {
    emails: BTreeSet<String>,
}

impl DeletedUsers {
    /// No users marked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `email` if unmarked, unmark it otherwise.
    pub fn toggle(&mut self, email: &str) {
        if !self.emails.remove(email) {
            self.emails.insert(email.to_string());
        }
    }

    /// Whether `email` is marked.
    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    /// Drop marks for emails no longer in `users`.
    pub fn prune(&mut self, users: &[EngagementUser]) {
        self.emails.retain(|email| users.iter().any(|u| &u.email == email));
    }

    /// Users not marked deleted, as submitted on save.
    pub fn retained(&self, users: &[EngagementUser]) -> Vec<EngagementUser> {
        users
            .iter()
            .filter(|u| !self.contains(&u.email))
            .cloned()
            .collect()
    }

    /// Marked emails in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.emails.iter().map(String::as_str)
    }

    /// Number of marked emails.
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut deleted = DeletedUsers::new();
        deleted.toggle("x@y.com");
        let before = deleted.clone();

        deleted.toggle("a@b.com");
        assert!(deleted.contains("a@b.com"));
        deleted.toggle("a@b.com");
        assert_eq!(deleted, before);

        deleted.toggle("x@y.com");
        deleted.toggle("x@y.com");
        assert_eq!(deleted, before);
    }

    #[test]
    fn test_prune_drops_stale_entries() {
        let users = vec![EngagementUser::new("a@b.com", "A", "B", "developer")];
        let mut deleted = DeletedUsers::new();
        deleted.toggle("a@b.com");
        deleted.toggle("gone@b.com");

        deleted.prune(&users);
        assert_eq!(deleted.iter().collect::<Vec<_>>(), vec!["a@b.com"]);
    }

    #[test]
    fn test_retained_excludes_marked() {
        let users = vec![
            EngagementUser::new("a@b.com", "A", "B", "developer"),
            EngagementUser::new("c@d.com", "C", "D", "admin"),
        ];
        let mut deleted = DeletedUsers::new();
        deleted.toggle("a@b.com");

        let kept = deleted.retained(&users);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].email, "c@d.com");
    }
}
