//! Process-lifetime user store.
//!
//! Single-key operations are atomic under concurrent access; there are no
//! multi-operation transactions, so a `list()` snapshot may be stale as soon
//! as it returns.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use super::user::{User, UserInput};

/// First id handed out by an empty store.
const FIRST_ID: u64 = 1;

/// In-memory user store with a monotonic id counter.
#[derive(Debug)]
pub struct UserStore {
    users: DashMap<String, User>,
    next_id: AtomicU64,
}

impl UserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicU64::new(FIRST_ID),
        }
    }

    /// Create a store holding the three fixed seed records (ids "1".."3").
    ///
    /// The next assigned id is 4.
    pub fn with_seed_data() -> Self {
        let seed = [
            User::new("1", "user1", "user1@example.com"),
            User::new("2", "user2", "user2@example.com"),
            User::new("3", "user3", "user3@example.com"),
        ];
        let next_id = seed.len() as u64 + FIRST_ID;

        let users = DashMap::with_capacity(seed.len());
        for user in seed {
            users.insert(user.id.clone(), user);
        }

        Self {
            users,
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Snapshot of all users, in creation order.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by_key(|user| creation_key(&user.id));
        users
    }

    /// Look up a user; absence is not an error.
    pub fn get(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|entry| entry.value().clone())
    }

    /// Store a new user under the next id, ignoring any id the caller sent.
    pub fn create(&self, candidate: UserInput) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let user = candidate.into_user(id.clone());
        self.users.insert(id, user.clone());
        debug!(id = %user.id, "user created");
        user
    }

    /// Replace every field of an existing user except its id.
    ///
    /// Returns `None` and changes nothing when `id` is unknown.
    pub fn update(&self, id: &str, replacement: UserInput) -> Option<User> {
        let mut entry = self.users.get_mut(id)?;
        let user = replacement.into_user(id);
        *entry = user.clone();
        debug!(id = %id, "user replaced");
        Some(user)
    }

    /// Remove a user; `false` when it was not present.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.users.remove(id).is_some();
        if removed {
            debug!(id = %id, "user deleted");
        }
        removed
    }

    /// Number of stored users.
    pub fn count(&self) -> usize {
        self.users.len()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids are decimal counters, so numeric order is creation order.
fn creation_key(id: &str) -> (u64, String) {
    (id.parse().unwrap_or(u64::MAX), id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn seed_data_has_three_users() {
        let store = UserStore::with_seed_data();
        assert_eq!(store.count(), 3);

        let ids: Vec<String> = store.list().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn create_assigns_next_id_and_ignores_caller_id() {
        let store = UserStore::with_seed_data();
        let mut input = UserInput::new("n", "e");
        input.id = Some(serde_json::Value::from("1"));

        let created = store.create(input);
        assert_eq!(created, User::new("4", "n", "e"));
        assert_eq!(store.get("1").unwrap().name, "user1");
        assert_eq!(store.count(), 4);
    }

    #[test]
    fn empty_store_starts_at_one() {
        let store = UserStore::new();
        assert_eq!(store.create(UserInput::new("a", "b")).id, "1");
        assert_eq!(store.create(UserInput::new("c", "d")).id, "2");
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let store = UserStore::with_seed_data();
        let created = store.create(UserInput::new("n", "e"));
        assert!(store.delete(&created.id));

        let next = store.create(UserInput::new("n", "e"));
        assert_eq!(next.id, "5");
    }

    #[test]
    fn update_replaces_everything_but_id() {
        let store = UserStore::with_seed_data();
        let updated = store.update("2", UserInput::new("new", "new@example.com")).unwrap();

        assert_eq!(updated, User::new("2", "new", "new@example.com"));
        assert_eq!(store.get("2"), Some(updated));
    }

    #[test]
    fn update_unknown_id_changes_nothing() {
        let store = UserStore::with_seed_data();
        assert!(store.update("99", UserInput::new("n", "e")).is_none());
        assert_eq!(store.count(), 3);
        assert!(store.get("99").is_none());
    }

    #[test]
    fn delete_is_true_then_false() {
        let store = UserStore::with_seed_data();
        assert!(store.delete("2"));
        assert!(!store.delete("2"));
        assert!(store.get("2").is_none());

        let ids: Vec<String> = store.list().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn list_orders_numerically_past_nine() {
        let store = UserStore::new();
        for i in 0..12 {
            store.create(UserInput::new(format!("u{i}"), "e"));
        }
        let ids: Vec<String> = store.list().into_iter().map(|u| u.id).collect();
        let expected: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn concurrent_creates_yield_distinct_ids() {
        let store = Arc::new(UserStore::with_seed_data());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..50)
                        .map(|i| store.create(UserInput::new(format!("t{t}-{i}"), "e")).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 400);
        assert_eq!(store.count(), 403);
        assert!(!ids.contains("1"));
    }
}
