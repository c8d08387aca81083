use dashmap::DashMap;

use troika_core::ids::{TaskId, UserId};

/// Per-user record of the task IDs in the most recent selection.
///
/// Process lifetime only; an absent entry is an empty previous display.
/// Entries are written whole on every selection, so concurrent requests for
/// the same user resolve last-write-wins, and different users do not block
/// one another.
///
/// Injected as a dependency (behind `Arc`), not a hidden global, so tests
/// can construct and reset their own instance.
#[derive(Debug, Default)]
pub struct DisplayTracker {
    inner: DashMap<UserId, Vec<TaskId>>,
}

impl DisplayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The previous selection for a user. Empty when none was recorded.
    pub fn get(&self, user: &UserId) -> Vec<TaskId> {
        self.inner
            .get(user)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Overwrite the previous selection for a user.
    pub fn set(&self, user: &UserId, ids: Vec<TaskId>) {
        let _ = self.inner.insert(user.clone(), ids);
    }

    /// Forget a user's previous selection.
    pub fn clear(&self, user: &UserId) {
        let _ = self.inner.remove(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn absent_user_is_empty() {
        let tracker = DisplayTracker::new();
        assert!(tracker.get(&UserId::from_raw("user_a")).is_empty());
    }

    #[test]
    fn set_then_get() {
        let tracker = DisplayTracker::new();
        let user = UserId::from_raw("user_a");
        tracker.set(&user, vec![TaskId::from_raw("t1"), TaskId::from_raw("t2")]);
        assert_eq!(
            tracker.get(&user),
            vec![TaskId::from_raw("t1"), TaskId::from_raw("t2")]
        );
    }

    #[test]
    fn set_overwrites_whole_entry() {
        let tracker = DisplayTracker::new();
        let user = UserId::from_raw("user_a");
        tracker.set(&user, vec![TaskId::from_raw("t1")]);
        tracker.set(&user, vec![TaskId::from_raw("t2")]);
        assert_eq!(tracker.get(&user), vec![TaskId::from_raw("t2")]);
    }

    #[test]
    fn users_are_isolated() {
        let tracker = DisplayTracker::new();
        let a = UserId::from_raw("user_a");
        let b = UserId::from_raw("user_b");
        tracker.set(&a, vec![TaskId::from_raw("t1")]);
        assert!(tracker.get(&b).is_empty());
        tracker.clear(&a);
        assert!(tracker.get(&a).is_empty());
    }

    #[test]
    fn concurrent_writers_land_on_some_write() {
        let tracker = Arc::new(DisplayTracker::new());
        let user = UserId::from_raw("user_a");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                let user = user.clone();
                std::thread::spawn(move || {
                    tracker.set(&user, vec![TaskId::from_raw(format!("t{i}"))]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Last-write-wins: exactly one of the written values survives.
        let result = tracker.get(&user);
        assert_eq!(result.len(), 1);
        assert!(result[0].as_str().starts_with('t'));
    }
}
