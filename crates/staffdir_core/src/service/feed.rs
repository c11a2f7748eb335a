//! Full-snapshot change feed.
//!
//! # Responsibility
//! - Register snapshot listeners and hand out scoped `Subscription` guards.
//! - Deliver the complete record set to every live listener.
//!
//! # Invariants
//! - Listeners always receive the whole set, never incremental diffs.
//! - Dropping a `Subscription` unregisters its listener before the next
//!   publish.
//! - Listeners run outside the registry lock, so a listener may subscribe or
//!   drop subscriptions without deadlocking.

use crate::model::staff::StaffMember;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback receiving the complete current record set.
pub type SnapshotListener = Arc<dyn Fn(&[StaffMember]) + Send + Sync>;

#[derive(Default)]
struct FeedState {
    next_id: u64,
    listeners: BTreeMap<u64, SnapshotListener>,
}

/// Registry of snapshot listeners.
#[derive(Default, Clone)]
pub struct SnapshotFeed {
    state: Arc<Mutex<FeedState>>,
}

impl SnapshotFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` and returns its scoped guard.
    pub fn register(&self, listener: SnapshotListener) -> Subscription {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.insert(id, listener);
        Subscription {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    /// Delivers `snapshot` to every live listener in registration order.
    pub fn publish(&self, snapshot: &[StaffMember]) {
        let listeners: Vec<SnapshotListener> = lock(&self.state).listeners.values().cloned().collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Scoped registration handle. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    state: Weak<Mutex<FeedState>>,
}

impl Subscription {
    /// Explicit teardown; equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            lock(&state).listeners.remove(&self.id);
        }
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::SnapshotFeed;
    use crate::model::staff::StaffMember;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn publish_reaches_live_listeners_only() {
        let feed = SnapshotFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let subscription = feed.register(Arc::new(move |_: &[StaffMember]| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        feed.publish(&[]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        subscription.unsubscribe();
        assert_eq!(feed.listener_count(), 0);
        feed.publish(&[]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscription_outliving_feed_drops_cleanly() {
        let feed = SnapshotFeed::new();
        let subscription = feed.register(Arc::new(|_: &[StaffMember]| {}));
        drop(feed);
        drop(subscription);
    }
}
