//! Live task subscriptions.
//!
//! # Responsibility
//! - Track open subscriptions keyed by owner.
//! - Fan out full snapshots (never diffs) to the subscribers of one owner.
//!
//! # Invariants
//! - A subscriber only ever receives snapshots for its own owner.
//! - Each subscriber holds at most one pending snapshot; a newer push
//!   replaces an unread one.
//! - A released subscription is unregistered exactly once and receives
//!   nothing afterwards.
//! - Lock poisoning is recovered; feed calls never panic.

use crate::model::task::Task;
use log::{debug, info};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Full ordered result set of one owner's tasks.
pub type Snapshot = Vec<Task>;

/// Shared subscriber registry. Clones point at the same registry.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<Mutex<FeedState>>,
}

#[derive(Debug, Default)]
struct FeedState {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

#[derive(Debug)]
struct Subscriber {
    id: u64,
    owner: String,
    slot: Arc<SnapshotSlot>,
}

/// Latest-value mailbox between the feed and one subscription.
#[derive(Debug, Default)]
struct SnapshotSlot {
    pending: Mutex<Option<Snapshot>>,
    ready: Condvar,
}

impl SnapshotSlot {
    fn put(&self, snapshot: Snapshot) {
        *lock(&self.pending) = Some(snapshot);
        self.ready.notify_all();
    }

    fn take(&self) -> Option<Snapshot> {
        lock(&self.pending).take()
    }

    /// Waits for a snapshot; `None` waits without a deadline.
    fn wait(&self, timeout: Option<Duration>) -> Option<Snapshot> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut pending = lock(&self.pending);
        loop {
            if let Some(snapshot) = pending.take() {
                return Some(snapshot);
            }
            pending = match deadline {
                None => self
                    .ready
                    .wait(pending)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    self.ready
                        .wait_timeout(pending, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for `owner` with `initial` already pending.
    pub fn subscribe(&self, owner: &str, initial: Snapshot) -> TaskSubscription {
        let slot = Arc::new(SnapshotSlot::default());
        slot.put(initial);

        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.subscribers.push(Subscriber {
            id,
            owner: owner.to_string(),
            slot: Arc::clone(&slot),
        });
        info!(
            "event=subscription_open module=store status=ok subscription_id={id} active={}",
            state.subscribers.len()
        );

        TaskSubscription {
            id,
            owner: owner.to_string(),
            slot,
            feed: Some(self.clone()),
        }
    }

    /// Returns whether anyone currently listens to `owner`.
    pub fn has_subscribers(&self, owner: &str) -> bool {
        self.lock()
            .subscribers
            .iter()
            .any(|subscriber| subscriber.owner == owner)
    }

    /// Delivers `snapshot` to every subscriber of `owner`, replacing any
    /// snapshot they have not read yet. Returns the number of deliveries.
    pub fn publish(&self, owner: &str, snapshot: Snapshot) -> usize {
        let state = self.lock();
        let mut delivered = 0;
        for subscriber in state
            .subscribers
            .iter()
            .filter(|subscriber| subscriber.owner == owner)
        {
            subscriber.slot.put(snapshot.clone());
            delivered += 1;
        }
        debug!(
            "event=subscription_push module=store status=ok delivered={delivered} items={}",
            snapshot.len()
        );
        delivered
    }

    /// Number of registered subscriptions across all owners.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn unsubscribe(&self, id: u64) {
        let mut state = self.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|subscriber| subscriber.id != id);
        let removed = before != state.subscribers.len();
        info!(
            "event=subscription_close module=store status=ok subscription_id={id} removed={removed} active={}",
            state.subscribers.len()
        );
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        lock(&self.inner)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cancellable stream of full task snapshots for one owner.
///
/// The sequence is lazy, unbounded and cannot be restarted. Only the newest
/// unread snapshot is kept. Dropping the value releases the registration,
/// so every exit path closes it.
///
/// Iterating blocks until the next snapshot arrives; single-threaded callers
/// should prefer [`TaskSubscription::try_next`] or
/// [`TaskSubscription::latest`].
#[derive(Debug)]
pub struct TaskSubscription {
    id: u64,
    owner: String,
    slot: Arc<SnapshotSlot>,
    feed: Option<ChangeFeed>,
}

impl TaskSubscription {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_active(&self) -> bool {
        self.feed.is_some()
    }

    /// Returns the pending snapshot without blocking.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        if !self.is_active() {
            return None;
        }
        self.slot.take()
    }

    /// Waits up to `timeout` for the next snapshot.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Snapshot> {
        if !self.is_active() {
            return None;
        }
        self.slot.wait(Some(timeout))
    }

    /// Returns the newest pending snapshot, if any.
    pub fn latest(&mut self) -> Option<Snapshot> {
        self.try_next()
    }

    /// Releases the registration. No snapshot is delivered afterwards.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.unsubscribe(self.id);
            self.slot.take();
        }
    }
}

impl Iterator for TaskSubscription {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.is_active() {
            return None;
        }
        self.slot.wait(None)
    }
}

impl Drop for TaskSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
