//! In-process store implementing both collections.
//!
//! # Responsibility
//! - Provide the same contract as the SQLite stores without a database.
//! - Let callers simulate an unreachable backend and count store calls.
//!
//! # Invariants
//! - Ordering, snapshot and no-op delete semantics match the SQLite stores.
//! - Snapshots are published while the write lock is held, so subscribers
//!   see writes in commit order and never an older list after a newer one.
//!   Lock order is state, then feed.
//! - While unavailable, every call fails before touching state.

use crate::model::comment::{Comment, NewComment};
use crate::model::task::{NewTask, Task, TaskId};
use crate::store::feed::{ChangeFeed, TaskSubscription};
use crate::store::{
    new_record_id, now_epoch_ms, sort_newest_first, CommentStore, StoreError, StoreResult,
    TaskStore,
};
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe in-memory `task` + `comments` collections.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
    feed: ChangeFeed,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_seq: i64,
    tasks: Vec<(i64, Task)>,
    comments: Vec<Comment>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Makes every following call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of contract calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }

    fn enter(&self, operation: &'static str) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "in-memory store offline during {operation}"
            )));
        }
        Ok(())
    }

    fn snapshot_for(state: &MemoryState, owner: &str) -> Vec<Task> {
        let mut owned: Vec<(i64, Task)> = state
            .tasks
            .iter()
            .filter(|(_, task)| task.owner == owner)
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        owned.into_iter().map(|(_, task)| task).collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for InMemoryStore {
    fn create_task(&self, new_task: &NewTask) -> StoreResult<TaskId> {
        self.enter("create_task")?;
        new_task.validate()?;

        let task = Task {
            id: new_record_id(),
            owner: new_task.owner.clone(),
            body: new_task.body.clone(),
            is_public: new_task.is_public,
            created_at: now_epoch_ms(),
        };
        let id = task.id.clone();

        let mut state = self.lock();
        state.next_seq += 1;
        let seq = state.next_seq;
        state.tasks.push((seq, task));
        self.feed
            .publish(&new_task.owner, Self::snapshot_for(&state, &new_task.owner));
        Ok(id)
    }

    fn delete_task(&self, id: &str) -> StoreResult<()> {
        self.enter("delete_task")?;

        let mut state = self.lock();
        match state.tasks.iter().position(|(_, task)| task.id == id) {
            Some(index) => {
                let (_, removed) = state.tasks.remove(index);
                self.feed
                    .publish(&removed.owner, Self::snapshot_for(&state, &removed.owner));
            }
            None => debug!("event=task_delete module=store status=noop task_id={id}"),
        }
        Ok(())
    }

    fn get_task_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        self.enter("get_task_by_id")?;
        Ok(self
            .lock()
            .tasks
            .iter()
            .find(|(_, task)| task.id == id)
            .map(|(_, task)| task.clone()))
    }

    fn subscribe_tasks_by_owner(&self, owner: &str) -> StoreResult<TaskSubscription> {
        self.enter("subscribe_tasks_by_owner")?;
        // Registering under the state lock keeps a concurrent write from
        // slipping between the initial snapshot and the registration.
        let state = self.lock();
        Ok(self.feed.subscribe(owner, Self::snapshot_for(&state, owner)))
    }
}

impl CommentStore for InMemoryStore {
    fn create_comment(&self, new_comment: &NewComment) -> StoreResult<Comment> {
        self.enter("create_comment")?;
        new_comment.validate()?;

        let comment = new_comment
            .clone()
            .into_comment(new_record_id(), now_epoch_ms());
        self.lock().comments.push(comment.clone());
        Ok(comment)
    }

    fn delete_comment(&self, id: &str) -> StoreResult<()> {
        self.enter("delete_comment")?;
        self.lock().comments.retain(|comment| comment.id != id);
        Ok(())
    }

    fn list_comments_by_task(&self, task_id: &str) -> StoreResult<Vec<Comment>> {
        self.enter("list_comments_by_task")?;
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|comment| comment.task_id == task_id)
            .cloned()
            .collect())
    }
}
