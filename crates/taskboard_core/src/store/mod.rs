//! Store boundary: collection contracts and their implementations.
//!
//! # Responsibility
//! - Define use-case oriented contracts for the `task` and `comments`
//!   collections.
//! - Provide a SQLite backend and an in-process fake with identical
//!   semantics.
//!
//! # Invariants
//! - Identifiers and `created_at` are assigned here, never by callers.
//! - Deletes are unconditional and tolerate unknown ids.
//! - Stores do not check ownership or authorship; callers gate those.

use crate::db::DbError;
use crate::model::comment::{Comment, CommentValidationError, NewComment};
use crate::model::task::{NewTask, Task, TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment_store;
pub mod feed;
pub mod memory;
pub mod task_store;

pub use comment_store::SqliteCommentStore;
pub use feed::{ChangeFeed, TaskSubscription};
pub use memory::InMemoryStore;
pub use task_store::SqliteTaskStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by every store operation.
#[derive(Debug)]
pub enum StoreError {
    TaskValidation(TaskValidationError),
    CommentValidation(CommentValidationError),
    Db(DbError),
    /// Backend could not be reached or refused the call.
    Unavailable(String),
    InvalidData(String),
}

impl StoreError {
    /// Returns whether this failure belongs to the "store unavailable" class.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Db(_) | Self::Unavailable(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskValidation(err) => write!(f, "{err}"),
            Self::CommentValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskValidation(err) => Some(err),
            Self::CommentValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Unavailable(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::TaskValidation(value)
    }
}

impl From<CommentValidationError> for StoreError {
    fn from(value: CommentValidationError) -> Self {
        Self::CommentValidation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Contract of the `task` collection.
pub trait TaskStore {
    /// Appends a task and returns its store-assigned id.
    fn create_task(&self, new_task: &NewTask) -> StoreResult<TaskId>;
    /// Removes a task. Unknown ids are a no-op.
    fn delete_task(&self, id: &str) -> StoreResult<()>;
    /// One-shot point read. `None` means not found.
    fn get_task_by_id(&self, id: &str) -> StoreResult<Option<Task>>;
    /// Opens a live subscription on one owner's tasks, newest first.
    ///
    /// The current snapshot is queued before this returns.
    fn subscribe_tasks_by_owner(&self, owner: &str) -> StoreResult<TaskSubscription>;
}

/// Contract of the `comments` collection.
pub trait CommentStore {
    /// Stores a comment and returns the record as persisted, with its
    /// assigned id and creation time.
    fn create_comment(&self, new_comment: &NewComment) -> StoreResult<Comment>;
    /// Removes a comment. Unknown ids are a no-op.
    fn delete_comment(&self, id: &str) -> StoreResult<()>;
    /// One-shot read of every comment on a task. Order is unspecified.
    fn list_comments_by_task(&self, task_id: &str) -> StoreResult<Vec<Comment>>;
}

impl<S: TaskStore + ?Sized> TaskStore for &S {
    fn create_task(&self, new_task: &NewTask) -> StoreResult<TaskId> {
        (**self).create_task(new_task)
    }

    fn delete_task(&self, id: &str) -> StoreResult<()> {
        (**self).delete_task(id)
    }

    fn get_task_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        (**self).get_task_by_id(id)
    }

    fn subscribe_tasks_by_owner(&self, owner: &str) -> StoreResult<TaskSubscription> {
        (**self).subscribe_tasks_by_owner(owner)
    }
}

impl<S: CommentStore + ?Sized> CommentStore for &S {
    fn create_comment(&self, new_comment: &NewComment) -> StoreResult<Comment> {
        (**self).create_comment(new_comment)
    }

    fn delete_comment(&self, id: &str) -> StoreResult<()> {
        (**self).delete_comment(id)
    }

    fn list_comments_by_task(&self, task_id: &str) -> StoreResult<Vec<Comment>> {
        (**self).list_comments_by_task(task_id)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generates a fresh opaque record id.
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Orders tasks newest first; `seq` breaks `created_at` ties.
pub(crate) fn sort_newest_first(tasks: &mut [(i64, Task)]) {
    tasks.sort_by(|(seq_a, a), (seq_b, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| seq_b.cmp(seq_a))
    });
}

#[cfg(test)]
mod tests {
    use super::{new_record_id, sort_newest_first, StoreError};
    use crate::db::DbError;
    use crate::model::task::Task;

    fn task(id: &str, created_at: i64) -> Task {
        Task {
            id: id.to_string(),
            owner: "a@x.com".to_string(),
            body: id.to_string(),
            is_public: false,
            created_at,
        }
    }

    #[test]
    fn sort_orders_by_created_desc_then_insertion_desc() {
        let mut rows = vec![
            (1, task("old", 10)),
            (2, task("tie-first", 20)),
            (3, task("tie-second", 20)),
        ];
        sort_newest_first(&mut rows);
        let ids: Vec<&str> = rows.iter().map(|(_, task)| task.id.as_str()).collect();
        assert_eq!(ids, vec!["tie-second", "tie-first", "old"]);
    }

    #[test]
    fn record_ids_are_distinct_hyphenated_v4_strings() {
        let first = new_record_id();
        let second = new_record_id();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert_eq!(first.chars().nth(14), Some('4'));
    }

    #[test]
    fn unavailable_class_covers_backend_failures_only() {
        assert!(StoreError::Unavailable("offline".to_string()).is_unavailable());
        assert!(StoreError::Db(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1
        })
        .is_unavailable());
        assert!(!StoreError::InvalidData("bad".to_string()).is_unavailable());
    }
}
