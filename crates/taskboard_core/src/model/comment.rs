//! Comment domain model.
//!
//! # Invariants
//! - `task_id` references a task, but integrity is not enforced; orphaned
//!   comments survive task deletion.
//! - Author fields are captured from the session at creation and never change.
//! - Minimum body length is a caller concern, see [`MIN_COMMENT_CHARS`].

use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque store-assigned comment identifier.
pub type CommentId = String;

/// Minimum comment length, counted in chars after trimming.
pub const MIN_COMMENT_CHARS: usize = 3;

/// Canonical record of the `comments` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    #[serde(rename = "user")]
    pub author_email: String,
    #[serde(rename = "name")]
    pub author_name: String,
    #[serde(rename = "comment")]
    pub body: String,
    /// Unix epoch milliseconds.
    #[serde(rename = "created")]
    pub created_at: i64,
}

impl Comment {
    pub fn is_authored_by(&self, email: &str) -> bool {
        self.author_email == email
    }
}

/// Write-side payload for `CommentStore::create_comment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub task_id: TaskId,
    pub author_email: String,
    pub author_name: String,
    pub body: String,
}

impl NewComment {
    /// Checks references only. Body length is validated by callers.
    pub fn validate(&self) -> Result<(), CommentValidationError> {
        if self.task_id.trim().is_empty() {
            return Err(CommentValidationError::EmptyTaskId);
        }
        if self.author_email.trim().is_empty() {
            return Err(CommentValidationError::EmptyAuthor);
        }
        Ok(())
    }

    /// Materializes the record a store would hold for this payload.
    pub fn into_comment(self, id: CommentId, created_at: i64) -> Comment {
        Comment {
            id,
            task_id: self.task_id,
            author_email: self.author_email,
            author_name: self.author_name,
            body: self.body,
            created_at,
        }
    }
}

/// Returns whether `body` satisfies the minimum comment length.
pub fn is_valid_comment_body(body: &str) -> bool {
    body.trim().chars().count() >= MIN_COMMENT_CHARS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentValidationError {
    EmptyTaskId,
    EmptyAuthor,
}

impl Display for CommentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskId => write!(f, "comment task id cannot be empty"),
            Self::EmptyAuthor => write!(f, "comment author cannot be empty"),
        }
    }
}

impl Error for CommentValidationError {}
