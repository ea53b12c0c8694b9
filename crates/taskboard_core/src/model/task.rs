//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical `task` collection record.
//! - Validate write-side payloads before they reach a store.
//!
//! # Invariants
//! - `owner` is set once at creation and never changes.
//! - `body` is non-empty after trimming.
//! - `created_at` is epoch milliseconds assigned by the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque store-assigned task identifier.
pub type TaskId = String;

/// Canonical record of the `task` collection.
///
/// Serialized field names follow the collection schema (`task`, `user`,
/// `public`, `created`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Creator email.
    #[serde(rename = "user")]
    pub owner: String,
    #[serde(rename = "task")]
    pub body: String,
    #[serde(rename = "public")]
    pub is_public: bool,
    /// Unix epoch milliseconds.
    #[serde(rename = "created")]
    pub created_at: i64,
}

impl Task {
    /// Returns whether `viewer` owns this task.
    pub fn is_owned_by(&self, viewer: &str) -> bool {
        self.owner == viewer
    }

    /// Presentation label for the visibility flag.
    pub fn visibility_label(&self) -> &'static str {
        if self.is_public {
            "public"
        } else {
            "private"
        }
    }
}

/// Write-side payload for `TaskStore::create_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub owner: String,
    pub body: String,
    pub is_public: bool,
}

impl NewTask {
    pub fn new(owner: impl Into<String>, body: impl Into<String>, is_public: bool) -> Self {
        Self {
            owner: owner.into(),
            body: body.into(),
            is_public,
        }
    }

    /// Validates structural invariants required before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.owner.trim().is_empty() {
            return Err(TaskValidationError::EmptyOwner);
        }
        if self.body.trim().is_empty() {
            return Err(TaskValidationError::EmptyBody);
        }
        Ok(())
    }
}

/// Validation failures for task payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyOwner,
    EmptyBody,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwner => write!(f, "task owner cannot be empty"),
            Self::EmptyBody => write!(f, "task body cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}
