//! Caller identity as resolved by the session provider.

use serde::{Deserialize, Serialize};

/// Proof of the current caller, consumed but not owned by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub name: String,
}

impl Session {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}
