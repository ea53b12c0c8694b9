//! Domain model for tasks, comments and caller sessions.
//!
//! # Responsibility
//! - Define canonical records exchanged with the store boundary.
//! - Define write-side payloads with structural validation.
//!
//! # Invariants
//! - Identifiers and creation timestamps are assigned by the store, never by
//!   callers.
//! - Records are immutable after creation; there is no update path.

pub mod comment;
pub mod session;
pub mod task;
