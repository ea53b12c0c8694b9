//! Page-load hooks and view-models.
//!
//! # Responsibility
//! - Gate page loads on session and visibility, producing props or a redirect.
//! - Hold per-page view state and turn user intents into store calls.
//!
//! # Invariants
//! - Stores and feedback sinks are passed in explicitly; there is no global
//!   store handle.
//! - Failures are handled where they occur and never escape as panics.

pub mod feedback;
pub mod task_detail;
pub mod task_list;
