//! Core of Taskboard: personal task lists with shareable public tasks and
//! comments.
//! Page-load hooks and view-models here are the only business logic; storage
//! and identity sit behind the `store` and `session` boundaries.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod store;

pub use config::{share_url, AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::comment::{
    Comment, CommentId, CommentValidationError, NewComment, MIN_COMMENT_CHARS,
};
pub use model::session::Session;
pub use model::task::{NewTask, Task, TaskId, TaskValidationError};
pub use service::feedback::{Clipboard, Notifier, RecordingFeedback};
pub use service::task_detail::{load_task_page, TaskDetailViewModel, TaskPageProps, TaskView};
pub use service::task_list::{
    load_dashboard, DashboardProps, ListState, TaskDraft, TaskListViewModel, TaskRow, UserInfo,
};
pub use session::{
    require_session, PageLoad, PageRequest, Redirect, SessionProvider, StaticSessionProvider,
};
pub use store::{
    ChangeFeed, CommentStore, InMemoryStore, SqliteCommentStore, SqliteTaskStore, StoreError,
    StoreResult, TaskStore, TaskSubscription,
};

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
