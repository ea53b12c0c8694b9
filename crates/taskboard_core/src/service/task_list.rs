//! Dashboard page: session-gated load and the live task list view-model.
//!
//! # Responsibility
//! - Gate the dashboard on an authenticated session.
//! - Mirror the viewer's tasks from one live subscription.
//! - Turn submit/share/remove intents into store calls.
//!
//! # Invariants
//! - Exactly one subscription per mounted view, released on unmount or drop.
//! - The local list is only ever replaced by a whole snapshot; intents never
//!   splice it, so a created or deleted task shows up with the next push.
//! - Task bodies are never logged.

use crate::config::share_url;
use crate::model::task::{NewTask, Task, TaskId};
use crate::service::feedback::{Clipboard, Notifier};
use crate::session::{require_session, PageLoad, PageRequest, SessionProvider};
use crate::store::feed::Snapshot;
use crate::store::{StoreResult, TaskStore, TaskSubscription};
use log::{error, info, warn};
use serde::Serialize;
use std::time::Duration;

/// Props handed to the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardProps {
    pub user: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub email: String,
}

/// Dashboard page-load hook.
pub fn load_dashboard<P: SessionProvider>(
    provider: &P,
    request: &PageRequest,
) -> PageLoad<DashboardProps> {
    require_session(provider, request).map(|session| DashboardProps {
        user: UserInfo {
            email: session.email,
        },
    })
}

/// Lifecycle of a task list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Mounted, waiting for the first snapshot.
    Loading,
    Synced,
    /// Subscription released; intents and pushes are ignored.
    Unmounted,
}

/// Form fields of the "new task" input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub body: String,
    pub is_public: bool,
}

/// One rendered row of the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub body: String,
    pub visibility: &'static str,
    /// Only public tasks offer a share link.
    pub can_share: bool,
    pub created_at: i64,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            body: task.body.clone(),
            visibility: task.visibility_label(),
            can_share: task.is_public,
            created_at: task.created_at,
        }
    }
}

/// View-model behind the dashboard task list.
pub struct TaskListViewModel<S, F> {
    store: S,
    feedback: F,
    viewer: String,
    share_base_url: String,
    subscription: Option<TaskSubscription>,
    tasks: Vec<Task>,
    state: ListState,
    draft: TaskDraft,
}

impl<S: TaskStore, F: Notifier + Clipboard> TaskListViewModel<S, F> {
    /// Mounts the view and opens its subscription.
    ///
    /// The first snapshot is applied by the next [`Self::pump`].
    pub fn mount(
        store: S,
        feedback: F,
        viewer_email: impl Into<String>,
        share_base_url: impl Into<String>,
    ) -> StoreResult<Self> {
        let viewer = viewer_email.into();
        let subscription = store.subscribe_tasks_by_owner(&viewer).map_err(|err| {
            error!("event=task_list_mount module=service status=error error={err}");
            err
        })?;
        info!("event=task_list_mount module=service status=ok");

        Ok(Self {
            store,
            feedback,
            viewer,
            share_base_url: share_base_url.into(),
            subscription: Some(subscription),
            tasks: Vec::new(),
            state: ListState::Loading,
            draft: TaskDraft::default(),
        })
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// Current local list, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn rows(&self) -> Vec<TaskRow> {
        self.tasks.iter().map(TaskRow::from).collect()
    }

    /// Applies the newest pending snapshot, if any.
    ///
    /// Returns whether the local list was replaced.
    pub fn pump(&mut self) -> bool {
        let latest = self.subscription.as_mut().and_then(TaskSubscription::latest);
        match latest {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Blocks up to `timeout` for one snapshot, then drains anything newer.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        let Some(first) = subscription.next_timeout(timeout) else {
            return false;
        };
        let snapshot = subscription.latest().unwrap_or(first);
        self.apply_snapshot(snapshot);
        true
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        if self.state == ListState::Loading {
            self.state = ListState::Synced;
        }
        self.tasks = snapshot;
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn set_draft_body(&mut self, body: impl Into<String>) {
        self.draft.body = body.into();
    }

    pub fn set_draft_public(&mut self, is_public: bool) {
        self.draft.is_public = is_public;
    }

    /// Registers the draft as a new task.
    ///
    /// A blank draft is ignored without a store call. On success the draft is
    /// cleared; the list itself changes only with the next pushed snapshot.
    /// Store failures are logged and swallowed, keeping the draft.
    pub fn submit_task(&mut self) -> Option<TaskId> {
        if self.state == ListState::Unmounted {
            return None;
        }
        let body = self.draft.body.trim();
        if body.is_empty() {
            return None;
        }

        let new_task = NewTask::new(self.viewer.as_str(), body, self.draft.is_public);
        match self.store.create_task(&new_task) {
            Ok(task_id) => {
                info!("event=task_submit module=service status=ok task_id={task_id}");
                self.draft = TaskDraft::default();
                Some(task_id)
            }
            Err(err) => {
                error!("event=task_submit module=service status=error error={err}");
                None
            }
        }
    }

    /// Copies the detail-page link of a listed public task to the clipboard.
    pub fn share(&self, task_id: &str) -> Option<String> {
        let Some(task) = self.tasks.iter().find(|task| task.id == task_id) else {
            warn!("event=task_share module=service status=rejected reason=not_listed task_id={task_id}");
            return None;
        };
        if !task.is_public {
            warn!("event=task_share module=service status=rejected reason=private task_id={task_id}");
            return None;
        }

        let url = share_url(&self.share_base_url, &task.id);
        match self.feedback.write_text(&url) {
            Ok(()) => {
                self.feedback.confirm("Link copied to the clipboard.");
                Some(url)
            }
            Err(err) => {
                warn!("event=task_share module=service status=error error={err}");
                self.feedback.alert("Could not copy the link.");
                None
            }
        }
    }

    /// Deletes one of the viewer's tasks.
    ///
    /// Ownership is re-read from the store before deleting; tasks owned by
    /// someone else are refused. The list changes with the next push.
    pub fn remove(&mut self, task_id: &str) -> bool {
        if self.state == ListState::Unmounted {
            return false;
        }

        match self.store.get_task_by_id(task_id) {
            Ok(Some(task)) if task.is_owned_by(&self.viewer) => {}
            Ok(Some(_)) => {
                warn!("event=task_delete module=service status=rejected reason=not_owner task_id={task_id}");
                return false;
            }
            Ok(None) => return false,
            Err(err) => {
                error!("event=task_delete module=service status=error error={err}");
                return false;
            }
        }

        match self.store.delete_task(task_id) {
            Ok(()) => {
                info!("event=task_delete module=service status=ok task_id={task_id}");
                self.feedback.confirm("Task deleted.");
                true
            }
            Err(err) => {
                error!("event=task_delete module=service status=error error={err}");
                false
            }
        }
    }

    /// Releases the subscription. Safe to call more than once.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            info!("event=task_list_unmount module=service status=ok");
        }
        self.state = ListState::Unmounted;
    }
}
