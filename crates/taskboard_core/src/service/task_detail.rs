//! Task detail page: visibility-gated load and the comment view-model.
//!
//! # Responsibility
//! - Redirect away from missing or private tasks before any content exists.
//! - Load comments once and keep them in insertion order.
//! - Apply comment writes optimistically to the local list.
//!
//! # Invariants
//! - Missing and private tasks produce the same redirect.
//! - Comments shorter than [`MIN_COMMENT_CHARS`] never reach the store.
//! - Only the author of a comment can delete it from this view.

use crate::model::comment::{
    is_valid_comment_body, Comment, CommentId, NewComment, MIN_COMMENT_CHARS,
};
use crate::model::session::Session;
use crate::model::task::{Task, TaskId};
use crate::service::feedback::Notifier;
use crate::session::{PageLoad, PageRequest, SessionProvider};
use crate::store::{CommentStore, TaskStore};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;

const CREATED_DATE_FORMAT: &str = "%d/%m/%Y";

/// Render model of the task shown on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    #[serde(rename = "task")]
    pub body: String,
    #[serde(rename = "public")]
    pub is_public: bool,
    /// Creation date as `dd/mm/YYYY`.
    pub created: String,
    #[serde(rename = "user")]
    pub owner: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            body: task.body.clone(),
            is_public: task.is_public,
            created: format_created_date(task.created_at),
            owner: task.owner.clone(),
        }
    }
}

/// Props handed to the task detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPageProps {
    pub task: TaskView,
    pub comments: Vec<Comment>,
    /// `None` for anonymous visitors.
    pub viewer: Option<Session>,
}

/// Detail page-load hook.
///
/// Anonymous callers may view public tasks. A failed task read redirects
/// like a missing task; a failed comment read renders without comments.
pub fn load_task_page<P, T, C>(
    provider: &P,
    tasks: &T,
    comments: &C,
    request: &PageRequest,
    task_id: &str,
) -> PageLoad<TaskPageProps>
where
    P: SessionProvider,
    T: TaskStore,
    C: CommentStore,
{
    let task = match tasks.get_task_by_id(task_id) {
        Ok(Some(task)) if task.is_public => task,
        Ok(_) => {
            debug!("event=task_page_load module=service status=redirect task_id={task_id}");
            return PageLoad::redirect_to_landing();
        }
        Err(err) => {
            error!("event=task_page_load module=service status=error error={err}");
            return PageLoad::redirect_to_landing();
        }
    };

    let comments = comments
        .list_comments_by_task(&task.id)
        .unwrap_or_else(|err| {
            error!("event=comment_list module=service status=error task_id={task_id} error={err}");
            Vec::new()
        });

    PageLoad::Render(TaskPageProps {
        task: TaskView::from(&task),
        comments,
        viewer: provider.resolve(request),
    })
}

/// Formats epoch milliseconds as `dd/mm/YYYY` (UTC). Out-of-range input
/// yields an empty string.
pub fn format_created_date(created_at: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(created_at)
        .map(|created| created.format(CREATED_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// View-model behind the task detail page.
pub struct TaskDetailViewModel<C, F> {
    store: C,
    feedback: F,
    task: TaskView,
    viewer: Option<Session>,
    comments: Vec<Comment>,
    comment_input: String,
}

impl<C: CommentStore, F: Notifier> TaskDetailViewModel<C, F> {
    pub fn new(store: C, feedback: F, props: TaskPageProps) -> Self {
        Self {
            store,
            feedback,
            task: props.task,
            viewer: props.viewer,
            comments: props.comments,
            comment_input: String::new(),
        }
    }

    pub fn task(&self) -> &TaskView {
        &self.task
    }

    pub fn viewer(&self) -> Option<&Session> {
        self.viewer.as_ref()
    }

    /// Local comments in insertion order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comment_input(&self) -> &str {
        &self.comment_input
    }

    pub fn set_comment_input(&mut self, input: impl Into<String>) {
        self.comment_input = input.into();
    }

    /// Whether the delete action is offered for `comment`.
    pub fn can_delete(&self, comment: &Comment) -> bool {
        self.viewer
            .as_ref()
            .is_some_and(|viewer| comment.is_authored_by(&viewer.email))
    }

    /// Posts the current input as a comment by the viewer.
    ///
    /// Anonymous viewers and inputs under the minimum length are alerted and
    /// rejected without a store call. Once the store is called the input is
    /// cleared whatever the outcome; on success the stored record is
    /// appended locally without re-fetching.
    pub fn post_comment(&mut self) -> Option<CommentId> {
        let Some(viewer) = self.viewer.as_ref() else {
            self.feedback.alert("Sign in to comment.");
            return None;
        };

        let body = self.comment_input.trim();
        if !is_valid_comment_body(body) {
            self.feedback.alert(&format!(
                "A comment needs at least {MIN_COMMENT_CHARS} characters."
            ));
            return None;
        }

        let new_comment = NewComment {
            task_id: self.task.task_id.clone(),
            author_email: viewer.email.clone(),
            author_name: viewer.name.clone(),
            body: body.to_string(),
        };
        self.comment_input.clear();

        match self.store.create_comment(&new_comment) {
            Ok(comment) => {
                info!(
                    "event=comment_post module=service status=ok comment_id={} task_id={}",
                    comment.id, self.task.task_id
                );
                let comment_id = comment.id.clone();
                self.comments.push(comment);
                Some(comment_id)
            }
            Err(err) => {
                error!("event=comment_post module=service status=error error={err}");
                self.feedback.alert("Could not post the comment.");
                None
            }
        }
    }

    /// Deletes one of the viewer's comments and drops it from the local list.
    ///
    /// Unknown ids are a no-op, so repeating a delete is harmless.
    pub fn delete_comment(&mut self, comment_id: &str) -> bool {
        let Some(comment) = self.comments.iter().find(|comment| comment.id == comment_id) else {
            debug!("event=comment_delete module=service status=noop comment_id={comment_id}");
            return false;
        };
        if !self.can_delete(comment) {
            warn!("event=comment_delete module=service status=rejected reason=not_author comment_id={comment_id}");
            return false;
        }

        match self.store.delete_comment(comment_id) {
            Ok(()) => {
                self.comments.retain(|comment| comment.id != comment_id);
                info!("event=comment_delete module=service status=ok comment_id={comment_id}");
                true
            }
            Err(err) => {
                error!("event=comment_delete module=service status=error error={err}");
                self.feedback.alert("Could not delete the comment.");
                false
            }
        }
    }
}
