//! SQLite implementation of the `task` collection.
//!
//! # Responsibility
//! - Keep SQL for the `tasks` table inside the store boundary.
//! - Re-run the owner query after every write and push the full snapshot
//!   to that owner's subscribers.
//!
//! # Invariants
//! - Reads reject malformed rows instead of masking them.
//! - A snapshot refresh failure after a committed write is logged, not
//!   reported as a write failure.

use crate::model::task::{NewTask, Task, TaskId};
use crate::store::feed::{ChangeFeed, TaskSubscription};
use crate::store::{
    new_record_id, now_epoch_ms, sort_newest_first, StoreError, StoreResult, TaskStore,
};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT seq, id, owner, body, is_public, created_at FROM tasks";

/// SQLite-backed task collection.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
    feed: ChangeFeed,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Builds a store over a migrated connection.
    ///
    /// `feed` is shared by every store handle that should observe the same
    /// subscriptions.
    pub fn try_new(conn: &'conn Connection, feed: ChangeFeed) -> StoreResult<Self> {
        ensure_table_ready(conn, "tasks")?;
        Ok(Self { conn, feed })
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn list_by_owner(&self, owner: &str) -> StoreResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE owner = ?1;"))?;
        let mut rows = stmt.query([owner])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        sort_newest_first(&mut tasks);
        Ok(tasks.into_iter().map(|(_, task)| task).collect())
    }

    fn refresh_subscribers(&self, owner: &str) {
        if !self.feed.has_subscribers(owner) {
            return;
        }
        match self.list_by_owner(owner) {
            Ok(snapshot) => {
                self.feed.publish(owner, snapshot);
            }
            Err(err) => error!(
                "event=subscription_push module=store status=error error_code=snapshot_query_failed error={err}"
            ),
        }
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn create_task(&self, new_task: &NewTask) -> StoreResult<TaskId> {
        new_task.validate()?;

        let id = new_record_id();
        self.conn.execute(
            "INSERT INTO tasks (id, owner, body, is_public, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.as_str(),
                new_task.owner.as_str(),
                new_task.body.as_str(),
                bool_to_int(new_task.is_public),
                now_epoch_ms(),
            ],
        )?;
        info!("event=task_create module=store status=ok task_id={id}");

        self.refresh_subscribers(&new_task.owner);
        Ok(id)
    }

    fn delete_task(&self, id: &str) -> StoreResult<()> {
        let owner: Option<String> = self
            .conn
            .query_row("SELECT owner FROM tasks WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(owner) = owner else {
            debug!("event=task_delete module=store status=noop task_id={id}");
            return Ok(());
        };

        self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        info!("event=task_delete module=store status=ok task_id={id}");

        self.refresh_subscribers(&owner);
        Ok(())
    }

    fn get_task_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let (_, task) = parse_task_row(row)?;
            return Ok(Some(task));
        }
        Ok(None)
    }

    fn subscribe_tasks_by_owner(&self, owner: &str) -> StoreResult<TaskSubscription> {
        let initial = self.list_by_owner(owner)?;
        Ok(self.feed.subscribe(owner, initial))
    }
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<(i64, Task)> {
    let id: String = row.get("id")?;
    let is_public = match row.get::<_, i64>("is_public")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_public value `{other}` for task `{id}`"
            )));
        }
    };

    let task = Task {
        id,
        owner: row.get("owner")?,
        body: row.get("body")?,
        is_public,
        created_at: row.get("created_at")?,
    };
    Ok((row.get("seq")?, task))
}

/// Fails fast when `table` is missing, i.e. the connection was not migrated.
pub(crate) fn ensure_table_ready(conn: &Connection, table: &str) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(StoreError::InvalidData(format!(
            "table `{table}` is missing; open the connection through db::open_db"
        )))
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
