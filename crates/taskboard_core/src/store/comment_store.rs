//! SQLite implementation of the `comments` collection.

use crate::model::comment::{Comment, NewComment};
use crate::store::task_store::ensure_table_ready;
use crate::store::{new_record_id, now_epoch_ms, CommentStore, StoreResult};
use log::{debug, info};
use rusqlite::{params, Connection, Row};

/// SQLite-backed comment collection.
pub struct SqliteCommentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_table_ready(conn, "comments")?;
        Ok(Self { conn })
    }
}

impl CommentStore for SqliteCommentStore<'_> {
    fn create_comment(&self, new_comment: &NewComment) -> StoreResult<Comment> {
        new_comment.validate()?;

        let comment = new_comment
            .clone()
            .into_comment(new_record_id(), now_epoch_ms());
        self.conn.execute(
            "INSERT INTO comments (id, task_id, author_email, author_name, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                comment.id.as_str(),
                comment.task_id.as_str(),
                comment.author_email.as_str(),
                comment.author_name.as_str(),
                comment.body.as_str(),
                comment.created_at,
            ],
        )?;
        info!(
            "event=comment_create module=store status=ok comment_id={} task_id={}",
            comment.id, comment.task_id
        );
        Ok(comment)
    }

    fn delete_comment(&self, id: &str) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id])?;
        let status = if changed == 0 { "noop" } else { "ok" };
        debug!("event=comment_delete module=store status={status} comment_id={id}");
        Ok(())
    }

    fn list_comments_by_task(&self, task_id: &str) -> StoreResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, author_email, author_name, body, created_at
             FROM comments
             WHERE task_id = ?1;",
        )?;
        let mut rows = stmt.query([task_id])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }
}

fn parse_comment_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        author_email: row.get("author_email")?,
        author_name: row.get("author_name")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
    })
}
