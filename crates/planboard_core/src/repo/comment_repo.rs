//! Comment persistence.

use super::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT
    uuid,
    task_uuid,
    author_uuid,
    parent_uuid,
    content,
    created_at,
    updated_at
FROM comments";

pub struct CommentRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CommentRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(
        &self,
        task: TaskId,
        author: UserId,
        parent: Option<CommentId>,
        content: &str,
    ) -> RepoResult<Comment> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO comments (uuid, task_uuid, author_uuid, parent_uuid, content)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                uuid.to_string(),
                task.to_string(),
                author.to_string(),
                parent.map(|id| id.to_string()),
                content,
            ],
        )?;
        self.get(uuid)?
            .ok_or_else(|| RepoError::InvalidData(format!("comment {uuid} vanished after write")))
    }

    pub fn get(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_comment_row(row)?)),
            None => Ok(None),
        }
    }

    /// Lists a task's comments oldest first.
    pub fn by_task(&self, task: TaskId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE task_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([task.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_comment_row(row)?);
        }
        Ok(items)
    }

    pub fn update_content(&self, id: CommentId, content: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE comments
             SET content = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), content],
        )?;
        Ok(changed > 0)
    }

    /// Deletes a comment; replies go with it through the parent cascade.
    pub fn delete(&self, id: CommentId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let uuid: String = row.get("uuid")?;
    let task: String = row.get("task_uuid")?;
    let author: String = row.get("author_uuid")?;
    Ok(Comment {
        uuid: parse_uuid(&uuid, "comments.uuid")?,
        task_uuid: parse_uuid(&task, "comments.task_uuid")?,
        author_uuid: parse_uuid(&author, "comments.author_uuid")?,
        parent_uuid: parse_optional_uuid(row.get("parent_uuid")?, "comments.parent_uuid")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
