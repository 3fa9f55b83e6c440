//! List persistence and position bookkeeping.
//!
//! # Invariants
//! - Sibling listing is deterministic: `position ASC, uuid ASC`.

use super::{flag, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::model::list::{ListId, TaskList};
use crate::model::project::ProjectId;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const LIST_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    name,
    position,
    is_done,
    created_at,
    updated_at
FROM lists";

pub struct ListRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ListRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(
        &self,
        project: ProjectId,
        name: &str,
        position: i64,
        is_done: bool,
    ) -> RepoResult<TaskList> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO lists (uuid, project_uuid, name, position, is_done)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                uuid.to_string(),
                project.to_string(),
                name,
                position,
                flag(is_done),
            ],
        )?;
        self.get(uuid)?
            .ok_or_else(|| RepoError::InvalidData(format!("list {uuid} vanished after write")))
    }

    pub fn get(&self, id: ListId) -> RepoResult<Option<TaskList>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LIST_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_list_row(row)?)),
            None => Ok(None),
        }
    }

    /// Lists a project's lists in position order.
    pub fn by_project(&self, project: ProjectId) -> RepoResult<Vec<TaskList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([project.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_list_row(row)?);
        }
        Ok(items)
    }

    pub fn count(&self, project: ProjectId) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM lists WHERE project_uuid = ?1;",
            [project.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn done_list(&self, project: ProjectId) -> RepoResult<Option<TaskList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL} WHERE project_uuid = ?1 AND is_done = 1;"
        ))?;
        let mut rows = stmt.query([project.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_list_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn rename(&self, id: ListId, name: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE lists
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        Ok(changed > 0)
    }

    pub fn set_position(&self, id: ListId, position: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE lists
             SET position = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), position],
        )?;
        Ok(changed > 0)
    }

    pub fn set_done(&self, id: ListId, is_done: bool) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE lists
             SET is_done = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), flag(is_done)],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, id: ListId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM lists WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    /// Decrements every sibling positioned after `position`, closing the gap
    /// left by a removed list.
    pub fn close_gap(&self, project: ProjectId, position: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE lists
             SET position = position - 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE project_uuid = ?1
               AND position > ?2;",
            params![project.to_string(), position],
        )?;
        Ok(changed)
    }
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<TaskList> {
    let uuid: String = row.get("uuid")?;
    let project: String = row.get("project_uuid")?;
    Ok(TaskList {
        uuid: parse_uuid(&uuid, "lists.uuid")?,
        project_uuid: parse_uuid(&project, "lists.project_uuid")?,
        name: row.get("name")?,
        position: row.get("position")?,
        is_done: parse_flag(row.get("is_done")?, "lists.is_done")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
