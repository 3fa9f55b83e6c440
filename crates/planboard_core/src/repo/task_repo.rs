//! Task and assignee persistence.
//!
//! # Invariants
//! - Sibling listing is deterministic: `position ASC, uuid ASC`.
//! - Loaded tasks always carry their assignee set.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::list::ListId;
use crate::model::project::ProjectId;
use crate::model::task::{NewTask, Task, TaskId, TaskPriority};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    list_uuid,
    title,
    description,
    priority,
    due_date,
    position,
    created_by,
    created_at,
    updated_at
FROM tasks";

/// Where a task sits in the project hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    pub list_uuid: ListId,
    pub project_uuid: ProjectId,
    pub position: i64,
    pub created_by: UserId,
}

pub struct TaskRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TaskRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(
        &self,
        list: ListId,
        task: &NewTask,
        position: i64,
        created_by: UserId,
    ) -> RepoResult<Task> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                list_uuid,
                title,
                description,
                priority,
                due_date,
                position,
                created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                uuid.to_string(),
                list.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_str(),
                task.due_date,
                position,
                created_by.to_string(),
            ],
        )?;
        for assignee in &task.assignees {
            self.add_assignee(uuid, *assignee)?;
        }
        self.require(uuid)
    }

    pub fn get(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut task = parse_task_row(row)?;
        task.assignees = self.assignees(id)?;
        Ok(Some(task))
    }

    pub fn require(&self, id: TaskId) -> RepoResult<Task> {
        self.get(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("task {id} vanished after write")))
    }

    /// Lists a list's tasks in position order.
    pub fn by_list(&self, list: ListId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE list_uuid = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([list.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        for task in &mut items {
            task.assignees = self.assignees(task.uuid)?;
        }
        Ok(items)
    }

    pub fn count(&self, list: ListId) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE list_uuid = ?1;",
            [list.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Resolves a task's list, project and creator in one lookup.
    pub fn locate(&self, id: TaskId) -> RepoResult<Option<TaskLocation>> {
        let found: Option<(String, String, i64, String)> = self
            .conn
            .query_row(
                "SELECT t.list_uuid, l.project_uuid, t.position, t.created_by
                 FROM tasks t
                 INNER JOIN lists l ON l.uuid = t.list_uuid
                 WHERE t.uuid = ?1;",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some((list, project, position, creator)) = found else {
            return Ok(None);
        };
        Ok(Some(TaskLocation {
            list_uuid: parse_uuid(&list, "tasks.list_uuid")?,
            project_uuid: parse_uuid(&project, "lists.project_uuid")?,
            position,
            created_by: parse_uuid(&creator, "tasks.created_by")?,
        }))
    }

    pub fn update_fields(
        &self,
        id: TaskId,
        title: &str,
        description: Option<&str>,
        priority: TaskPriority,
        due_date: Option<i64>,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET title = ?2,
                 description = ?3,
                 priority = ?4,
                 due_date = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), title, description, priority.as_str(), due_date],
        )?;
        Ok(changed > 0)
    }

    pub fn set_position(&self, id: TaskId, position: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET position = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), position],
        )?;
        Ok(changed > 0)
    }

    pub fn set_list_and_position(
        &self,
        id: TaskId,
        list: ListId,
        position: i64,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET list_uuid = ?2,
                 position = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), list.to_string(), position],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    /// Decrements every sibling positioned after `position`.
    pub fn close_gap(&self, list: ListId, position: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET position = position - 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE list_uuid = ?1
               AND position > ?2;",
            params![list.to_string(), position],
        )?;
        Ok(changed)
    }

    /// Increments every sibling positioned at or after `position`, making
    /// room for an inserted task.
    pub fn open_gap(&self, list: ListId, position: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET position = position + 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE list_uuid = ?1
               AND position >= ?2;",
            params![list.to_string(), position],
        )?;
        Ok(changed)
    }

    pub fn assignees(&self, task: TaskId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_uuid
             FROM task_assignees
             WHERE task_uuid = ?1
             ORDER BY user_uuid ASC;",
        )?;
        let mut rows = stmt.query([task.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "task_assignees.user_uuid")?);
        }
        Ok(ids)
    }

    /// Returns `false` when the user was already assigned.
    pub fn add_assignee(&self, task: TaskId, user: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO task_assignees (task_uuid, user_uuid) VALUES (?1, ?2);",
            [task.to_string(), user.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn remove_assignee(&self, task: TaskId, user: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM task_assignees WHERE task_uuid = ?1 AND user_uuid = ?2;",
            [task.to_string(), user.to_string()],
        )?;
        Ok(changed > 0)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid: String = row.get("uuid")?;
    let list: String = row.get("list_uuid")?;
    let creator: String = row.get("created_by")?;
    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task priority `{priority_text}` in tasks.priority"
        ))
    })?;
    Ok(Task {
        uuid: parse_uuid(&uuid, "tasks.uuid")?,
        list_uuid: parse_uuid(&list, "tasks.list_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        due_date: row.get("due_date")?,
        position: row.get("position")?,
        created_by: parse_uuid(&creator, "tasks.created_by")?,
        assignees: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
