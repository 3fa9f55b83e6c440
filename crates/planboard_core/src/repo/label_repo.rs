//! Label and task-label link persistence.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::label::{Label, LabelId};
use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const LABEL_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    name,
    color,
    created_at
FROM labels";

pub struct LabelRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> LabelRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, project: ProjectId, name: &str, color: &str) -> RepoResult<Label> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO labels (uuid, project_uuid, name, color) VALUES (?1, ?2, ?3, ?4);",
            params![uuid.to_string(), project.to_string(), name, color],
        )?;
        self.get(uuid)?
            .ok_or_else(|| RepoError::InvalidData(format!("label {uuid} vanished after write")))
    }

    pub fn get(&self, id: LabelId) -> RepoResult<Option<Label>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LABEL_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_label_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn by_project(&self, project: ProjectId) -> RepoResult<Vec<Label>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LABEL_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY name ASC;"
        ))?;
        let mut rows = stmt.query([project.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_label_row(row)?);
        }
        Ok(items)
    }

    /// Returns whether another label of the project already uses `name`.
    pub fn name_taken(
        &self,
        project: ProjectId,
        name: &str,
        excluding: Option<LabelId>,
    ) -> RepoResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid FROM labels WHERE project_uuid = ?1 AND name = ?2;",
                params![project.to_string(), name],
                |row| row.get(0),
            )
            .optional()?;
        let excluding = excluding.map(|id| id.to_string());
        Ok(matches!(found, Some(uuid) if Some(&uuid) != excluding.as_ref()))
    }

    pub fn update(&self, id: LabelId, name: &str, color: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE labels SET name = ?2, color = ?3 WHERE uuid = ?1;",
            params![id.to_string(), name, color],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, id: LabelId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM labels WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    /// Returns `false` when the label was already attached.
    pub fn attach(&self, task: TaskId, label: LabelId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO task_labels (task_uuid, label_uuid) VALUES (?1, ?2);",
            [task.to_string(), label.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn detach(&self, task: TaskId, label: LabelId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM task_labels WHERE task_uuid = ?1 AND label_uuid = ?2;",
            [task.to_string(), label.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn label_ids_of_task(&self, task: TaskId) -> RepoResult<Vec<LabelId>> {
        let mut stmt = self.conn.prepare(
            "SELECT label_uuid
             FROM task_labels
             WHERE task_uuid = ?1
             ORDER BY label_uuid ASC;",
        )?;
        let mut rows = stmt.query([task.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "task_labels.label_uuid")?);
        }
        Ok(ids)
    }
}

fn parse_label_row(row: &Row<'_>) -> RepoResult<Label> {
    let uuid: String = row.get("uuid")?;
    let project: String = row.get("project_uuid")?;
    Ok(Label {
        uuid: parse_uuid(&uuid, "labels.uuid")?,
        project_uuid: parse_uuid(&project, "labels.project_uuid")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    })
}
