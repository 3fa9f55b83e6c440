use super::{normalize_required, require_project, require_task, MutationEngine};
use crate::audit;
use crate::error::{CoreError, CoreResult};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::label::{Label, LabelId, LabelPatch};
use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId};
use crate::model::user::UserId;
use crate::uow::UnitOfWork;

/// Color used when a label is created without one.
pub const DEFAULT_LABEL_COLOR: &str = "#9e9e9e";

impl MutationEngine<'_> {
    pub fn create_label(
        &self,
        actor: UserId,
        project: ProjectId,
        name: &str,
        color: Option<&str>,
    ) -> CoreResult<Label> {
        let name = normalize_required(name, "label name")?;
        let color = normalize_color(color.unwrap_or(DEFAULT_LABEL_COLOR))?;

        self.in_transaction("label_create", |uow| {
            require_project(uow, project)?;
            if uow.labels().name_taken(project, &name, None)? {
                return Err(CoreError::validation("label name is already used in the project"));
            }
            let created = uow.labels().insert(project, &name, &color)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::LabelCreated).project(project),
            )?;
            Ok(created)
        })
    }

    pub fn update_label(&self, actor: UserId, label: LabelId, patch: LabelPatch) -> CoreResult<Label> {
        let name = patch
            .name
            .as_deref()
            .map(|value| normalize_required(value, "label name"))
            .transpose()?;
        let color = patch.color.as_deref().map(normalize_color).transpose()?;

        self.in_transaction("label_update", |uow| {
            let current = require_label(uow, label)?;
            let name = name.unwrap_or(current.name);
            if uow
                .labels()
                .name_taken(current.project_uuid, &name, Some(label))?
            {
                return Err(CoreError::validation("label name is already used in the project"));
            }
            let color = color.unwrap_or(current.color);
            uow.labels().update(label, &name, &color)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::LabelUpdated).project(current.project_uuid),
            )?;
            require_label(uow, label)
        })
    }

    /// Deletes a label and detaches it from every task.
    pub fn delete_label(&self, actor: UserId, label: LabelId) -> CoreResult<Label> {
        self.in_transaction("label_delete", |uow| {
            let current = require_label(uow, label)?;
            uow.labels().delete(label)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::LabelDeleted).project(current.project_uuid),
            )?;
            Ok(current)
        })
    }

    /// Tags a task with a label of the same project. Tagging twice is a
    /// no-op.
    pub fn attach_label(&self, actor: UserId, task: TaskId, label: LabelId) -> CoreResult<Task> {
        self.in_transaction("label_attach", |uow| {
            let (current, location) = require_task(uow, task)?;
            let tag = require_label(uow, label)?;
            if tag.project_uuid != location.project_uuid {
                return Err(CoreError::validation(
                    "label belongs to a different project than the task",
                ));
            }
            if uow.labels().attach(task, label)? {
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::LabelAttached)
                        .project(location.project_uuid)
                        .list(location.list_uuid)
                        .task(task),
                )?;
            }
            Ok(current)
        })
    }

    pub fn detach_label(&self, actor: UserId, task: TaskId, label: LabelId) -> CoreResult<Task> {
        self.in_transaction("label_detach", |uow| {
            let (current, location) = require_task(uow, task)?;
            if uow.labels().detach(task, label)? {
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::LabelDetached)
                        .project(location.project_uuid)
                        .list(location.list_uuid)
                        .task(task),
                )?;
            }
            Ok(current)
        })
    }
}

fn require_label(uow: &UnitOfWork<'_>, id: LabelId) -> CoreResult<Label> {
    uow.labels()
        .get(id)?
        .ok_or_else(|| CoreError::not_found("label", id))
}

/// Accepts `#rgb` or `#rrggbb`, returned lowercased.
fn normalize_color(value: &str) -> CoreResult<String> {
    let color = value.trim().to_ascii_lowercase();
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(CoreError::validation("label color must be #rgb or #rrggbb"));
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::normalize_color;

    #[test]
    fn accepts_short_and_long_hex() {
        assert_eq!(normalize_color("#FFF").expect("short"), "#fff");
        assert_eq!(normalize_color(" #00aa11 ").expect("long"), "#00aa11");
    }

    #[test]
    fn rejects_other_shapes() {
        for value in ["fff", "#ffff", "#gggggg", ""] {
            assert!(normalize_color(value).is_err(), "{value} must be rejected");
        }
    }
}
