use super::ordering::{ensure_covers_siblings, validate_reorder_batch};
use super::{normalize_required, require_list, require_project, MutationEngine};
use crate::audit;
use crate::error::{CoreResult, InvariantViolation};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::list::{ListId, TaskList};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::model::PositionAssignment;

impl MutationEngine<'_> {
    /// Appends a list to `project`. The first list of an empty project
    /// becomes its Done list.
    pub fn create_list(&self, actor: UserId, project: ProjectId, name: &str) -> CoreResult<TaskList> {
        let name = normalize_required(name, "list name")?;

        self.in_transaction("list_create", |uow| {
            require_project(uow, project)?;
            let count = uow.lists().count(project)?;
            let created = uow.lists().insert(project, &name, count + 1, count == 0)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ListCreated)
                    .project(project)
                    .list(created.uuid),
            )?;
            Ok(created)
        })
    }

    pub fn rename_list(&self, actor: UserId, list: ListId, name: &str) -> CoreResult<TaskList> {
        let name = normalize_required(name, "list name")?;

        self.in_transaction("list_rename", |uow| {
            let current = require_list(uow, list)?;
            uow.lists().rename(list, &name)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ListUpdated)
                    .project(current.project_uuid)
                    .list(list),
            )?;
            require_list(uow, list)
        })
    }

    /// Deletes a list and its tasks, closing the position gap.
    ///
    /// The Done list cannot be deleted; reassign Done first.
    pub fn delete_list(&self, actor: UserId, list: ListId) -> CoreResult<TaskList> {
        self.in_transaction("list_delete", |uow| {
            let current = require_list(uow, list)?;
            if current.is_done {
                return Err(InvariantViolation::DoneListDeletion { list }.into());
            }
            uow.lists().delete(list)?;
            uow.lists()
                .close_gap(current.project_uuid, current.position)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ListDeleted)
                    .project(current.project_uuid)
                    .list(list),
            )?;
            Ok(current)
        })
    }

    /// Applies a full `(list, position)` mapping for one project.
    ///
    /// Each list whose position changed gets one `list.moved` entry.
    pub fn reorder_lists(
        &self,
        actor: UserId,
        project: ProjectId,
        batch: &[PositionAssignment],
    ) -> CoreResult<Vec<TaskList>> {
        validate_reorder_batch(batch)?;

        self.in_transaction("list_reorder", |uow| {
            require_project(uow, project)?;
            let siblings = uow.lists().by_project(project)?;
            let sibling_ids: Vec<ListId> = siblings.iter().map(|list| list.uuid).collect();
            ensure_covers_siblings(batch, &sibling_ids)?;

            for assignment in batch {
                let unchanged = siblings
                    .iter()
                    .any(|list| list.uuid == assignment.id && list.position == assignment.position);
                if unchanged {
                    continue;
                }
                uow.lists().set_position(assignment.id, assignment.position)?;
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::ListMoved)
                        .project(project)
                        .list(assignment.id),
                )?;
            }
            Ok(uow.lists().by_project(project)?)
        })
    }

    /// Moves the Done flag to `list` as one two-row swap.
    pub fn reassign_done_list(&self, actor: UserId, list: ListId) -> CoreResult<TaskList> {
        self.in_transaction("list_done_reassign", |uow| {
            let target = require_list(uow, list)?;
            if target.is_done {
                return Ok(target);
            }
            let project = target.project_uuid;

            if let Some(previous) = uow.lists().done_list(project)? {
                uow.lists().set_done(previous.uuid, false)?;
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::ListDoneRevoked)
                        .project(project)
                        .list(previous.uuid),
                )?;
            }
            uow.lists().set_done(list, true)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ListDoneAssigned)
                    .project(project)
                    .list(list),
            )?;
            require_list(uow, list)
        })
    }
}
