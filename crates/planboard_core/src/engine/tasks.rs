use super::ordering::{
    ensure_covers_siblings, insert_position, place_at, validate_reorder_batch,
};
use super::{normalize_optional, normalize_required, require_list, require_task, MutationEngine};
use crate::audit;
use crate::error::{CoreError, CoreResult};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::list::ListId;
use crate::model::project::ProjectId;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::model::user::UserId;
use crate::model::PositionAssignment;
use crate::uow::UnitOfWork;
use std::collections::BTreeSet;

impl MutationEngine<'_> {
    /// Appends a task to `list`, created by `actor`.
    pub fn create_task(&self, actor: UserId, list: ListId, task: NewTask) -> CoreResult<Task> {
        let title = normalize_required(&task.title, "task title")?;
        let assignees: BTreeSet<UserId> = task.assignees.iter().copied().collect();

        self.in_transaction("task_create", |uow| {
            let parent = require_list(uow, list)?;
            for assignee in &assignees {
                ensure_project_member(uow, parent.project_uuid, *assignee)?;
            }
            let position = uow.tasks().count(list)? + 1;
            let created = uow.tasks().insert(
                list,
                &NewTask {
                    title,
                    description: normalize_optional(task.description),
                    priority: task.priority,
                    due_date: task.due_date,
                    assignees: assignees.into_iter().collect(),
                },
                position,
                actor,
            )?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TaskCreated)
                    .project(parent.project_uuid)
                    .list(list)
                    .task(created.uuid),
            )?;
            Ok(created)
        })
    }

    pub fn update_task(&self, actor: UserId, task: TaskId, patch: TaskPatch) -> CoreResult<Task> {
        let title = patch
            .title
            .as_deref()
            .map(|value| normalize_required(value, "task title"))
            .transpose()?;

        self.in_transaction("task_update", |uow| {
            let (current, location) = require_task(uow, task)?;
            let title = title.unwrap_or(current.title);
            let description = match patch.description {
                Some(value) => normalize_optional(value),
                None => current.description,
            };
            uow.tasks().update_fields(
                task,
                &title,
                description.as_deref(),
                patch.priority.unwrap_or(current.priority),
                patch.due_date.unwrap_or(current.due_date),
            )?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TaskUpdated)
                    .project(location.project_uuid)
                    .list(location.list_uuid)
                    .task(task),
            )?;
            Ok(uow.tasks().require(task)?)
        })
    }

    /// Deletes a task and closes the gap it leaves in its list.
    pub fn delete_task(&self, actor: UserId, task: TaskId) -> CoreResult<Task> {
        self.in_transaction("task_delete", |uow| {
            let (current, location) = require_task(uow, task)?;
            uow.tasks().delete(task)?;
            uow.tasks().close_gap(location.list_uuid, location.position)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TaskDeleted)
                    .project(location.project_uuid)
                    .list(location.list_uuid)
                    .task(task),
            )?;
            Ok(current)
        })
    }

    /// Applies a full `(task, position)` mapping for one list.
    ///
    /// Each task whose position changed gets one `task.moved` entry.
    pub fn reorder_tasks(
        &self,
        actor: UserId,
        list: ListId,
        batch: &[PositionAssignment],
    ) -> CoreResult<Vec<Task>> {
        validate_reorder_batch(batch)?;

        self.in_transaction("task_reorder", |uow| {
            let parent = require_list(uow, list)?;
            let siblings = uow.tasks().by_list(list)?;
            let sibling_ids: Vec<TaskId> = siblings.iter().map(|task| task.uuid).collect();
            ensure_covers_siblings(batch, &sibling_ids)?;

            for assignment in batch {
                let unchanged = siblings
                    .iter()
                    .any(|task| task.uuid == assignment.id && task.position == assignment.position);
                if unchanged {
                    continue;
                }
                uow.tasks().set_position(assignment.id, assignment.position)?;
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::TaskMoved)
                        .project(parent.project_uuid)
                        .list(list)
                        .task(assignment.id),
                )?;
            }
            Ok(uow.tasks().by_list(list)?)
        })
    }

    /// Moves a task to 1-based `position` of `target` (appending when
    /// `None`), renumbering both lists in one transaction.
    ///
    /// The target list must belong to the task's project.
    pub fn move_task(
        &self,
        actor: UserId,
        task: TaskId,
        target: ListId,
        position: Option<i64>,
    ) -> CoreResult<Task> {
        self.in_transaction("task_move", |uow| {
            let (_, location) = require_task(uow, task)?;
            let destination = require_list(uow, target)?;
            if destination.project_uuid != location.project_uuid {
                return Err(CoreError::validation(
                    "tasks can only move between lists of the same project",
                ));
            }

            let others: Vec<TaskId> = uow
                .tasks()
                .by_list(target)?
                .into_iter()
                .map(|sibling| sibling.uuid)
                .filter(|id| *id != task)
                .collect();
            let new_position = insert_position(position, others.len())?;

            if location.list_uuid == target {
                if new_position == location.position {
                    return Ok(uow.tasks().require(task)?);
                }
                let ordered = place_at(&others, task, new_position);
                for (id, position) in ordered.iter().zip(1_i64..) {
                    uow.tasks().set_position(*id, position)?;
                }
            } else {
                uow.tasks().close_gap(location.list_uuid, location.position)?;
                uow.tasks().open_gap(target, new_position)?;
                uow.tasks()
                    .set_list_and_position(task, target, new_position)?;
            }

            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TaskMoved)
                    .project(location.project_uuid)
                    .list(target)
                    .task(task),
            )?;
            Ok(uow.tasks().require(task)?)
        })
    }

    /// Adds `user` to the task's assignees. Assigning twice is a no-op.
    pub fn assign_task(&self, actor: UserId, task: TaskId, user: UserId) -> CoreResult<Task> {
        self.in_transaction("task_assign", |uow| {
            let (_, location) = require_task(uow, task)?;
            ensure_project_member(uow, location.project_uuid, user)?;
            if uow.tasks().add_assignee(task, user)? {
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::TaskAssigned)
                        .project(location.project_uuid)
                        .list(location.list_uuid)
                        .task(task)
                        .subject(user),
                )?;
            }
            Ok(uow.tasks().require(task)?)
        })
    }

    /// Removes `user` from the task's assignees. Removing a non-assignee is
    /// a no-op.
    pub fn unassign_task(&self, actor: UserId, task: TaskId, user: UserId) -> CoreResult<Task> {
        self.in_transaction("task_unassign", |uow| {
            let (_, location) = require_task(uow, task)?;
            if uow.tasks().remove_assignee(task, user)? {
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::TaskUnassigned)
                        .project(location.project_uuid)
                        .list(location.list_uuid)
                        .task(task)
                        .subject(user),
                )?;
            }
            Ok(uow.tasks().require(task)?)
        })
    }
}

fn ensure_project_member(uow: &UnitOfWork<'_>, project: ProjectId, user: UserId) -> CoreResult<()> {
    if uow.projects().membership(project, user)?.is_none() {
        return Err(CoreError::validation(format!(
            "assignee {user} is not a member of the project"
        )));
    }
    Ok(())
}
