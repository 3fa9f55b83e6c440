use super::{normalize_required, require_task, MutationEngine};
use crate::audit;
use crate::error::{CoreError, CoreResult, InvariantViolation};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::repo::task_repo::TaskLocation;
use crate::uow::UnitOfWork;

impl MutationEngine<'_> {
    /// Adds a comment by `actor`, optionally replying to `parent` on the
    /// same task.
    pub fn create_comment(
        &self,
        actor: UserId,
        task: TaskId,
        parent: Option<CommentId>,
        content: &str,
    ) -> CoreResult<Comment> {
        let content = normalize_required(content, "comment content")?;

        self.in_transaction("comment_create", |uow| {
            let (_, location) = require_task(uow, task)?;
            if let Some(parent) = parent {
                let parent_comment = require_comment(uow, parent)?;
                if parent_comment.task_uuid != task {
                    return Err(InvariantViolation::CommentParentMismatch { parent }.into());
                }
            }
            let created = uow.comments().insert(task, actor, parent, &content)?;
            audit::record(uow, comment_record(actor, AuditAction::CommentCreated, task, &location))?;
            Ok(created)
        })
    }

    pub fn update_comment(
        &self,
        actor: UserId,
        comment: CommentId,
        content: &str,
    ) -> CoreResult<Comment> {
        let content = normalize_required(content, "comment content")?;

        self.in_transaction("comment_update", |uow| {
            let current = require_comment(uow, comment)?;
            let (_, location) = require_task(uow, current.task_uuid)?;
            uow.comments().update_content(comment, &content)?;
            audit::record(
                uow,
                comment_record(actor, AuditAction::CommentUpdated, current.task_uuid, &location),
            )?;
            require_comment(uow, comment)
        })
    }

    /// Deletes a comment together with its replies.
    pub fn delete_comment(&self, actor: UserId, comment: CommentId) -> CoreResult<Comment> {
        self.in_transaction("comment_delete", |uow| {
            let current = require_comment(uow, comment)?;
            let (_, location) = require_task(uow, current.task_uuid)?;
            uow.comments().delete(comment)?;
            audit::record(
                uow,
                comment_record(actor, AuditAction::CommentDeleted, current.task_uuid, &location),
            )?;
            Ok(current)
        })
    }
}

fn require_comment(uow: &UnitOfWork<'_>, id: CommentId) -> CoreResult<Comment> {
    uow.comments()
        .get(id)?
        .ok_or_else(|| CoreError::not_found("comment", id))
}

fn comment_record(
    actor: UserId,
    action: AuditAction,
    task: TaskId,
    location: &TaskLocation,
) -> AuditRecord {
    AuditRecord::new(actor, action)
        .project(location.project_uuid)
        .list(location.list_uuid)
        .task(task)
}
