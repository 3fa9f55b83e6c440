use super::membership::{grant_project, release_team_project};
use super::{normalize_required, require_project, require_team, require_user, MutationEngine};
use crate::audit;
use crate::error::{CoreError, CoreResult, InvariantViolation};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::project::{
    NewProject, Project, ProjectId, ProjectMembership, ProjectPatch, ProjectRole,
};
use crate::model::team::TeamId;
use crate::model::user::UserId;
use crate::uow::UnitOfWork;

/// Lists every new project starts with; the last one is the Done list.
pub const DEFAULT_LISTS: [&str; 3] = ["To Do", "In Progress", "Done"];

impl MutationEngine<'_> {
    /// Creates a project owned and managed by `actor`, seeded with the
    /// default lists.
    pub fn create_project(&self, actor: UserId, project: NewProject) -> CoreResult<Project> {
        let name = normalize_required(&project.name, "project name")?;

        self.in_transaction("project_create", |uow| {
            require_user(uow, actor)?;
            if uow.projects().name_taken(&name, None)? {
                return Err(CoreError::validation("project name is already taken"));
            }
            let created = uow.projects().insert(
                &NewProject {
                    name,
                    status: project.status,
                    due_date: project.due_date,
                },
                actor,
            )?;
            uow.projects()
                .insert_membership(created.uuid, actor, None, ProjectRole::Manager)?;

            let done_index = DEFAULT_LISTS.len() - 1;
            for ((index, list_name), position) in DEFAULT_LISTS.iter().enumerate().zip(1_i64..) {
                uow.lists()
                    .insert(created.uuid, list_name, position, index == done_index)?;
            }

            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ProjectCreated).project(created.uuid),
            )?;
            Ok(created)
        })
    }

    pub fn update_project(
        &self,
        actor: UserId,
        project: ProjectId,
        patch: ProjectPatch,
    ) -> CoreResult<Project> {
        let name = patch
            .name
            .as_deref()
            .map(|value| normalize_required(value, "project name"))
            .transpose()?;

        self.in_transaction("project_update", |uow| {
            let current = require_project(uow, project)?;
            let name = name.unwrap_or(current.name);
            if uow.projects().name_taken(&name, Some(project))? {
                return Err(CoreError::validation("project name is already taken"));
            }
            let status = patch.status.unwrap_or(current.status);
            let due_date = patch.due_date.unwrap_or(current.due_date);
            uow.projects().update(project, &name, status, due_date)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ProjectUpdated).project(project),
            )?;
            require_project(uow, project)
        })
    }

    /// Deletes a project with its lists, tasks, comments and memberships.
    pub fn delete_project(&self, actor: UserId, project: ProjectId) -> CoreResult<Project> {
        self.in_transaction("project_delete", |uow| {
            let current = require_project(uow, project)?;
            uow.projects().delete(project)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ProjectDeleted).project(project),
            )?;
            Ok(current)
        })
    }

    /// Assigns `team` to `project`, granting its members access.
    pub fn assign_team(&self, actor: UserId, project: ProjectId, team: TeamId) -> CoreResult<()> {
        self.in_transaction("project_team_assign", |uow| {
            require_project(uow, project)?;
            require_team(uow, team)?;
            if !uow.projects().assign_team(project, team)? {
                return Err(CoreError::validation("team is already assigned to the project"));
            }
            for member in uow.teams().memberships(team)? {
                grant_project(uow, project, team, member.user_uuid)?;
            }
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ProjectTeamAssigned)
                    .project(project)
                    .team(team),
            )?;
            Ok(())
        })
    }

    /// Removes `team` from `project` and detaches the access it granted.
    pub fn unassign_team(&self, actor: UserId, project: ProjectId, team: TeamId) -> CoreResult<()> {
        self.in_transaction("project_team_unassign", |uow| {
            require_project(uow, project)?;
            if !uow.projects().unassign_team(project, team)? {
                return Err(CoreError::not_found("project team", team));
            }
            release_team_project(uow, project, team)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::ProjectTeamUnassigned)
                    .project(project)
                    .team(team),
            )?;
            Ok(())
        })
    }

    /// Makes `user` the project's only Manager.
    ///
    /// Every other Manager is demoted first, each demotion audited; then
    /// the target is promoted. Promoting when nobody is Manager is a plain
    /// promotion. Re-promoting the sole Manager changes nothing.
    pub fn reassign_project_manager(
        &self,
        actor: UserId,
        project: ProjectId,
        user: UserId,
    ) -> CoreResult<ProjectMembership> {
        self.in_transaction("project_manager_reassign", |uow| {
            require_project(uow, project)?;
            let target = uow
                .projects()
                .membership(project, user)?
                .ok_or(InvariantViolation::ManagerNotMember { project, user })?;

            for previous in uow.projects().manager_ids(project)? {
                if previous == user {
                    continue;
                }
                uow.projects()
                    .set_role(project, previous, ProjectRole::Member)?;
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::ProjectManagerDemoted)
                        .project(project)
                        .subject(previous),
                )?;
            }

            if target.role != ProjectRole::Manager {
                uow.projects().set_role(project, user, ProjectRole::Manager)?;
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::ProjectManagerPromoted)
                        .project(project)
                        .subject(user),
                )?;
            }
            require_project_membership(uow, project, user)
        })
    }
}

fn require_project_membership(
    uow: &UnitOfWork<'_>,
    project: ProjectId,
    user: UserId,
) -> CoreResult<ProjectMembership> {
    uow.projects()
        .membership(project, user)?
        .ok_or_else(|| CoreError::not_found("project membership", user))
}
