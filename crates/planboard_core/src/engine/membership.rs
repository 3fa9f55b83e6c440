//! Project access granted through teams.

use crate::error::CoreResult;
use crate::model::project::{ProjectId, ProjectMembership, ProjectRole};
use crate::model::team::TeamId;
use crate::model::user::UserId;
use crate::uow::UnitOfWork;

/// Gives `user` a Member row in every project `team` is assigned to,
/// leaving existing rows untouched.
pub(super) fn grant_team_projects(
    uow: &UnitOfWork<'_>,
    team: TeamId,
    user: UserId,
) -> CoreResult<()> {
    for project in uow.projects().project_ids_of_team(team)? {
        grant_project(uow, project, team, user)?;
    }
    Ok(())
}

pub(super) fn grant_project(
    uow: &UnitOfWork<'_>,
    project: ProjectId,
    team: TeamId,
    user: UserId,
) -> CoreResult<()> {
    let projects = uow.projects();
    if projects.membership(project, user)?.is_none() {
        projects.insert_membership(project, user, Some(team), ProjectRole::Member)?;
    }
    Ok(())
}

/// Applies the detach rule to one row after `team` stopped granting it.
///
/// The row moves to another assigned team the user still belongs to. With
/// no such team a Manager keeps a direct row; anyone else loses access.
pub(super) fn release_team_grant(
    uow: &UnitOfWork<'_>,
    membership: &ProjectMembership,
    team: TeamId,
) -> CoreResult<()> {
    if membership.team_uuid != Some(team) {
        return Ok(());
    }
    let projects = uow.projects();
    let project = membership.project_uuid;
    let user = membership.user_uuid;

    if let Some(other) = projects.alternate_team_for(project, user, team)? {
        projects.set_membership_team(project, user, Some(other))?;
    } else if membership.role == ProjectRole::Manager {
        projects.set_membership_team(project, user, None)?;
    } else {
        projects.delete_membership(project, user)?;
    }
    Ok(())
}

/// Releases every row `team` granted in `project`.
pub(super) fn release_team_project(
    uow: &UnitOfWork<'_>,
    project: ProjectId,
    team: TeamId,
) -> CoreResult<()> {
    for membership in uow.projects().memberships_via_team(project, team)? {
        release_team_grant(uow, &membership, team)?;
    }
    Ok(())
}
