use super::membership::{grant_team_projects, release_team_grant, release_team_project};
use super::{normalize_optional, normalize_required, require_team, require_user, MutationEngine};
use crate::audit;
use crate::error::{CoreError, CoreResult, InvariantViolation};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::team::{NewTeam, Team, TeamId, TeamMembership, TeamPatch};
use crate::model::user::UserId;
use crate::uow::UnitOfWork;

impl MutationEngine<'_> {
    /// Creates a team led by `actor`.
    pub fn create_team(&self, actor: UserId, team: NewTeam) -> CoreResult<Team> {
        let name = normalize_required(&team.name, "team name")?;
        let description = normalize_optional(team.description);

        self.in_transaction("team_create", |uow| {
            require_user(uow, actor)?;
            let created = uow.teams().insert(&name, description.as_deref())?;
            uow.teams().insert_membership(created.uuid, actor, true)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TeamCreated).team(created.uuid),
            )?;
            Ok(created)
        })
    }

    pub fn update_team(&self, actor: UserId, team: TeamId, patch: TeamPatch) -> CoreResult<Team> {
        let name = patch
            .name
            .as_deref()
            .map(|value| normalize_required(value, "team name"))
            .transpose()?;

        self.in_transaction("team_update", |uow| {
            let current = require_team(uow, team)?;
            let name = name.unwrap_or(current.name);
            let description = match patch.description {
                Some(value) => normalize_optional(value),
                None => current.description,
            };
            uow.teams().update(team, &name, description.as_deref())?;
            audit::record(uow, AuditRecord::new(actor, AuditAction::TeamUpdated).team(team))?;
            require_team(uow, team)
        })
    }

    /// Deletes a team. Project access it granted is detached first.
    pub fn delete_team(&self, actor: UserId, team: TeamId) -> CoreResult<Team> {
        self.in_transaction("team_delete", |uow| {
            let current = require_team(uow, team)?;
            for project in uow.projects().project_ids_of_team(team)? {
                uow.projects().unassign_team(project, team)?;
                release_team_project(uow, project, team)?;
            }
            uow.teams().delete(team)?;
            audit::record(uow, AuditRecord::new(actor, AuditAction::TeamDeleted).team(team))?;
            Ok(current)
        })
    }

    /// Adds `user` as a plain member and grants the team's projects.
    pub fn add_team_member(
        &self,
        actor: UserId,
        team: TeamId,
        user: UserId,
    ) -> CoreResult<TeamMembership> {
        self.in_transaction("team_member_add", |uow| {
            require_team(uow, team)?;
            require_user(uow, user)?;
            if uow.teams().membership(team, user)?.is_some() {
                return Err(CoreError::validation("user is already a member of the team"));
            }
            uow.teams().insert_membership(team, user, false)?;
            grant_team_projects(uow, team, user)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TeamMemberAdded)
                    .team(team)
                    .subject(user),
            )?;
            require_team_membership(uow, team, user)
        })
    }

    /// Removes a non-leader member and detaches project access the team
    /// granted them.
    pub fn remove_team_member(
        &self,
        actor: UserId,
        team: TeamId,
        user: UserId,
    ) -> CoreResult<TeamMembership> {
        self.in_transaction("team_member_remove", |uow| {
            let membership = require_team_membership(uow, team, user)?;
            if membership.is_leader {
                return Err(InvariantViolation::LeaderRemoval { team, user }.into());
            }
            uow.teams().delete_membership(team, user)?;
            for project in uow.projects().project_ids_of_team(team)? {
                if let Some(row) = uow.projects().membership(project, user)? {
                    release_team_grant(uow, &row, team)?;
                }
            }
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TeamMemberRemoved)
                    .team(team)
                    .subject(user),
            )?;
            Ok(membership)
        })
    }

    /// Hands leadership to `user` as one two-row swap.
    pub fn reassign_team_leader(
        &self,
        actor: UserId,
        team: TeamId,
        user: UserId,
    ) -> CoreResult<TeamMembership> {
        self.in_transaction("team_leader_reassign", |uow| {
            require_team(uow, team)?;
            let target = uow
                .teams()
                .membership(team, user)?
                .ok_or(InvariantViolation::LeaderNotMember { team, user })?;
            if target.is_leader {
                return Ok(target);
            }

            if let Some(previous) = uow.teams().leader(team)? {
                uow.teams().set_leader_flag(team, previous, false)?;
                audit::record(
                    uow,
                    AuditRecord::new(actor, AuditAction::TeamLeaderRevoked)
                        .team(team)
                        .subject(previous),
                )?;
            }
            uow.teams().set_leader_flag(team, user, true)?;
            audit::record(
                uow,
                AuditRecord::new(actor, AuditAction::TeamLeaderAssigned)
                    .team(team)
                    .subject(user),
            )?;
            require_team_membership(uow, team, user)
        })
    }
}

fn require_team_membership(
    uow: &UnitOfWork<'_>,
    team: TeamId,
    user: UserId,
) -> CoreResult<TeamMembership> {
    uow.teams()
        .membership(team, user)?
        .ok_or_else(|| CoreError::not_found("team membership", user))
}
