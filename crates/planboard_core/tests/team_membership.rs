mod common;

use common::{actions_since, audit_count, last_seq, project, service, setup, user};
use planboard_core::model::audit::AuditAction;
use planboard_core::model::project::{ProjectMembership, ProjectRole};
use planboard_core::model::team::{NewTeam, TeamId, TeamPatch};
use planboard_core::model::user::UserId;
use planboard_core::repo::{ProjectRepo, TeamRepo};
use planboard_core::{BoardService, CoreError, InvariantViolation};
use rusqlite::Connection;
use uuid::Uuid;

fn team(service: &BoardService<'_>, leader: UserId, name: &str) -> TeamId {
    service
        .create_team(
            leader,
            NewTeam {
                name: name.to_string(),
                description: None,
            },
        )
        .unwrap()
        .uuid
}

fn project_row(conn: &Connection, project: Uuid, user: UserId) -> Option<ProjectMembership> {
    ProjectRepo::new(conn).membership(project, user).unwrap()
}

#[test]
fn creator_leads_the_new_team() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");

    let team = team(&service, leader, "Core");

    assert_eq!(TeamRepo::new(&conn).leader(team).unwrap(), Some(leader));
}

#[test]
fn blank_team_name_is_rejected() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");

    let err = service
        .create_team(
            leader,
            NewTeam {
                name: "  ".to_string(),
                description: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn adding_a_member_grants_assigned_projects() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let newcomer = user(&service, "newcomer");
    let project = project(&service, owner, "Apollo").uuid;
    let team = team(&service, owner, "Core");
    service.assign_team(owner, project, team).unwrap();

    service.add_team_member(owner, team, newcomer).unwrap();

    let row = project_row(&conn, project, newcomer).unwrap();
    assert_eq!(row.role, ProjectRole::Member);
    assert_eq!(row.team_uuid, Some(team));
    assert!(service.project_lists(newcomer, project).is_ok());
}

#[test]
fn assigning_a_team_grants_its_existing_members() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let member = user(&service, "member");
    let project = project(&service, owner, "Apollo").uuid;
    let team = team(&service, owner, "Core");
    service.add_team_member(owner, team, member).unwrap();
    assert!(project_row(&conn, project, member).is_none());

    service.assign_team(owner, project, team).unwrap();

    assert_eq!(project_row(&conn, project, member).unwrap().team_uuid, Some(team));
    let owner_row = project_row(&conn, project, owner).unwrap();
    assert_eq!(owner_row.role, ProjectRole::Manager);
    assert_eq!(owner_row.team_uuid, None);
}

#[test]
fn duplicate_member_is_rejected() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let member = user(&service, "member");
    let team = team(&service, leader, "Core");
    service.add_team_member(leader, team, member).unwrap();
    let before = audit_count(&conn);

    let err = service.add_team_member(leader, team, member).unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(audit_count(&conn), before);
}

#[test]
fn only_the_leader_manages_the_team() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let member = user(&service, "member");
    let other = user(&service, "other");
    let team = team(&service, leader, "Core");
    service.add_team_member(leader, team, member).unwrap();

    let add = service.add_team_member(member, team, other).unwrap_err();
    let rename = service
        .update_team(
            member,
            team,
            TeamPatch {
                name: Some("Mine".to_string()),
                description: None,
            },
        )
        .unwrap_err();
    let delete = service.delete_team(other, team).unwrap_err();

    for err in [add, rename, delete] {
        assert!(matches!(err, CoreError::Forbidden(_)));
        assert_eq!(err.public_code(), "FORBIDDEN");
    }
}

#[test]
fn removing_a_member_revokes_team_granted_access() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let member = user(&service, "member");
    let project = project(&service, owner, "Apollo").uuid;
    let team = team(&service, owner, "Core");
    service.add_team_member(owner, team, member).unwrap();
    service.assign_team(owner, project, team).unwrap();

    service.remove_team_member(owner, team, member).unwrap();

    assert!(project_row(&conn, project, member).is_none());
    let err = service.project_lists(member, project).unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[test]
fn removal_repoints_access_to_another_assigned_team() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let member = user(&service, "member");
    let project = project(&service, owner, "Apollo").uuid;
    let alpha = team(&service, owner, "Alpha");
    let beta = team(&service, owner, "Beta");
    service.add_team_member(owner, alpha, member).unwrap();
    service.add_team_member(owner, beta, member).unwrap();
    service.assign_team(owner, project, alpha).unwrap();
    service.assign_team(owner, project, beta).unwrap();
    assert_eq!(project_row(&conn, project, member).unwrap().team_uuid, Some(alpha));

    service.remove_team_member(owner, alpha, member).unwrap();

    let row = project_row(&conn, project, member).unwrap();
    assert_eq!(row.team_uuid, Some(beta));
    assert_eq!(row.role, ProjectRole::Member);
}

#[test]
fn leader_cannot_be_removed() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let team = team(&service, leader, "Core");

    let err = service.remove_team_member(leader, team, leader).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Invariant(InvariantViolation::LeaderRemoval { .. })
    ));
    assert_eq!(TeamRepo::new(&conn).leader(team).unwrap(), Some(leader));
}

#[test]
fn leader_reassign_swaps_roles_with_two_audit_entries() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let member = user(&service, "member");
    let other = user(&service, "other");
    let team = team(&service, leader, "Core");
    service.add_team_member(leader, team, member).unwrap();
    let seq = last_seq(&conn);

    let promoted = service.reassign_team_leader(leader, team, member).unwrap();

    assert!(promoted.is_leader);
    let repo = TeamRepo::new(&conn);
    assert_eq!(repo.leader(team).unwrap(), Some(member));
    assert!(!repo.membership(team, leader).unwrap().unwrap().is_leader);
    assert_eq!(
        actions_since(&conn, seq),
        vec![AuditAction::TeamLeaderRevoked, AuditAction::TeamLeaderAssigned]
    );

    let err = service.add_team_member(leader, team, other).unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
    service.add_team_member(member, team, other).unwrap();
}

#[test]
fn leader_must_be_a_team_member() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let outsider = user(&service, "outsider");
    let team = team(&service, leader, "Core");
    let before = audit_count(&conn);

    let err = service.reassign_team_leader(leader, team, outsider).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Invariant(InvariantViolation::LeaderNotMember { .. })
    ));
    assert_eq!(TeamRepo::new(&conn).leader(team).unwrap(), Some(leader));
    assert_eq!(audit_count(&conn), before);
}

#[test]
fn reassigning_the_current_leader_changes_nothing() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let team = team(&service, leader, "Core");
    let before = audit_count(&conn);

    service.reassign_team_leader(leader, team, leader).unwrap();

    assert_eq!(audit_count(&conn), before);
}

#[test]
fn deleting_a_team_keeps_the_managers_direct_access() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let u1 = user(&service, "u1");
    let u2 = user(&service, "u2");
    let project = project(&service, owner, "Apollo").uuid;
    let team = team(&service, owner, "Core");
    service.add_team_member(owner, team, u1).unwrap();
    service.add_team_member(owner, team, u2).unwrap();
    service.assign_team(owner, project, team).unwrap();
    service.reassign_project_manager(owner, project, u1).unwrap();

    service.delete_team(owner, team).unwrap();

    let manager = project_row(&conn, project, u1).unwrap();
    assert_eq!(manager.role, ProjectRole::Manager);
    assert_eq!(manager.team_uuid, None);
    assert!(project_row(&conn, project, u2).is_none());
    let owner_row = project_row(&conn, project, owner).unwrap();
    assert_eq!(owner_row.role, ProjectRole::Member);
    assert!(ProjectRepo::new(&conn).team_ids(project).unwrap().is_empty());
}

#[test]
fn unassigning_a_team_detaches_its_members() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let member = user(&service, "member");
    let project = project(&service, owner, "Apollo").uuid;
    let team = team(&service, owner, "Core");
    service.add_team_member(owner, team, member).unwrap();
    service.assign_team(owner, project, team).unwrap();
    let seq = last_seq(&conn);

    service.unassign_team(owner, project, team).unwrap();

    assert!(project_row(&conn, project, member).is_none());
    assert!(project_row(&conn, project, owner).is_some());
    assert_eq!(
        actions_since(&conn, seq),
        vec![AuditAction::ProjectTeamUnassigned]
    );
    let err = service.unassign_team(owner, project, team).unwrap_err();
    assert_eq!(err.public_code(), "FORBIDDEN");
}

#[test]
fn assigning_a_team_twice_is_rejected() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo").uuid;
    let team = team(&service, owner, "Core");
    service.assign_team(owner, project, team).unwrap();

    let err = service.assign_team(owner, project, team).unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
}
