mod common;

use common::{audit_count, list_named, project, service, setup, task, user};
use planboard_core::audit::entries_for_project;
use planboard_core::model::audit::AuditAction;
use planboard_core::model::team::NewTeam;
use planboard_core::model::user::UserProfilePatch;
use planboard_core::{AuditConfig, BoardService};

#[test]
fn committed_mutation_leaves_one_entry_with_matching_references() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo");
    let list = list_named(&service, owner, project.uuid, "To Do");
    let before = audit_count(&conn);

    let created = task(&service, owner, list.uuid, "Wire up feed");

    assert_eq!(audit_count(&conn), before + 1);
    let entries = entries_for_project(&conn, project.uuid).unwrap();
    let entry = entries.last().unwrap();
    assert_eq!(entry.action, AuditAction::TaskCreated);
    assert_eq!(entry.actor_uuid, owner);
    assert_eq!(entry.project_uuid, Some(project.uuid));
    assert_eq!(entry.list_uuid, Some(list.uuid));
    assert_eq!(entry.task_uuid, Some(created.uuid));
    assert_eq!(entry.subject_uuid, None);
}

#[test]
fn rejected_mutations_leave_no_entry() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let outsider = user(&service, "outsider");
    let project = project(&service, owner, "Apollo");
    let done = list_named(&service, owner, project.uuid, "Done");
    let before = audit_count(&conn);

    assert!(service.delete_list(owner, done.uuid).is_err());
    assert!(service.create_list(outsider, project.uuid, "Nope").is_err());
    assert!(service.create_list(owner, project.uuid, "   ").is_err());
    assert!(service
        .create_project(owner, planboard_core::model::project::NewProject::named("Apollo"))
        .is_err());

    assert_eq!(audit_count(&conn), before);
}

#[test]
fn feed_is_scoped_to_viewer_memberships() {
    let conn = setup();
    let service = service(&conn);
    let alice = user(&service, "alice");
    let bob = user(&service, "bob");
    let apollo = project(&service, alice, "Apollo");
    let gemini = project(&service, bob, "Gemini");

    let alice_feed = service.activity_feed(alice, None).unwrap();
    assert!(!alice_feed.is_empty());
    assert!(alice_feed
        .iter()
        .all(|entry| entry.project_uuid == Some(apollo.uuid)));

    let bob_feed = service.activity_feed(bob, None).unwrap();
    assert!(bob_feed
        .iter()
        .all(|entry| entry.project_uuid == Some(gemini.uuid)));
}

#[test]
fn team_activity_is_visible_to_team_members_only() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let member = user(&service, "member");
    let outsider = user(&service, "outsider");
    let team = service
        .create_team(
            leader,
            NewTeam {
                name: "Core".to_string(),
                description: None,
            },
        )
        .unwrap();
    service.add_team_member(leader, team.uuid, member).unwrap();

    let member_feed = service.activity_feed(member, None).unwrap();
    let actions: Vec<AuditAction> = member_feed.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::TeamMemberAdded, AuditAction::TeamCreated]
    );
    assert!(service.activity_feed(outsider, None).unwrap().is_empty());
}

#[test]
fn leaving_a_team_hides_its_history() {
    let conn = setup();
    let service = service(&conn);
    let leader = user(&service, "leader");
    let member = user(&service, "member");
    let team = service
        .create_team(
            leader,
            NewTeam {
                name: "Core".to_string(),
                description: None,
            },
        )
        .unwrap();
    service.add_team_member(leader, team.uuid, member).unwrap();
    assert!(!service.activity_feed(member, None).unwrap().is_empty());

    service.remove_team_member(leader, team.uuid, member).unwrap();
    assert!(service.activity_feed(member, None).unwrap().is_empty());
}

#[test]
fn feed_is_newest_first() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo");
    let list = list_named(&service, owner, project.uuid, "To Do");
    task(&service, owner, list.uuid, "first");
    service.rename_list(owner, list.uuid, "Backlog").unwrap();

    let feed = service.activity_feed(owner, None).unwrap();
    let actions: Vec<AuditAction> = feed.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::ListUpdated,
            AuditAction::TaskCreated,
            AuditAction::ProjectCreated
        ]
    );
    assert!(feed.windows(2).all(|pair| pair[0].seq > pair[1].seq));
}

#[test]
fn feed_limit_is_defaulted_and_clamped() {
    let conn = setup();
    let config = AuditConfig {
        default_feed_limit: 3,
        max_feed_limit: 5,
    };
    let service = BoardService::new(&conn, config);
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo");
    let list = list_named(&service, owner, project.uuid, "To Do");
    for index in 0..8 {
        task(&service, owner, list.uuid, &format!("task {index}"));
    }

    assert_eq!(service.activity_feed(owner, None).unwrap().len(), 3);
    assert_eq!(service.activity_feed(owner, Some(0)).unwrap().len(), 1);
    assert_eq!(service.activity_feed(owner, Some(4)).unwrap().len(), 4);
    assert_eq!(service.activity_feed(owner, Some(500)).unwrap().len(), 5);
}

#[test]
fn entries_outlive_the_entities_they_name() {
    let conn = setup();
    let service = service(&conn);
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo");

    service.delete_project(owner, project.uuid).unwrap();

    let entries = entries_for_project(&conn, project.uuid).unwrap();
    let actions: Vec<AuditAction> = entries.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::ProjectCreated, AuditAction::ProjectDeleted]
    );
}

#[test]
fn profile_changes_are_audited_but_stay_out_of_feeds() {
    let conn = setup();
    let service = service(&conn);
    let alice = user(&service, "alice");
    let before = audit_count(&conn);

    let updated = service
        .update_user_profile(
            alice,
            UserProfilePatch {
                display_name: Some("  Alice A.  ".to_string()),
                avatar_url: None,
            },
        )
        .unwrap();

    assert_eq!(updated.display_name, "Alice A.");
    assert_eq!(updated.email, "alice@example.com");
    assert_eq!(audit_count(&conn), before + 1);
    assert!(service.activity_feed(alice, None).unwrap().is_empty());
}

#[test]
fn feed_survives_an_unvalidated_zero_maximum() {
    let conn = setup();
    let service = BoardService::new(
        &conn,
        AuditConfig {
            default_feed_limit: 10,
            max_feed_limit: 0,
        },
    );
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo");
    list_named(&service, owner, project.uuid, "Done");

    let feed = service.activity_feed(owner, None).unwrap();

    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].action, AuditAction::ProjectCreated);
}
