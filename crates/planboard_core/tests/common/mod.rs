#![allow(dead_code)]

use planboard_core::model::audit::AuditAction;
use planboard_core::model::list::{ListId, TaskList};
use planboard_core::model::project::{NewProject, Project, ProjectId};
use planboard_core::model::task::{NewTask, Task};
use planboard_core::model::user::{NewUser, UserId};
use planboard_core::{open_db_in_memory, AuditConfig, BoardService};
use rusqlite::Connection;

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn service(conn: &Connection) -> BoardService<'_> {
    BoardService::new(conn, AuditConfig::default())
}

pub fn user(service: &BoardService<'_>, handle: &str) -> UserId {
    service
        .create_user(NewUser::new(handle, format!("{handle}@example.com")))
        .unwrap()
        .uuid
}

pub fn project(service: &BoardService<'_>, owner: UserId, name: &str) -> Project {
    service
        .create_project(owner, NewProject::named(name))
        .unwrap()
}

pub fn lists(service: &BoardService<'_>, actor: UserId, project: ProjectId) -> Vec<TaskList> {
    service.project_lists(actor, project).unwrap()
}

/// `(name, position, is_done)` per list, in position order.
pub fn list_layout(
    service: &BoardService<'_>,
    actor: UserId,
    project: ProjectId,
) -> Vec<(String, i64, bool)> {
    lists(service, actor, project)
        .into_iter()
        .map(|list| (list.name, list.position, list.is_done))
        .collect()
}

pub fn list_named(
    service: &BoardService<'_>,
    actor: UserId,
    project: ProjectId,
    name: &str,
) -> TaskList {
    lists(service, actor, project)
        .into_iter()
        .find(|list| list.name == name)
        .unwrap()
}

pub fn task(service: &BoardService<'_>, actor: UserId, list: ListId, title: &str) -> Task {
    service
        .create_task(actor, list, NewTask::titled(title))
        .unwrap()
}

/// `(title, position)` per task, in position order.
pub fn task_layout(service: &BoardService<'_>, actor: UserId, list: ListId) -> Vec<(String, i64)> {
    service
        .list_tasks(actor, list)
        .unwrap()
        .into_iter()
        .map(|task| (task.title, task.position))
        .collect()
}

pub fn audit_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM audit_log;", [], |row| row.get(0))
        .unwrap()
}

/// Actions recorded after `after_seq`, oldest first.
pub fn actions_since(conn: &Connection, after_seq: i64) -> Vec<AuditAction> {
    let mut stmt = conn
        .prepare("SELECT action FROM audit_log WHERE seq > ?1 ORDER BY seq ASC;")
        .unwrap();
    let mut rows = stmt.query([after_seq]).unwrap();
    let mut actions = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let tag: String = row.get(0).unwrap();
        actions.push(AuditAction::parse(&tag).unwrap());
    }
    actions
}

pub fn last_seq(conn: &Connection) -> i64 {
    conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM audit_log;", [], |row| {
        row.get(0)
    })
    .unwrap()
}
