mod common;

use common::{audit_count, project, service, user};
use planboard_core::{open_db_with_config, CoreError, DatabaseConfig, UnitOfWork};
use rusqlite::Connection;
use std::path::Path;

fn open(path: &Path) -> Connection {
    open_db_with_config(&DatabaseConfig {
        path: Some(path.to_path_buf()),
        busy_timeout_ms: 0,
    })
    .unwrap()
}

#[test]
fn competing_writer_surfaces_a_retryable_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let holder = open(&path);
    let writer = open(&path);

    let service = service(&writer);
    let owner = user(&service, "owner");
    let project = project(&service, owner, "Apollo").uuid;
    let before = audit_count(&writer);

    let lock = UnitOfWork::begin(&holder).unwrap();
    let err = service.create_list(owner, project, "Blocked").unwrap_err();

    assert!(matches!(err, CoreError::Conflict(_)));
    assert!(err.is_retryable());
    assert_eq!(err.public_code(), "TRANSACTION_CONFLICT");

    lock.rollback().unwrap();
    assert_eq!(audit_count(&writer), before);

    let created = service.create_list(owner, project, "Blocked").unwrap();
    assert_eq!(created.position, 4);
    assert_eq!(audit_count(&writer), before + 1);
}

#[test]
fn non_conflict_errors_are_not_retryable() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open(&dir.path().join("board.sqlite3"));
    let service = service(&conn);
    let owner = user(&service, "owner");

    let err = service.create_list(owner, uuid::Uuid::new_v4(), "Nowhere").unwrap_err();

    assert!(!err.is_retryable());
    assert_eq!(err.public_code(), "FORBIDDEN");
}
