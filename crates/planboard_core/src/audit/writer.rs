use super::{parse_entry_row, AUDIT_SELECT_SQL};
use crate::model::audit::{AuditLogEntry, AuditRecord};
use crate::repo::{RepoError, RepoResult};
use crate::uow::UnitOfWork;
use log::debug;
use rusqlite::params;
use uuid::Uuid;

/// Appends `entry` within the caller's transaction.
pub fn record(uow: &UnitOfWork<'_>, entry: AuditRecord) -> RepoResult<AuditLogEntry> {
    let uuid = Uuid::new_v4();
    let conn = uow.conn();
    conn.execute(
        "INSERT INTO audit_log (
            uuid,
            actor_uuid,
            subject_uuid,
            action,
            team_uuid,
            project_uuid,
            list_uuid,
            task_uuid
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            uuid.to_string(),
            entry.actor_uuid.to_string(),
            entry.subject_uuid.map(|id| id.to_string()),
            entry.action.as_str(),
            entry.team_uuid.map(|id| id.to_string()),
            entry.project_uuid.map(|id| id.to_string()),
            entry.list_uuid.map(|id| id.to_string()),
            entry.task_uuid.map(|id| id.to_string()),
        ],
    )?;
    debug!(
        "event=audit_append module=audit status=ok action={} actor={}",
        entry.action.as_str(),
        entry.actor_uuid
    );

    let mut stmt = conn.prepare(&format!("{AUDIT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([uuid.to_string()])?;
    match rows.next()? {
        Some(row) => parse_entry_row(row),
        None => Err(RepoError::InvalidData(format!(
            "audit entry {uuid} vanished after write"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::record;
    use crate::db::open_db_in_memory;
    use crate::model::audit::{AuditAction, AuditRecord};
    use crate::uow::UnitOfWork;
    use uuid::Uuid;

    fn count_entries(conn: &rusqlite::Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM audit_log;", [], |row| row.get(0))
            .expect("count audit rows")
    }

    #[test]
    fn committed_entry_is_persisted_with_sequence() {
        let conn = open_db_in_memory().expect("open db");
        let actor = Uuid::new_v4();
        let project = Uuid::new_v4();

        let uow = UnitOfWork::begin(&conn).expect("begin");
        let first = record(
            &uow,
            AuditRecord::new(actor, AuditAction::ProjectUpdated).project(project),
        )
        .expect("record first");
        let second = record(
            &uow,
            AuditRecord::new(actor, AuditAction::ProjectUpdated).project(project),
        )
        .expect("record second");
        uow.commit().expect("commit");

        assert!(second.seq > first.seq);
        assert_eq!(first.project_uuid, Some(project));
        assert_eq!(first.team_uuid, None);
        assert_eq!(count_entries(&conn), 2);
    }

    #[test]
    fn rolled_back_entry_disappears() {
        let conn = open_db_in_memory().expect("open db");
        let uow = UnitOfWork::begin(&conn).expect("begin");
        record(&uow, AuditRecord::new(Uuid::new_v4(), AuditAction::TaskCreated))
            .expect("record");
        uow.rollback().expect("rollback");

        assert_eq!(count_entries(&conn), 0);
    }

    #[test]
    fn schema_rejects_edits_and_deletes() {
        let conn = open_db_in_memory().expect("open db");
        let uow = UnitOfWork::begin(&conn).expect("begin");
        let entry = record(&uow, AuditRecord::new(Uuid::new_v4(), AuditAction::TaskCreated))
            .expect("record");
        uow.commit().expect("commit");

        let update = conn.execute(
            "UPDATE audit_log SET action = 'task.deleted' WHERE seq = ?1;",
            [entry.seq],
        );
        assert!(update.is_err());
        let delete = conn.execute("DELETE FROM audit_log WHERE seq = ?1;", [entry.seq]);
        assert!(delete.is_err());
        assert_eq!(count_entries(&conn), 1);
    }
}
