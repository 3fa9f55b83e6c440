//! Append-only activity log.
//!
//! # Responsibility
//! - Persist one entry per successful mutation, inside that mutation's
//!   transaction.
//! - Serve the per-viewer activity feed.
//!
//! # Invariants
//! - The writer only accepts a [`crate::uow::UnitOfWork`], so an entry can
//!   never commit independently of the change it describes.
//! - Entries are never updated or deleted; the schema rejects both.

mod feed;
mod writer;

pub use feed::{entries_for_project, feed_for_viewer};
pub use writer::record;

use crate::model::audit::{AuditAction, AuditLogEntry};
use crate::repo::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::Row;

const AUDIT_SELECT_SQL: &str = "SELECT
    seq,
    uuid,
    actor_uuid,
    subject_uuid,
    action,
    team_uuid,
    project_uuid,
    list_uuid,
    task_uuid,
    created_at
FROM audit_log";

fn parse_entry_row(row: &Row<'_>) -> RepoResult<AuditLogEntry> {
    let uuid: String = row.get("uuid")?;
    let actor: String = row.get("actor_uuid")?;
    let action_text: String = row.get("action")?;
    let action = AuditAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid audit action `{action_text}` in audit_log.action"))
    })?;
    Ok(AuditLogEntry {
        seq: row.get("seq")?,
        uuid: parse_uuid(&uuid, "audit_log.uuid")?,
        actor_uuid: parse_uuid(&actor, "audit_log.actor_uuid")?,
        subject_uuid: parse_optional_uuid(row.get("subject_uuid")?, "audit_log.subject_uuid")?,
        action,
        team_uuid: parse_optional_uuid(row.get("team_uuid")?, "audit_log.team_uuid")?,
        project_uuid: parse_optional_uuid(row.get("project_uuid")?, "audit_log.project_uuid")?,
        list_uuid: parse_optional_uuid(row.get("list_uuid")?, "audit_log.list_uuid")?,
        task_uuid: parse_optional_uuid(row.get("task_uuid")?, "audit_log.task_uuid")?,
        created_at: row.get("created_at")?,
    })
}
