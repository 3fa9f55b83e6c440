use super::{parse_entry_row, AUDIT_SELECT_SQL};
use crate::model::audit::AuditLogEntry;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::RepoResult;
use rusqlite::{params, Connection};

/// Most recent entries scoped to the viewer's teams or projects.
///
/// Newest first; entries sharing a timestamp are ordered by insertion
/// sequence, newest first.
pub fn feed_for_viewer(
    conn: &Connection,
    viewer: UserId,
    limit: u32,
) -> RepoResult<Vec<AuditLogEntry>> {
    let mut stmt = conn.prepare(&format!(
        "{AUDIT_SELECT_SQL}
         WHERE team_uuid IN (
                SELECT team_uuid FROM team_memberships WHERE user_uuid = ?1
             )
            OR project_uuid IN (
                SELECT project_uuid FROM project_memberships WHERE user_uuid = ?1
             )
         ORDER BY created_at DESC, seq DESC
         LIMIT ?2;"
    ))?;
    let mut rows = stmt.query(params![viewer.to_string(), i64::from(limit)])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_entry_row(row)?);
    }
    Ok(items)
}

/// Every entry tagged with `project`, oldest first.
pub fn entries_for_project(conn: &Connection, project: ProjectId) -> RepoResult<Vec<AuditLogEntry>> {
    let mut stmt = conn.prepare(&format!(
        "{AUDIT_SELECT_SQL}
         WHERE project_uuid = ?1
         ORDER BY seq ASC;"
    ))?;
    let mut rows = stmt.query([project.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_entry_row(row)?);
    }
    Ok(items)
}
