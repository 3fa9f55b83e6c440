//! Viewer-scoped activity feed.

use crate::audit;
use crate::config::AuditConfig;
use crate::error::CoreResult;
use crate::model::audit::AuditLogEntry;
use crate::model::user::UserId;
use log::info;
use rusqlite::Connection;
use std::time::Instant;

/// Reads audit entries visible to a viewer through their current teams and
/// projects.
pub struct ActivityFeed<'conn> {
    conn: &'conn Connection,
    config: AuditConfig,
}

impl<'conn> ActivityFeed<'conn> {
    pub fn new(conn: &'conn Connection, config: AuditConfig) -> Self {
        Self { conn, config }
    }

    /// Newest entries first. `limit` falls back to the configured default
    /// and is clamped to the configured maximum.
    pub fn for_viewer(&self, viewer: UserId, limit: Option<u32>) -> CoreResult<Vec<AuditLogEntry>> {
        let started_at = Instant::now();
        let limit = self.config.normalize_limit(limit);
        let entries = audit::feed_for_viewer(self.conn, viewer, limit)?;
        info!(
            "event=activity_feed module=service status=ok limit={} returned={} duration_ms={}",
            limit,
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }
}
