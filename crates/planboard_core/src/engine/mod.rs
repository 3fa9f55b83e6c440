//! Invariant-preserving mutation engine.
//!
//! # Responsibility
//! - Run every mutation inside exactly one [`UnitOfWork`].
//! - Keep sibling positions contiguous and singleton flags/roles unique.
//! - Append the audit trail inside the same transaction.
//!
//! # Invariants
//! - A failed step aborts the whole transaction; nothing partial commits.
//! - Batch validation happens before a transaction is opened.
//! - The engine never checks permissions; callers go through the guard.

mod comments;
mod labels;
mod lists;
mod membership;
pub mod ordering;
mod projects;
mod tasks;
mod teams;
mod users;

use crate::error::{CoreError, CoreResult};
use crate::model::list::{ListId, TaskList};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::model::team::{Team, TeamId};
use crate::model::user::{User, UserId};
use crate::repo::task_repo::TaskLocation;
use crate::uow::UnitOfWork;
use log::{info, warn};
use rusqlite::Connection;
use std::time::Instant;

pub struct MutationEngine<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MutationEngine<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Runs `body` in a fresh transaction and commits when it succeeds.
    ///
    /// # Side effects
    /// - Emits one `event=<event>` log line with status and duration.
    fn in_transaction<T>(
        &self,
        event: &'static str,
        body: impl FnOnce(&UnitOfWork<'_>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let started_at = Instant::now();
        let result = UnitOfWork::begin(self.conn)
            .map_err(CoreError::from)
            .and_then(|uow| {
                let value = body(&uow)?;
                uow.commit()?;
                Ok(value)
            });

        match &result {
            Ok(_) => info!(
                "event={event} module=engine status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event={event} module=engine status=error duration_ms={} error_code={} retryable={}",
                started_at.elapsed().as_millis(),
                err.log_code(),
                err.is_retryable()
            ),
        }
        result
    }
}

fn require_user(uow: &UnitOfWork<'_>, id: UserId) -> CoreResult<User> {
    uow.users()
        .get(id)?
        .ok_or_else(|| CoreError::not_found("user", id))
}

fn require_team(uow: &UnitOfWork<'_>, id: TeamId) -> CoreResult<Team> {
    uow.teams()
        .get(id)?
        .ok_or_else(|| CoreError::not_found("team", id))
}

fn require_project(uow: &UnitOfWork<'_>, id: ProjectId) -> CoreResult<Project> {
    uow.projects()
        .get(id)?
        .ok_or_else(|| CoreError::not_found("project", id))
}

fn require_list(uow: &UnitOfWork<'_>, id: ListId) -> CoreResult<TaskList> {
    uow.lists()
        .get(id)?
        .ok_or_else(|| CoreError::not_found("list", id))
}

fn require_task(uow: &UnitOfWork<'_>, id: TaskId) -> CoreResult<(Task, TaskLocation)> {
    let location = uow
        .tasks()
        .locate(id)?
        .ok_or_else(|| CoreError::not_found("task", id))?;
    let task = uow.tasks().require(id)?;
    Ok((task, location))
}

/// Trims `value` and rejects it when nothing is left.
fn normalize_required(value: &str, field: &'static str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field, mapping blank input to `None`.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
