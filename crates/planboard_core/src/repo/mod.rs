//! Repository layer: typed SQL reads and writes per aggregate.
//!
//! # Responsibility
//! - Keep SQL details behind one struct per aggregate.
//! - Accept any `&Connection`, so the same calls run inside a
//!   [`crate::uow::UnitOfWork`] transaction.
//!
//! # Invariants
//! - Repositories never enforce business invariants; the engine does.
//! - Missing rows are reported as `None`/`false`, never as errors.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod comment_repo;
pub mod label_repo;
pub mod list_repo;
pub mod project_repo;
pub mod task_repo;
pub mod team_repo;
pub mod user_repo;

use crate::db::DbError;
use thiserror::Error;
use uuid::Uuid;

pub use comment_repo::CommentRepo;
pub use label_repo::LabelRepo;
pub use list_repo::ListRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use team_repo::TeamRepo;
pub use user_repo::UserRepo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_busy())
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn parse_flag(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn flag(value: bool) -> i64 {
    i64::from(value)
}
