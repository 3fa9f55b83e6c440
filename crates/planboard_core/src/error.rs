//! Core error taxonomy.
//!
//! # Invariants
//! - `NotFound` and `Forbidden` share one public code and message, so a
//!   caller cannot probe for the existence of entities it may not see.
//! - Only `Conflict` is retryable; the core never retries on its own.

use crate::auth::guard::Denial;
use crate::db::DbError;
use crate::model::comment::CommentId;
use crate::model::list::ListId;
use crate::model::project::ProjectId;
use crate::model::team::TeamId;
use crate::model::user::UserId;
use crate::repo::RepoError;
use thiserror::Error;
use uuid::Uuid;

pub type CoreResult<T> = Result<T, CoreError>;

/// Public code attached to every forbidden or not-found outcome.
pub const FORBIDDEN_CODE: &str = "FORBIDDEN";

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input, rejected before any row is written.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The guard refused the action.
    #[error("{0}")]
    Forbidden(Denial),
    /// Target row does not exist. Reported externally as forbidden.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    /// The mutation would break a structural invariant.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    /// A concurrent writer held the lock; the caller may retry.
    #[error("transaction conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(RepoError),
}

/// Structural invariant a mutation refused to break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("list {list} is the project's Done list; reassign Done before deleting it")]
    DoneListDeletion { list: ListId },
    #[error("user {user} is not a member of project {project} and cannot be promoted to Manager")]
    ManagerNotMember { project: ProjectId, user: UserId },
    #[error("user {user} leads team {team}; reassign the leader before removing them")]
    LeaderRemoval { team: TeamId, user: UserId },
    #[error("user {user} is not a member of team {team} and cannot become its leader")]
    LeaderNotMember { team: TeamId, user: UserId },
    #[error("reply parent {parent} belongs to a different task")]
    CommentParentMismatch { parent: CommentId },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Stable code safe to hand to external callers.
    pub fn public_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Forbidden(_) | Self::NotFound { .. } => FORBIDDEN_CODE,
            Self::Invariant(_) => "INVARIANT_VIOLATION",
            Self::Conflict(_) => "TRANSACTION_CONFLICT",
            Self::Storage(_) => "INTERNAL",
        }
    }

    /// Message safe to hand to external callers.
    pub fn public_message(&self) -> String {
        match self {
            Self::Forbidden(denial) => denial.message.clone(),
            Self::NotFound { .. } => Denial::GENERIC_MESSAGE.to_string(),
            Self::Storage(_) => "internal storage error".to_string(),
            other => other.to_string(),
        }
    }

    /// Internal classification used in log events.
    pub fn log_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Invariant(_) => "invariant_violation",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        if value.is_busy() {
            Self::Conflict(value.to_string())
        } else {
            Self::Storage(value)
        }
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        RepoError::from(value).into()
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(value: rusqlite::Error) -> Self {
        RepoError::from(value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreError, InvariantViolation, FORBIDDEN_CODE};
    use crate::auth::guard::Denial;
    use crate::auth::policy::{Action, EntityKind};
    use crate::db::DbError;
    use crate::repo::RepoError;
    use rusqlite::ffi;
    use uuid::Uuid;

    #[test]
    fn not_found_is_indistinguishable_from_forbidden_externally() {
        let missing = CoreError::not_found("task", Uuid::new_v4());
        let denied = CoreError::Forbidden(Denial::new(EntityKind::Task, Action::Delete));
        assert_eq!(missing.public_code(), FORBIDDEN_CODE);
        assert_eq!(denied.public_code(), FORBIDDEN_CODE);
        assert_eq!(missing.public_message(), Denial::GENERIC_MESSAGE);
        assert!(!missing.public_message().contains("not found"));
        assert_ne!(missing.log_code(), denied.log_code());
    }

    #[test]
    fn busy_storage_errors_become_retryable_conflicts() {
        let busy = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        );
        let err = CoreError::from(RepoError::Db(DbError::Sqlite(busy)));
        assert!(matches!(err, CoreError::Conflict(_)));
        assert!(err.is_retryable());
        assert_eq!(err.public_code(), "TRANSACTION_CONFLICT");
    }

    #[test]
    fn other_storage_errors_are_not_retryable() {
        let err = CoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(!err.is_retryable());
        assert_eq!(err.public_message(), "internal storage error");
    }

    #[test]
    fn invariant_messages_explain_the_fix() {
        let err = CoreError::from(InvariantViolation::DoneListDeletion {
            list: Uuid::new_v4(),
        });
        assert_eq!(err.public_code(), "INVARIANT_VIOLATION");
        assert!(err.public_message().contains("reassign Done before deleting"));
    }
}
