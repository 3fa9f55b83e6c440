//! Core of the planboard project-management backend.
//!
//! State changes pass the guard first, then run inside one transaction that
//! also writes their audit entries. This crate is the single source of truth
//! for those rules.

pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod uow;

pub use auth::{
    can_do, resolve_context, Action, Denial, EntityKind, EntityRef, Guard, PermissionContext,
};
pub use config::{AuditConfig, CoreConfig, DatabaseConfig, LoggingConfig};
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError};
pub use engine::MutationEngine;
pub use error::{CoreError, CoreResult, InvariantViolation};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::PositionAssignment;
pub use repo::{RepoError, RepoResult};
pub use service::{ActivityFeed, BoardService};
pub use uow::UnitOfWork;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
