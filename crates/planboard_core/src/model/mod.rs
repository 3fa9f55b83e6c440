//! Domain model for teams, projects, lists, tasks, comments and audit entries.
//!
//! # Responsibility
//! - Define the read models returned by repositories and the engine.
//! - Define input shapes (`New*`, `*Patch`) accepted by mutations.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Positions are 1-based and contiguous within their parent.

pub mod audit;
pub mod comment;
pub mod label;
pub mod list;
pub mod project;
pub mod task;
pub mod team;
pub mod user;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Desired position for one sibling in a bulk reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
    pub id: Uuid,
    pub position: i64,
}

impl PositionAssignment {
    pub fn new(id: Uuid, position: i64) -> Self {
        Self { id, position }
    }
}
