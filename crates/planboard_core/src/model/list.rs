//! Project list (board column) model.
//!
//! # Invariants
//! - Positions within a project form the sequence `1..=N`.
//! - Exactly one list per non-empty project has `is_done = true`.

use super::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ListId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub uuid: ListId,
    pub project_uuid: ProjectId,
    pub name: String,
    pub position: i64,
    pub is_done: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
