//! Project-scoped task labels.

use super::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LabelId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub uuid: LabelId,
    pub project_uuid: ProjectId,
    /// Unique within the project.
    pub name: String,
    pub color: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}
