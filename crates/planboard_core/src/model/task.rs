//! Task model.
//!
//! # Invariants
//! - Positions within a list form the sequence `1..=N`.
//! - `assignees` is sorted and free of duplicates.

use super::list::ListId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub list_uuid: ListId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
    pub position: i64,
    pub created_by: UserId,
    pub assignees: Vec<UserId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Users allowed to edit this task on ownership grounds: the creator and
    /// every current assignee.
    pub fn author_ids(&self) -> BTreeSet<UserId> {
        let mut ids: BTreeSet<UserId> = self.assignees.iter().copied().collect();
        ids.insert(self.created_by);
        ids
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<i64>,
    pub assignees: Vec<UserId>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<i64>>,
}
