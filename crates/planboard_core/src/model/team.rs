//! Team and team membership model.
//!
//! # Invariants
//! - A team with members has exactly one membership with `is_leader = true`.

use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TeamId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub uuid: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_uuid: TeamId,
    pub user_uuid: UserId,
    pub is_leader: bool,
    pub created_at: i64,
}

impl TeamMembership {
    pub fn role(&self) -> TeamRole {
        if self.is_leader {
            TeamRole::Leader
        } else {
            TeamRole::Member
        }
    }
}

/// Role an actor holds inside one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Leader,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}
