//! User identity and display profile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub display_name: String,
    /// Identity key; immutable after creation.
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl NewUser {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            avatar_url: None,
        }
    }
}

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfilePatch {
    pub display_name: Option<String>,
    pub avatar_url: Option<Option<String>>,
}
