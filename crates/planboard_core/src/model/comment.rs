//! Task comment model with optional single-parent threading.

use super::task::TaskId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CommentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub uuid: CommentId,
    pub task_uuid: TaskId,
    pub author_uuid: UserId,
    /// Parent comment in the same task, when this is a reply.
    pub parent_uuid: Option<CommentId>,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}
