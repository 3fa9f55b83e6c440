//! Audit log entry model and action tags.
//!
//! # Invariants
//! - Entries are write-once: no update or delete path exists.
//! - `action` tags are stable strings; renaming one is a schema change.

use super::list::ListId;
use super::project::ProjectId;
use super::task::TaskId;
use super::team::TeamId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a mutation did, as recorded in the activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum AuditAction {
    UserCreated,
    UserUpdated,
    TeamCreated,
    TeamUpdated,
    TeamDeleted,
    TeamMemberAdded,
    TeamMemberRemoved,
    TeamLeaderAssigned,
    TeamLeaderRevoked,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    ProjectTeamAssigned,
    ProjectTeamUnassigned,
    ProjectManagerPromoted,
    ProjectManagerDemoted,
    ListCreated,
    ListUpdated,
    ListDeleted,
    ListMoved,
    ListDoneAssigned,
    ListDoneRevoked,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskMoved,
    TaskAssigned,
    TaskUnassigned,
    CommentCreated,
    CommentUpdated,
    CommentDeleted,
    LabelCreated,
    LabelUpdated,
    LabelDeleted,
    LabelAttached,
    LabelDetached,
}

const ALL_ACTIONS: &[AuditAction] = &[
    AuditAction::UserCreated,
    AuditAction::UserUpdated,
    AuditAction::TeamCreated,
    AuditAction::TeamUpdated,
    AuditAction::TeamDeleted,
    AuditAction::TeamMemberAdded,
    AuditAction::TeamMemberRemoved,
    AuditAction::TeamLeaderAssigned,
    AuditAction::TeamLeaderRevoked,
    AuditAction::ProjectCreated,
    AuditAction::ProjectUpdated,
    AuditAction::ProjectDeleted,
    AuditAction::ProjectTeamAssigned,
    AuditAction::ProjectTeamUnassigned,
    AuditAction::ProjectManagerPromoted,
    AuditAction::ProjectManagerDemoted,
    AuditAction::ListCreated,
    AuditAction::ListUpdated,
    AuditAction::ListDeleted,
    AuditAction::ListMoved,
    AuditAction::ListDoneAssigned,
    AuditAction::ListDoneRevoked,
    AuditAction::TaskCreated,
    AuditAction::TaskUpdated,
    AuditAction::TaskDeleted,
    AuditAction::TaskMoved,
    AuditAction::TaskAssigned,
    AuditAction::TaskUnassigned,
    AuditAction::CommentCreated,
    AuditAction::CommentUpdated,
    AuditAction::CommentDeleted,
    AuditAction::LabelCreated,
    AuditAction::LabelUpdated,
    AuditAction::LabelDeleted,
    AuditAction::LabelAttached,
    AuditAction::LabelDetached,
];

impl AuditAction {
    /// Stable tag persisted in `audit_log.action`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::TeamCreated => "team.created",
            Self::TeamUpdated => "team.updated",
            Self::TeamDeleted => "team.deleted",
            Self::TeamMemberAdded => "team.member_added",
            Self::TeamMemberRemoved => "team.member_removed",
            Self::TeamLeaderAssigned => "team.leader_assigned",
            Self::TeamLeaderRevoked => "team.leader_revoked",
            Self::ProjectCreated => "project.created",
            Self::ProjectUpdated => "project.updated",
            Self::ProjectDeleted => "project.deleted",
            Self::ProjectTeamAssigned => "project.team_assigned",
            Self::ProjectTeamUnassigned => "project.team_unassigned",
            Self::ProjectManagerPromoted => "project.manager_promoted",
            Self::ProjectManagerDemoted => "project.manager_demoted",
            Self::ListCreated => "list.created",
            Self::ListUpdated => "list.updated",
            Self::ListDeleted => "list.deleted",
            Self::ListMoved => "list.moved",
            Self::ListDoneAssigned => "list.done_assigned",
            Self::ListDoneRevoked => "list.done_revoked",
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskDeleted => "task.deleted",
            Self::TaskMoved => "task.moved",
            Self::TaskAssigned => "task.assigned",
            Self::TaskUnassigned => "task.unassigned",
            Self::CommentCreated => "comment.created",
            Self::CommentUpdated => "comment.updated",
            Self::CommentDeleted => "comment.deleted",
            Self::LabelCreated => "label.created",
            Self::LabelUpdated => "label.updated",
            Self::LabelDeleted => "label.deleted",
            Self::LabelAttached => "label.attached",
            Self::LabelDetached => "label.detached",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
    }

    pub fn all() -> &'static [AuditAction] {
        ALL_ACTIONS
    }
}

impl From<AuditAction> for &'static str {
    fn from(value: AuditAction) -> Self {
        value.as_str()
    }
}

impl TryFrom<String> for AuditAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown audit action `{value}`"))
    }
}

/// One persisted activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Insertion sequence; breaks ties between entries with equal timestamps.
    pub seq: i64,
    pub uuid: Uuid,
    pub actor_uuid: UserId,
    /// User acted upon, if any (added member, promoted manager, assignee).
    pub subject_uuid: Option<UserId>,
    pub action: AuditAction,
    pub team_uuid: Option<TeamId>,
    pub project_uuid: Option<ProjectId>,
    pub list_uuid: Option<ListId>,
    pub task_uuid: Option<TaskId>,
    pub created_at: i64,
}

/// Audit entry under construction, written by [`crate::audit::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub actor_uuid: UserId,
    pub subject_uuid: Option<UserId>,
    pub action: AuditAction,
    pub team_uuid: Option<TeamId>,
    pub project_uuid: Option<ProjectId>,
    pub list_uuid: Option<ListId>,
    pub task_uuid: Option<TaskId>,
}

impl AuditRecord {
    pub fn new(actor_uuid: UserId, action: AuditAction) -> Self {
        Self {
            actor_uuid,
            subject_uuid: None,
            action,
            team_uuid: None,
            project_uuid: None,
            list_uuid: None,
            task_uuid: None,
        }
    }

    pub fn subject(mut self, user: UserId) -> Self {
        self.subject_uuid = Some(user);
        self
    }

    pub fn team(mut self, team: TeamId) -> Self {
        self.team_uuid = Some(team);
        self
    }

    pub fn project(mut self, project: ProjectId) -> Self {
        self.project_uuid = Some(project);
        self
    }

    pub fn list(mut self, list: ListId) -> Self {
        self.list_uuid = Some(list);
        self
    }

    pub fn task(mut self, task: TaskId) -> Self {
        self.task_uuid = Some(task);
        self
    }
}
