//! Fixed decision table for (entity, action, context).
//!
//! Two tiers: membership gates whether an actor may use a project at all,
//! authorship gates whether they may change one specific task or comment.
//! A project Manager overrides both tiers.

use super::context::PermissionContext;
use crate::model::team::TeamRole;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Project,
    List,
    Label,
    Task,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    AddMember,
    RemoveMember,
    ReassignLeader,
    ReassignRole,
    ManageTeams,
    Assign,
    Reorder,
    Move,
}

const ALL_ENTITY_KINDS: &[EntityKind] = &[
    EntityKind::Team,
    EntityKind::Project,
    EntityKind::List,
    EntityKind::Label,
    EntityKind::Task,
    EntityKind::Comment,
];

const ALL_ACTIONS: &[Action] = &[
    Action::Read,
    Action::Create,
    Action::Update,
    Action::Delete,
    Action::AddMember,
    Action::RemoveMember,
    Action::ReassignLeader,
    Action::ReassignRole,
    Action::ManageTeams,
    Action::Assign,
    Action::Reorder,
    Action::Move,
];

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Project => "project",
            Self::List => "list",
            Self::Label => "label",
            Self::Task => "task",
            Self::Comment => "comment",
        }
    }

    pub fn all() -> &'static [EntityKind] {
        ALL_ENTITY_KINDS
    }
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::AddMember => "add_member",
            Self::RemoveMember => "remove_member",
            Self::ReassignLeader => "reassign_leader",
            Self::ReassignRole => "reassign_role",
            Self::ManageTeams => "manage_teams",
            Self::Assign => "assign",
            Self::Reorder => "reorder",
            Self::Move => "move",
        }
    }

    pub fn all() -> &'static [Action] {
        ALL_ACTIONS
    }

    /// Actions that change a specific task or comment and therefore need
    /// authorship on top of membership.
    fn is_ownership_gated(self) -> bool {
        matches!(self, Self::Update | Self::Delete | Self::Move)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns whether `ctx` allows `action` on an entity of kind `entity`.
///
/// Pure and total: every (entity, action) pair has an answer.
pub fn can_do(entity: EntityKind, action: Action, ctx: &PermissionContext) -> bool {
    match entity {
        EntityKind::Team => match action {
            Action::Update
            | Action::Delete
            | Action::AddMember
            | Action::RemoveMember
            | Action::ReassignLeader => ctx.team_role == Some(TeamRole::Leader),
            _ => ctx.team_role.is_some(),
        },
        EntityKind::Project => match action {
            Action::Update | Action::Delete | Action::ReassignRole | Action::ManageTeams => {
                ctx.is_manager()
            }
            _ => ctx.is_project_member || ctx.is_manager(),
        },
        EntityKind::List | EntityKind::Label => ctx.is_project_member || ctx.is_manager(),
        EntityKind::Task => {
            owned_write_allowed(action, ctx, |actor| {
                ctx.task_author_ids
                    .as_ref()
                    .is_some_and(|authors| authors.contains(&actor))
            })
        }
        EntityKind::Comment => {
            owned_write_allowed(action, ctx, |actor| ctx.comment_author_id == Some(actor))
        }
    }
}

fn owned_write_allowed(
    action: Action,
    ctx: &PermissionContext,
    is_author: impl Fn(uuid::Uuid) -> bool,
) -> bool {
    if ctx.is_manager() {
        return true;
    }
    if !ctx.is_project_member {
        return false;
    }
    !action.is_ownership_gated() || is_author(ctx.actor)
}
