//! Guard layer: resolve, evaluate, deny before writing.

use super::context::{resolve_context, EntityRef, PermissionContext, RelationshipSource};
use super::policy::{can_do, Action, EntityKind};
use crate::error::{CoreError, CoreResult, FORBIDDEN_CODE};
use crate::model::user::UserId;
use crate::repo::RepoResult;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// Structured refusal handed back to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub code: &'static str,
    pub message: String,
}

impl Denial {
    pub const GENERIC_MESSAGE: &'static str = "you do not have permission to perform this action";

    /// Builds the denial for `action` on `entity`.
    ///
    /// The message depends only on what was asked, never on why it failed.
    pub fn new(entity: EntityKind, action: Action) -> Self {
        Self {
            code: FORBIDDEN_CODE,
            message: format!("you do not have permission to {action} this {entity}"),
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Why a denial happened. Logged, never returned.
fn denial_reason(entity: EntityKind, ctx: &PermissionContext) -> &'static str {
    if !ctx.resolved {
        return "not_found";
    }
    let member = ctx.is_project_member || ctx.is_manager();
    match entity {
        EntityKind::Task | EntityKind::Comment if member => "not_author",
        _ => "insufficient_role",
    }
}

pub struct Guard<S> {
    source: S,
}

impl<S: RelationshipSource> Guard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns `None` when `actor` may perform `action`, a [`Denial`]
    /// otherwise. Performs no writes.
    pub fn check(
        &self,
        entity: EntityKind,
        action: Action,
        target: EntityRef,
        actor: UserId,
    ) -> RepoResult<Option<Denial>> {
        let ctx = resolve_context(&self.source, actor, target)?;
        if can_do(entity, action, &ctx) {
            debug!(
                "event=guard_check module=auth status=ok entity={entity} action={action} target={target} actor={actor}"
            );
            return Ok(None);
        }

        warn!(
            "event=guard_check module=auth status=denied entity={entity} action={action} target={target} actor={actor} reason={}",
            denial_reason(entity, &ctx)
        );
        Ok(Some(Denial::new(entity, action)))
    }

    /// Like [`Guard::check`] but folds the denial into [`CoreError::Forbidden`].
    pub fn require(
        &self,
        entity: EntityKind,
        action: Action,
        target: EntityRef,
        actor: UserId,
    ) -> CoreResult<()> {
        match self.check(entity, action, target, actor)? {
            None => Ok(()),
            Some(denial) => Err(CoreError::Forbidden(denial)),
        }
    }
}
