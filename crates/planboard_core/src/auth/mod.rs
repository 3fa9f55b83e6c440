//! Authorization: context resolution, policy evaluation and guarding.
//!
//! # Responsibility
//! - Resolve what an actor is to an entity by walking its parent chain.
//! - Decide allow/deny from a fixed, enumerable decision table.
//! - Short-circuit mutations with a uniform denial before any write.
//!
//! # Invariants
//! - Nothing in this module writes to storage.
//! - A missing entity and a denied action are indistinguishable outside the
//!   guard's log events.

pub mod context;
pub mod guard;
pub mod policy;

pub use context::{
    resolve_context, EntityRef, PermissionContext, RelationshipSource, SqliteRelationships,
};
pub use guard::{Denial, Guard};
pub use policy::{can_do, Action, EntityKind};
