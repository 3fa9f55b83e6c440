//! Guarded use-case entry points.
//!
//! # Responsibility
//! - Pair every mutation with its guard check: resolve, evaluate, then run
//!   the engine only when allowed.
//! - Serve scoped read paths, including the activity feed.
//!
//! # Invariants
//! - A denied call performs no writes.
//! - Missing targets surface as the same forbidden shape as denials.

pub mod board_service;
pub mod feed_service;

pub use board_service::BoardService;
pub use feed_service::ActivityFeed;
