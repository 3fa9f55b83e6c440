//! Pure helpers for 1-based contiguous sibling positions.
//!
//! # Invariants
//! - A sibling set of size N occupies exactly the positions `1..=N`.
//! - Batches are checked whole; a bad entry rejects all of them.

use crate::error::{CoreError, CoreResult};
use crate::model::PositionAssignment;
use std::collections::HashSet;
use uuid::Uuid;

/// Checks a bulk reorder batch before any transaction opens.
///
/// Rejects empty batches, repeated ids, repeated positions and position sets
/// other than `1..=N`.
pub fn validate_reorder_batch(batch: &[PositionAssignment]) -> CoreResult<()> {
    if batch.is_empty() {
        return Err(CoreError::validation("reorder batch must not be empty"));
    }

    let mut ids = HashSet::with_capacity(batch.len());
    let mut positions = HashSet::with_capacity(batch.len());
    for assignment in batch {
        if !ids.insert(assignment.id) {
            return Err(CoreError::validation(format!(
                "reorder batch names {} more than once",
                assignment.id
            )));
        }
        if !positions.insert(assignment.position) {
            return Err(CoreError::validation(format!(
                "reorder batch assigns position {} more than once",
                assignment.position
            )));
        }
    }

    if !is_contiguous(batch.iter().map(|assignment| assignment.position)) {
        return Err(CoreError::validation(format!(
            "reorder positions must be exactly 1..={}",
            batch.len()
        )));
    }
    Ok(())
}

/// Checks that a batch names every current sibling and nothing else.
pub fn ensure_covers_siblings(batch: &[PositionAssignment], siblings: &[Uuid]) -> CoreResult<()> {
    let requested: HashSet<Uuid> = batch.iter().map(|assignment| assignment.id).collect();
    let current: HashSet<Uuid> = siblings.iter().copied().collect();
    if requested != current {
        return Err(CoreError::validation(format!(
            "reorder batch must name all {} siblings exactly once",
            current.len()
        )));
    }
    Ok(())
}

/// Returns whether `positions` is a permutation of `1..=N`.
pub fn is_contiguous(positions: impl IntoIterator<Item = i64>) -> bool {
    let mut sorted: Vec<i64> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .zip(1_i64..)
        .all(|(position, expected)| *position == expected)
}

/// Resolves where an item lands among `sibling_count` other items.
///
/// `None` appends. Requests past the end are clamped to append; positions
/// below 1 are rejected.
pub fn insert_position(requested: Option<i64>, sibling_count: usize) -> CoreResult<i64> {
    let append_at = i64::try_from(sibling_count)
        .map_err(|_| CoreError::validation("too many siblings"))?
        + 1;
    match requested {
        None => Ok(append_at),
        Some(position) if position < 1 => Err(CoreError::validation(format!(
            "position must be at least 1, got {position}"
        ))),
        Some(position) => Ok(position.min(append_at)),
    }
}

/// Inserts `id` into `others` so that it ends up at 1-based `position`.
pub fn place_at(others: &[Uuid], id: Uuid, position: i64) -> Vec<Uuid> {
    let mut ordered = others.to_vec();
    let index = usize::try_from(position.saturating_sub(1))
        .unwrap_or(0)
        .min(ordered.len());
    ordered.insert(index, id);
    ordered
}

#[cfg(test)]
mod tests {
    use super::{
        ensure_covers_siblings, insert_position, is_contiguous, place_at, validate_reorder_batch,
    };
    use crate::error::CoreError;
    use crate::model::PositionAssignment;
    use uuid::Uuid;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn accepts_a_full_permutation() {
        let ids = ids(3);
        let batch = vec![
            PositionAssignment::new(ids[0], 3),
            PositionAssignment::new(ids[1], 1),
            PositionAssignment::new(ids[2], 2),
        ];
        validate_reorder_batch(&batch).expect("valid batch");
        ensure_covers_siblings(&batch, &ids).expect("covers siblings");
    }

    #[test]
    fn rejects_duplicate_positions() {
        let ids = ids(2);
        let batch = vec![
            PositionAssignment::new(ids[0], 1),
            PositionAssignment::new(ids[1], 1),
        ];
        let err = validate_reorder_batch(&batch).expect_err("duplicate position");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let id = Uuid::new_v4();
        let batch = vec![PositionAssignment::new(id, 1), PositionAssignment::new(id, 2)];
        assert!(validate_reorder_batch(&batch).is_err());
    }

    #[test]
    fn rejects_gaps_and_empty_batches() {
        let ids = ids(2);
        let gapped = vec![
            PositionAssignment::new(ids[0], 1),
            PositionAssignment::new(ids[1], 3),
        ];
        assert!(validate_reorder_batch(&gapped).is_err());
        assert!(validate_reorder_batch(&[]).is_err());
    }

    #[test]
    fn rejects_partial_or_foreign_sibling_sets() {
        let siblings = ids(3);
        let partial = vec![
            PositionAssignment::new(siblings[0], 1),
            PositionAssignment::new(siblings[1], 2),
        ];
        assert!(ensure_covers_siblings(&partial, &siblings).is_err());

        let foreign = vec![
            PositionAssignment::new(siblings[0], 1),
            PositionAssignment::new(siblings[1], 2),
            PositionAssignment::new(Uuid::new_v4(), 3),
        ];
        assert!(ensure_covers_siblings(&foreign, &siblings).is_err());
    }

    #[test]
    fn contiguity_check() {
        assert!(is_contiguous(Vec::new()));
        assert!(is_contiguous([2, 1, 3]));
        assert!(!is_contiguous([1, 3]));
        assert!(!is_contiguous([1, 1, 2]));
        assert!(!is_contiguous([0, 1]));
    }

    #[test]
    fn insert_position_appends_and_clamps() {
        assert_eq!(insert_position(None, 3).expect("append"), 4);
        assert_eq!(insert_position(Some(2), 3).expect("middle"), 2);
        assert_eq!(insert_position(Some(99), 3).expect("clamped"), 4);
        assert_eq!(insert_position(Some(1), 0).expect("first"), 1);
        assert!(insert_position(Some(0), 3).is_err());
    }

    #[test]
    fn place_at_inserts_at_one_based_position() {
        let others = ids(3);
        let moved = Uuid::new_v4();
        assert_eq!(place_at(&others, moved, 1)[0], moved);
        assert_eq!(place_at(&others, moved, 2)[1], moved);
        assert_eq!(place_at(&others, moved, 4)[3], moved);
        assert_eq!(place_at(&others, moved, 10).len(), 4);
    }
}
