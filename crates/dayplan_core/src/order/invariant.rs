//! Collection invariant checker.
//!
//! Used by callers to detect externally mutated snapshots before repairing
//! them through normalization.

use crate::model::bucket::POSITION_SENTINEL;
use crate::model::task::{OrderItem, TaskId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First invariant violation found in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Same id appears more than once.
    DuplicateId(TaskId),
    /// Active numbering is not exactly `0..n-1` in `(rank, position)` order.
    PositionGap {
        id: TaskId,
        expected: i64,
        found: i64,
    },
    /// Terminal item without the sentinel position.
    MissingSentinel { id: TaskId, found: i64 },
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate item id: {id}"),
            Self::PositionGap {
                id,
                expected,
                found,
            } => write!(f, "item {id} has position {found}, expected {expected}"),
            Self::MissingSentinel { id, found } => {
                write!(f, "terminal item {id} has position {found}, expected sentinel")
            }
        }
    }
}

impl Error for InvariantViolation {}

/// Verifies the density and sentinel invariants on any snapshot order.
pub fn check_invariants(items: &[OrderItem]) -> Result<(), InvariantViolation> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(InvariantViolation::DuplicateId(item.id));
        }
        if item.bucket.is_terminal() && item.position != POSITION_SENTINEL {
            return Err(InvariantViolation::MissingSentinel {
                id: item.id,
                found: item.position,
            });
        }
    }

    let mut active: Vec<&OrderItem> = items.iter().filter(|item| item.bucket.is_active()).collect();
    active.sort_by_key(|item| (item.bucket.rank(), item.position));
    for (expected, item) in (0_i64..).zip(active) {
        if item.position != expected {
            return Err(InvariantViolation::PositionGap {
                id: item.id,
                expected,
                found: item.position,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_invariants, InvariantViolation};
    use crate::model::bucket::{Bucket, POSITION_SENTINEL};
    use crate::model::task::OrderItem;
    use uuid::Uuid;

    #[test]
    fn accepts_dense_snapshot_in_any_order() {
        let items = vec![
            OrderItem::new(Uuid::new_v4(), Bucket::Completed, POSITION_SENTINEL),
            OrderItem::new(Uuid::new_v4(), Bucket::Tomorrow, 1),
            OrderItem::new(Uuid::new_v4(), Bucket::Today, 0),
        ];
        assert_eq!(check_invariants(&items), Ok(()));
    }

    #[test]
    fn rejects_rank_inversion() {
        let today = Uuid::new_v4();
        let items = vec![
            OrderItem::new(today, Bucket::Today, 1),
            OrderItem::new(Uuid::new_v4(), Bucket::Tomorrow, 0),
        ];
        assert_eq!(
            check_invariants(&items),
            Err(InvariantViolation::PositionGap {
                id: today,
                expected: 0,
                found: 1,
            })
        );
    }

    #[test]
    fn rejects_terminal_without_sentinel() {
        let id = Uuid::new_v4();
        let items = vec![OrderItem::new(id, Bucket::Completed, 3)];
        assert_eq!(
            check_invariants(&items),
            Err(InvariantViolation::MissingSentinel { id, found: 3 })
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let id = Uuid::new_v4();
        let items = vec![
            OrderItem::new(id, Bucket::Today, 0),
            OrderItem::new(id, Bucket::Today, 1),
        ];
        assert_eq!(
            check_invariants(&items),
            Err(InvariantViolation::DuplicateId(id))
        );
    }
}
