//! Order engine operations.
//!
//! Every public operation takes the snapshot by value, normalizes it, applies
//! one intent, and reports the diff against the raw input. After
//! normalization the active items form a prefix of the vector in which
//! `items[i].position == i`; the private helpers below rely on that.
//! A snapshot repeating an id fails every operation with `DuplicateItem`.

use crate::model::bucket::{Bucket, POSITION_SENTINEL};
use crate::model::task::{OrderItem, TaskId};
use crate::order::changes::{Baseline, OrderOutcome};
use crate::order::error::{OrderError, OrderResult};

/// One mutating intent for [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOp {
    /// Insert a new item at the bottom of its declared bucket.
    Add(OrderItem),
    /// Remove an item and close its gap.
    Delete(TaskId),
    /// Relocate an item to the bottom of another bucket.
    Move { id: TaskId, bucket: Bucket },
    /// Shift an item by `diff` slots inside its own bucket.
    Reorder { id: TaskId, diff: i64 },
}

/// Dispatches one operation descriptor.
pub fn apply(snapshot: Vec<OrderItem>, op: OrderOp) -> OrderResult<OrderOutcome> {
    match op {
        OrderOp::Add(item) => add_to_bucket(snapshot, item.bucket, item),
        OrderOp::Delete(id) => delete_item(snapshot, id),
        OrderOp::Move { id, bucket } => move_to_bucket(snapshot, id, bucket),
        OrderOp::Reorder { id, diff } => change_sort_order(snapshot, id, diff),
    }
}

/// Restores the density and sentinel invariants on an arbitrary snapshot.
///
/// Active items are stable-sorted by `(rank, position)` and renumbered
/// `0..n-1`; terminal items follow in rank order, keeping their input order
/// within a bucket, and get `POSITION_SENTINEL`. Idempotent.
pub fn prepare_source(mut items: Vec<OrderItem>) -> Vec<OrderItem> {
    items.sort_by_key(|item| {
        let position = if item.bucket.is_terminal() {
            0
        } else {
            item.position
        };
        (item.bucket.rank(), position)
    });

    let mut next = 0_i64;
    for item in &mut items {
        if item.bucket.is_terminal() {
            item.position = POSITION_SENTINEL;
        } else {
            item.position = next;
            next += 1;
        }
    }
    items
}

/// Inserts `item` at the bottom of `bucket`.
///
/// Terminal targets are appended with the sentinel position.
///
/// # Errors
/// - `BucketMismatch` when `item.bucket != bucket`.
/// - `DuplicateItem` when the id is already present.
pub fn add_to_bucket(
    snapshot: Vec<OrderItem>,
    bucket: Bucket,
    item: OrderItem,
) -> OrderResult<OrderOutcome> {
    if item.bucket != bucket {
        return Err(OrderError::BucketMismatch {
            expected: bucket,
            actual: item.bucket,
        });
    }
    let baseline = Baseline::capture(&snapshot)?;
    let mut items = prepare_source(snapshot);
    if find_index(&items, item.id).is_some() {
        return Err(OrderError::DuplicateItem(item.id));
    }
    insert_at_bottom(&mut items, item);
    Ok(baseline.outcome(items, Some(item.id), None))
}

pub fn add_today(snapshot: Vec<OrderItem>, item: OrderItem) -> OrderResult<OrderOutcome> {
    add_to_bucket(snapshot, Bucket::Today, item)
}

pub fn add_tomorrow(snapshot: Vec<OrderItem>, item: OrderItem) -> OrderResult<OrderOutcome> {
    add_to_bucket(snapshot, Bucket::Tomorrow, item)
}

pub fn add_next_week(snapshot: Vec<OrderItem>, item: OrderItem) -> OrderResult<OrderOutcome> {
    add_to_bucket(snapshot, Bucket::NextWeek, item)
}

/// Appends an item tagged with a terminal bucket. No other position changes.
///
/// # Errors
/// - `UnsupportedBucket` when the item is tagged with an active bucket.
/// - `DuplicateItem` when the id is already present.
pub fn add_terminal(snapshot: Vec<OrderItem>, item: OrderItem) -> OrderResult<OrderOutcome> {
    if item.bucket.is_active() {
        return Err(OrderError::UnsupportedBucket(item.bucket));
    }
    add_to_bucket(snapshot, item.bucket, item)
}

pub fn add_completed(snapshot: Vec<OrderItem>, item: OrderItem) -> OrderResult<OrderOutcome> {
    add_to_bucket(snapshot, Bucket::Completed, item)
}

/// Removes one item; active removals close the gap behind it.
///
/// # Errors
/// - `ItemNotFound` when `id` is absent.
pub fn delete_item(snapshot: Vec<OrderItem>, id: TaskId) -> OrderResult<OrderOutcome> {
    let baseline = Baseline::capture(&snapshot)?;
    let mut items = prepare_source(snapshot);
    let index = find_index(&items, id).ok_or(OrderError::ItemNotFound(id))?;
    detach(&mut items, index);
    Ok(baseline.outcome(items, None, Some(id)))
}

/// Moves one item to the bottom of `bucket` (delete, then bottom insert).
///
/// # Errors
/// - `ItemNotFound` when `id` is absent.
pub fn move_to_bucket(
    snapshot: Vec<OrderItem>,
    id: TaskId,
    bucket: Bucket,
) -> OrderResult<OrderOutcome> {
    let baseline = Baseline::capture(&snapshot)?;
    let mut items = prepare_source(snapshot);
    let index = find_index(&items, id).ok_or(OrderError::ItemNotFound(id))?;
    let mut item = detach(&mut items, index);
    item.bucket = bucket;
    insert_at_bottom(&mut items, item);
    Ok(baseline.outcome(items, None, None))
}

/// Shifts one active item by `diff` slots inside its own bucket.
///
/// Items between the old and new slot move one step toward the vacated
/// slot; everything else keeps its position.
///
/// # Errors
/// - `ItemNotFound` when `id` is absent.
/// - `UnsupportedBucket` when the item is in a terminal bucket.
/// - `EmptyBucket` when the bucket bounds cannot be computed.
/// - `OutOfRange` when `position + diff` leaves the bucket.
pub fn change_sort_order(
    snapshot: Vec<OrderItem>,
    id: TaskId,
    diff: i64,
) -> OrderResult<OrderOutcome> {
    let baseline = Baseline::capture(&snapshot)?;
    let mut items = prepare_source(snapshot);
    let index = find_index(&items, id).ok_or(OrderError::ItemNotFound(id))?;
    let bucket = items[index].bucket;
    if bucket.is_terminal() {
        return Err(OrderError::UnsupportedBucket(bucket));
    }

    let (first, last) = bucket_bounds(&items, bucket).ok_or(OrderError::EmptyBucket(bucket))?;
    let old = items[index].position;
    let target = old
        .checked_add(diff)
        .filter(|target| (first..=last).contains(target))
        .ok_or(OrderError::OutOfRange {
            id,
            position: old,
            diff,
            first,
            last,
        })?;

    if target != old {
        let mut moved = items.remove(index);
        for other in items.iter_mut().filter(|other| other.bucket.is_active()) {
            if target > old && other.position > old && other.position <= target {
                other.position -= 1;
            } else if target < old && other.position >= target && other.position < old {
                other.position += 1;
            }
        }
        moved.position = target;
        items.insert(slot(target), moved);
    }
    Ok(baseline.outcome(items, None, None))
}

fn find_index(items: &[OrderItem], id: TaskId) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}

/// First and last active position held by `bucket`.
fn bucket_bounds(items: &[OrderItem], bucket: Bucket) -> Option<(i64, i64)> {
    let mut members = items.iter().filter(|item| item.bucket == bucket);
    let first = members.next()?.position;
    let last = members.last().map_or(first, |item| item.position);
    Some((first, last))
}

fn insert_at_bottom(items: &mut Vec<OrderItem>, mut item: OrderItem) {
    if item.bucket.is_terminal() {
        item.position = POSITION_SENTINEL;
        let index = items
            .iter()
            .take_while(|other| other.bucket.rank() <= item.bucket.rank())
            .count();
        items.insert(index, item);
        return;
    }

    // Bottom of the target bucket, or after the nearest preceding active
    // bucket with members, or the top of the list.
    let at = items
        .iter()
        .filter(|other| other.bucket.is_active() && other.bucket.rank() <= item.bucket.rank())
        .count() as i64;
    for other in items
        .iter_mut()
        .filter(|other| other.bucket.is_active() && other.position >= at)
    {
        other.position += 1;
    }
    item.position = at;
    items.insert(slot(at), item);
}

fn detach(items: &mut Vec<OrderItem>, index: usize) -> OrderItem {
    let removed = items.remove(index);
    if removed.bucket.is_active() {
        for other in items
            .iter_mut()
            .filter(|other| other.bucket.is_active() && other.position > removed.position)
        {
            other.position -= 1;
        }
    }
    removed
}

// Active positions are non-negative vector indices after normalization.
fn slot(position: i64) -> usize {
    usize::try_from(position).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{bucket_bounds, prepare_source};
    use crate::model::bucket::{Bucket, POSITION_SENTINEL};
    use crate::model::task::OrderItem;
    use uuid::Uuid;

    #[test]
    fn prepare_source_renumbers_and_orders_by_rank() {
        let next_week = OrderItem::new(Uuid::new_v4(), Bucket::NextWeek, 0);
        let done = OrderItem::new(Uuid::new_v4(), Bucket::Completed, 2);
        let today = OrderItem::new(Uuid::new_v4(), Bucket::Today, 7);

        let items = prepare_source(vec![next_week, done, today]);

        assert_eq!(items[0].id, today.id);
        assert_eq!(items[0].position, 0);
        assert_eq!(items[1].id, next_week.id);
        assert_eq!(items[1].position, 1);
        assert_eq!(items[2].id, done.id);
        assert_eq!(items[2].position, POSITION_SENTINEL);
    }

    #[test]
    fn prepare_source_keeps_input_order_for_equal_positions() {
        let first = OrderItem::new(Uuid::new_v4(), Bucket::Today, 3);
        let second = OrderItem::new(Uuid::new_v4(), Bucket::Today, 3);

        let items = prepare_source(vec![first, second]);

        assert_eq!(items[0].id, first.id);
        assert_eq!(items[1].id, second.id);
    }

    #[test]
    fn prepare_source_keeps_terminal_input_order() {
        let late = OrderItem::new(Uuid::new_v4(), Bucket::Completed, 0);
        let early = OrderItem::new(Uuid::new_v4(), Bucket::Completed, POSITION_SENTINEL);

        let items = prepare_source(vec![early, late]);

        assert_eq!(items[0].id, early.id);
        assert_eq!(items[1].id, late.id);
        assert!(items.iter().all(|item| item.position == POSITION_SENTINEL));
    }

    #[test]
    fn bucket_bounds_spans_members_only() {
        let items = prepare_source(vec![
            OrderItem::new(Uuid::new_v4(), Bucket::Today, 0),
            OrderItem::new(Uuid::new_v4(), Bucket::Tomorrow, 1),
            OrderItem::new(Uuid::new_v4(), Bucket::Tomorrow, 2),
            OrderItem::new(Uuid::new_v4(), Bucket::NextWeek, 3),
        ]);

        assert_eq!(bucket_bounds(&items, Bucket::Tomorrow), Some((1, 2)));
        assert_eq!(bucket_bounds(&items, Bucket::Today), Some((0, 0)));
        assert_eq!(bucket_bounds(&items, Bucket::Scheduled), None);
    }
}
