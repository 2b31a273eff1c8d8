use dayplan_core::order::{apply, prepare_source};
use dayplan_core::{check_invariants, Bucket, OrderError, OrderItem, OrderOp, TaskId};
use proptest::prelude::*;
use proptest::test_runner::Config;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Step {
    Add(usize),
    Delete(usize),
    Move(usize, usize),
    Reorder(usize, i64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0usize..Bucket::ALL.len()).prop_map(Step::Add),
        1 => any::<usize>().prop_map(Step::Delete),
        2 => (any::<usize>(), 0usize..Bucket::ALL.len()).prop_map(|(pick, bucket)| Step::Move(pick, bucket)),
        3 => (any::<usize>(), -4i64..=4).prop_map(|(pick, diff)| Step::Reorder(pick, diff)),
    ]
}

fn item_strategy() -> impl Strategy<Value = OrderItem> {
    (0usize..Bucket::ALL.len(), -20i64..20)
        .prop_map(|(bucket, position)| OrderItem::new(Uuid::new_v4(), Bucket::ALL[bucket], position))
}

fn pick(items: &[OrderItem], index: usize) -> TaskId {
    if items.is_empty() {
        Uuid::new_v4()
    } else {
        items[index % items.len()].id
    }
}

fn ids(items: &[OrderItem]) -> BTreeSet<TaskId> {
    items.iter().map(|item| item.id).collect()
}

fn positions(items: &[OrderItem]) -> HashMap<TaskId, i64> {
    items.iter().map(|item| (item.id, item.position)).collect()
}

proptest! {
    #![proptest_config(Config {
        cases: 200,
        max_shrink_iters: 1000,
        ..Config::default()
    })]

    /// Any operation sequence keeps the list dense and conserves identities.
    #[test]
    fn operation_sequences_preserve_invariants(steps in prop::collection::vec(step_strategy(), 1..60)) {
        let mut items: Vec<OrderItem> = Vec::new();

        for step in steps {
            let before = ids(&items);
            let (op, expected) = match step {
                Step::Add(bucket) => {
                    let new = OrderItem::pending(Uuid::new_v4(), Bucket::ALL[bucket]);
                    let mut expected = before.clone();
                    expected.insert(new.id);
                    (OrderOp::Add(new), expected)
                }
                Step::Delete(index) => {
                    let id = pick(&items, index);
                    let mut expected = before.clone();
                    expected.remove(&id);
                    (OrderOp::Delete(id), expected)
                }
                Step::Move(index, bucket) => (
                    OrderOp::Move { id: pick(&items, index), bucket: Bucket::ALL[bucket] },
                    before.clone(),
                ),
                Step::Reorder(index, diff) => (
                    OrderOp::Reorder { id: pick(&items, index), diff },
                    before.clone(),
                ),
            };

            match apply(items.clone(), op) {
                Ok(outcome) => {
                    prop_assert_eq!(check_invariants(&outcome.items), Ok(()));
                    prop_assert_eq!(ids(&outcome.items), expected);
                    if let OrderOp::Add(new) = op {
                        let bottom = items
                            .iter()
                            .filter(|item| item.bucket.is_active() && item.bucket.rank() <= new.bucket.rank())
                            .count() as i64;
                        let placed = outcome.item(new.id).map(|item| item.position);
                        if new.bucket.is_active() {
                            prop_assert_eq!(placed, Some(bottom));
                        }
                    }
                    items = outcome.items;
                }
                Err(OrderError::ItemNotFound(_)) => prop_assert!(items.is_empty()),
                Err(OrderError::OutOfRange { .. }) | Err(OrderError::UnsupportedBucket(_)) => {
                    prop_assert!(
                        matches!(op, OrderOp::Reorder { .. }),
                        "unexpected error for {:?}",
                        op
                    );
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }

    /// Reorder shifts only the span between the old and new slot, by one.
    #[test]
    fn reorder_is_local(
        buckets in prop::collection::vec(0usize..Bucket::ACTIVE.len(), 1..20),
        index in any::<usize>(),
        diff in -6i64..=6,
    ) {
        let items = prepare_source(
            buckets
                .iter()
                .map(|bucket| OrderItem::pending(Uuid::new_v4(), Bucket::ACTIVE[*bucket]))
                .collect(),
        );
        let target = items[index % items.len()];
        let before = positions(&items);

        if let Ok(outcome) = apply(items.clone(), OrderOp::Reorder { id: target.id, diff }) {
            let old = target.position;
            let new = old + diff;
            prop_assert_eq!(outcome.item(target.id).map(|item| item.position), Some(new));
            for item in outcome.items.iter().filter(|item| item.id != target.id) {
                let was = before[&item.id];
                let expected = if diff > 0 && was > old && was <= new {
                    was - 1
                } else if diff < 0 && was >= new && was < old {
                    was + 1
                } else {
                    was
                };
                prop_assert_eq!(item.position, expected);
            }
        }
    }

    /// Normalizing twice equals normalizing once.
    #[test]
    fn prepare_source_is_idempotent(items in prop::collection::vec(item_strategy(), 0..30)) {
        let once = prepare_source(items);
        let twice = prepare_source(once.clone());
        prop_assert_eq!(check_invariants(&once), Ok(()));
        prop_assert_eq!(once, twice);
    }
}
