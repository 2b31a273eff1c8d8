//! Change tracking between an input snapshot and an engine result.

use crate::model::task::{OrderItem, Placement, TaskId};
use crate::order::error::{OrderError, OrderResult};
use std::collections::{BTreeMap, HashMap};

/// Minimal write-set produced by one engine call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Item introduced by an add operation, with its assigned placement.
    pub created: Option<OrderItem>,
    /// Item removed by a delete operation.
    pub removed: Option<TaskId>,
    /// Pre-existing items whose bucket or position differs from the input.
    pub updated: BTreeMap<TaskId, Placement>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.created.is_none() && self.removed.is_none() && self.updated.is_empty()
    }

    /// Number of rows a collaborator must write.
    pub fn len(&self) -> usize {
        usize::from(self.created.is_some()) + usize::from(self.removed.is_some()) + self.updated.len()
    }
}

/// Successful engine result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOutcome {
    /// Full normalized snapshot: active items by position, then terminal items.
    pub items: Vec<OrderItem>,
    pub changes: ChangeSet,
}

impl OrderOutcome {
    /// Looks up one item of the resulting snapshot.
    pub fn item(&self, id: TaskId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Placements captured from the raw input, before normalization.
pub(crate) struct Baseline(HashMap<TaskId, Placement>);

impl Baseline {
    /// Fails with `DuplicateItem` when an id appears twice in the input.
    pub(crate) fn capture(items: &[OrderItem]) -> OrderResult<Self> {
        let mut placements = HashMap::with_capacity(items.len());
        for item in items {
            if placements.insert(item.id, item.placement()).is_some() {
                return Err(OrderError::DuplicateItem(item.id));
            }
        }
        Ok(Self(placements))
    }

    pub(crate) fn outcome(
        &self,
        items: Vec<OrderItem>,
        created: Option<TaskId>,
        removed: Option<TaskId>,
    ) -> OrderOutcome {
        let mut changes = ChangeSet {
            removed,
            ..ChangeSet::default()
        };
        for item in &items {
            if Some(item.id) == created {
                changes.created = Some(*item);
                continue;
            }
            let placement = item.placement();
            if self.0.get(&item.id) != Some(&placement) {
                changes.updated.insert(item.id, placement);
            }
        }
        OrderOutcome { items, changes }
    }
}
