//! Task record and its order-engine projection.
//!
//! # Responsibility
//! - Define the persisted task shape.
//! - Provide the `(id, bucket, position)` view consumed by the order engine.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - `bucket` and `position` are only changed through order engine outcomes.

use crate::model::bucket::{Bucket, POSITION_SENTINEL};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Bucket + position pair describing where an item sits in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub bucket: Bucket,
    pub position: i64,
}

/// Item as seen by the order engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: TaskId,
    pub bucket: Bucket,
    pub position: i64,
}

impl OrderItem {
    /// Creates an item with an explicit position.
    pub fn new(id: TaskId, bucket: Bucket, position: i64) -> Self {
        Self {
            id,
            bucket,
            position,
        }
    }

    /// Creates an item about to be inserted; position is assigned by the engine.
    pub fn pending(id: TaskId, bucket: Bucket) -> Self {
        let position = if bucket.is_terminal() {
            POSITION_SENTINEL
        } else {
            0
        };
        Self::new(id, bucket, position)
    }

    pub fn placement(&self) -> Placement {
        Placement {
            bucket: self.bucket,
            position: self.position,
        }
    }
}

/// Canonical persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID.
    pub uuid: TaskId,
    /// User-facing title, trimmed and non-empty.
    pub title: String,
    pub bucket: Bucket,
    /// Dense active position, or `POSITION_SENTINEL` for terminal buckets.
    pub position: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Task {
    /// Creates a task with a generated ID. Timestamps are filled by storage.
    pub fn new(title: impl Into<String>, bucket: Bucket) -> Self {
        let item = OrderItem::pending(Uuid::new_v4(), bucket);
        Self {
            uuid: item.id,
            title: title.into(),
            bucket,
            position: item.position,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Projects this task into the order engine view.
    pub fn order_item(&self) -> OrderItem {
        OrderItem::new(self.uuid, self.bucket, self.position)
    }

    /// Returns whether this task sits in a terminal bucket.
    pub fn is_terminal(&self) -> bool {
        self.bucket.is_terminal()
    }
}
