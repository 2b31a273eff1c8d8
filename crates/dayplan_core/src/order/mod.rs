//! Bucketed order-maintenance engine.
//!
//! # Responsibility
//! - Keep planning items partitioned into buckets and densely numbered.
//! - Apply one mutating intent per call and report exactly what changed.
//!
//! # Invariants
//! - Active items sorted by `(rank, position)` carry positions `0..n-1`.
//! - Terminal items carry `POSITION_SENTINEL`.
//! - Untouched items keep their relative order inside a bucket.
//! - The engine is pure: no I/O, no logging, no shared state.

mod changes;
mod engine;
mod error;
mod invariant;

pub use changes::{ChangeSet, OrderOutcome};
pub use engine::{
    add_completed, add_next_week, add_terminal, add_to_bucket, add_today, add_tomorrow, apply,
    change_sort_order, delete_item, move_to_bucket, prepare_source, OrderOp,
};
pub use error::{OrderError, OrderResult};
pub use invariant::{check_invariants, InvariantViolation};
