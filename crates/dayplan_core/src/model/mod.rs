//! Domain model for planned tasks and their list placement.
//!
//! # Responsibility
//! - Define the closed bucket set and its rank/terminal rules.
//! - Define the task record and the `(id, bucket, position)` order view.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Terminal-bucket tasks always carry `POSITION_SENTINEL`.

pub mod bucket;
pub mod task;
