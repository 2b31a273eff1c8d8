//! Core domain logic for dayplan.
//! This crate is the single source of truth for planning list invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod order;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LogConfig};
pub use model::bucket::{Bucket, POSITION_SENTINEL};
pub use model::task::{OrderItem, Placement, Task, TaskId};
pub use order::{
    check_invariants, prepare_source, ChangeSet, InvariantViolation, OrderError, OrderOp,
    OrderOutcome, OrderResult,
};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepoError, TaskRepoResult, TaskRepository};
pub use service::task_service::{TaskService, TaskServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
