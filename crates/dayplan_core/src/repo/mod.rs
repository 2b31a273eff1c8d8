//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Order mutations load, transform and persist inside one transaction.
//! - Repository APIs return semantic errors (`TaskNotFound`, `Order`) in
//!   addition to DB transport errors.

pub mod task_repo;
