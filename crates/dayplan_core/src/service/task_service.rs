//! Planning list use-case service.
//!
//! # Responsibility
//! - Validate task input above the repository layer.
//! - Provide add, delete, move, complete, reorder and list operations.
//! - Emit metadata-only events for every list mutation.
//!
//! # Invariants
//! - Titles are trimmed and never blank.
//! - Every mutation goes through one order engine operation.

use crate::model::bucket::Bucket;
use crate::model::task::{OrderItem, Task, TaskId};
use crate::order::{OrderError, OrderOp, OrderOutcome};
use crate::repo::task_repo::{TaskRepoError, TaskRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from planning list service operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Order engine rejected the operation.
    Order(OrderError),
    /// Repository-level failure.
    Repo(TaskRepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "task title must not be blank"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Order(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Order(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskRepoError> for TaskServiceError {
    fn from(value: TaskRepoError) -> Self {
        match value {
            TaskRepoError::Order(OrderError::ItemNotFound(id)) => Self::TaskNotFound(id),
            TaskRepoError::Order(err) => Self::Order(err),
            TaskRepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl TaskServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidTitle => "invalid_title",
            Self::TaskNotFound(_) => "task_not_found",
            Self::Order(OrderError::BucketMismatch { .. }) => "bucket_mismatch",
            Self::Order(OrderError::ItemNotFound(_)) => "task_not_found",
            Self::Order(OrderError::OutOfRange { .. }) => "out_of_range",
            Self::Order(OrderError::UnsupportedBucket(_)) => "unsupported_bucket",
            Self::Order(OrderError::EmptyBucket(_)) => "empty_bucket",
            Self::Order(OrderError::DuplicateItem(_)) => "duplicate_task",
            Self::Repo(TaskRepoError::Db(err)) => err.code(),
            Self::Repo(_) => "repo_error",
        }
    }
}

/// Planning list service facade.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one task at the bottom of `bucket`.
    pub fn add_task(
        &self,
        title: impl Into<String>,
        bucket: Bucket,
    ) -> Result<Task, TaskServiceError> {
        let title = normalize_title(title.into())?;
        let task = Task::new(title, bucket);
        self.run(
            "task_add",
            OrderOp::Add(OrderItem::pending(task.uuid, bucket)),
            Some(&task),
        )?;
        self.require_task(task.uuid)
    }

    /// Deletes one task and closes its gap.
    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.run("task_delete", OrderOp::Delete(id), None)?;
        Ok(())
    }

    /// Moves one task to the bottom of `bucket`.
    pub fn move_task(&self, id: TaskId, bucket: Bucket) -> Result<Task, TaskServiceError> {
        self.run("task_move", OrderOp::Move { id, bucket }, None)?;
        self.require_task(id)
    }

    /// Moves one task into `Bucket::Completed`.
    pub fn complete_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.move_task(id, Bucket::Completed)
    }

    /// Shifts one task by `diff` slots inside its bucket.
    pub fn reorder_task(&self, id: TaskId, diff: i64) -> Result<Task, TaskServiceError> {
        self.run("task_reorder", OrderOp::Reorder { id, diff }, None)?;
        self.require_task(id)
    }

    /// Loads one task by id.
    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        self.repo.get_task(id).map_err(Into::into)
    }

    /// Lists one bucket in display order.
    pub fn list_bucket(&self, bucket: Bucket) -> Result<Vec<Task>, TaskServiceError> {
        self.repo.list_tasks(Some(bucket)).map_err(Into::into)
    }

    /// Lists every task in display order.
    pub fn list_all(&self) -> Result<Vec<Task>, TaskServiceError> {
        self.repo.list_tasks(None).map_err(Into::into)
    }

    fn run(
        &self,
        event: &'static str,
        op: OrderOp,
        new_task: Option<&Task>,
    ) -> Result<OrderOutcome, TaskServiceError> {
        match self.repo.apply(op, new_task) {
            Ok(outcome) => {
                info!(
                    "event={event} module=service status=ok changed_rows={}",
                    outcome.changes.len()
                );
                Ok(outcome)
            }
            Err(err) => {
                let err = TaskServiceError::from(err);
                warn!(
                    "event={event} module=service status=error error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    fn require_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}

fn normalize_title(value: String) -> Result<String, TaskServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskServiceError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}
