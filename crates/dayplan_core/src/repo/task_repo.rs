//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks and their `(bucket, position)` placement.
//! - Run order engine operations against a consistent snapshot.
//!
//! # Invariants
//! - Snapshot load, engine call and write-back share one IMMEDIATE transaction.
//! - Only rows reported in the engine change set are written.
//! - A snapshot that violates the order invariants is logged with
//!   `status=invariant_violation` and repaired by the same write-back.
//! - Listing is deterministic: bucket rank, `position ASC`, then
//!   `updated_at DESC, task_uuid ASC` for terminal buckets.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::bucket::Bucket;
use crate::model::task::{OrderItem, Task, TaskId};
use crate::order::{self, check_invariants, ChangeSet, OrderError, OrderOp, OrderOutcome};
use log::warn;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    title,
    bucket,
    position,
    created_at,
    updated_at
FROM tasks";

const TASK_ORDER_SQL: &str = "ORDER BY
    CASE bucket
        WHEN 'today' THEN 0
        WHEN 'tomorrow' THEN 1
        WHEN 'next_week' THEN 2
        WHEN 'scheduled' THEN 3
        ELSE 4
    END ASC,
    position ASC,
    updated_at DESC,
    task_uuid ASC";

/// Result type used by task repository operations.
pub type TaskRepoResult<T> = Result<T, TaskRepoError>;

/// Errors from task repository operations.
#[derive(Debug)]
pub enum TaskRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Order engine rejected the requested operation.
    Order(OrderError),
    /// Row targeted by a write-back disappeared.
    TaskNotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid task.
    InvalidData(String),
}

impl Display for TaskRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Order(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for TaskRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Order(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for TaskRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TaskRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<OrderError> for TaskRepoError {
    fn from(value: OrderError) -> Self {
        Self::Order(value)
    }
}

/// Repository interface for planning-list persistence.
pub trait TaskRepository {
    /// Loads every task as an order engine item.
    fn load_snapshot(&self) -> TaskRepoResult<Vec<OrderItem>>;
    /// Loads one task by id.
    fn get_task(&self, id: TaskId) -> TaskRepoResult<Option<Task>>;
    /// Lists tasks, optionally restricted to one bucket.
    fn list_tasks(&self, bucket: Option<Bucket>) -> TaskRepoResult<Vec<Task>>;
    /// Runs one order operation and persists its change set atomically.
    ///
    /// `new_task` carries the title for `OrderOp::Add`; its placement is taken
    /// from the engine outcome.
    fn apply(&self, op: OrderOp, new_task: Option<&Task>) -> TaskRepoResult<OrderOutcome>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> TaskRepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn load_snapshot(&self) -> TaskRepoResult<Vec<OrderItem>> {
        load_order_items(self.conn)
    }

    fn get_task(&self, id: TaskId) -> TaskRepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, bucket: Option<Bucket>) -> TaskRepoResult<Vec<Task>> {
        let mut tasks = Vec::new();
        match bucket {
            Some(bucket) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{TASK_SELECT_SQL} WHERE bucket = ?1 {TASK_ORDER_SQL};"
                ))?;
                let mut rows = stmt.query([bucket.as_str()])?;
                while let Some(row) = rows.next()? {
                    tasks.push(parse_task_row(row)?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{TASK_SELECT_SQL} {TASK_ORDER_SQL};"))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    tasks.push(parse_task_row(row)?);
                }
            }
        }
        Ok(tasks)
    }

    fn apply(&self, op: OrderOp, new_task: Option<&Task>) -> TaskRepoResult<OrderOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let snapshot = load_order_items(&tx)?;
        if let Err(violation) = check_invariants(&snapshot) {
            warn!("event=task_snapshot module=repo status=invariant_violation violation=\"{violation}\"");
        }
        let outcome = order::apply(snapshot, op)?;
        write_changes(&tx, &outcome.changes, new_task)?;
        tx.commit()?;
        Ok(outcome)
    }
}

fn write_changes(
    conn: &Connection,
    changes: &ChangeSet,
    new_task: Option<&Task>,
) -> TaskRepoResult<()> {
    if let Some(removed) = changes.removed {
        let deleted = conn.execute(
            "DELETE FROM tasks WHERE task_uuid = ?1;",
            [removed.to_string()],
        )?;
        if deleted == 0 {
            return Err(TaskRepoError::TaskNotFound(removed));
        }
    }

    for (id, placement) in &changes.updated {
        let changed = conn.execute(
            "UPDATE tasks
             SET bucket = ?2,
                 position = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1;",
            params![id.to_string(), placement.bucket.as_str(), placement.position],
        )?;
        if changed == 0 {
            return Err(TaskRepoError::TaskNotFound(*id));
        }
    }

    if let Some(created) = changes.created {
        let title = new_task
            .filter(|task| task.uuid == created.id)
            .map(|task| task.title.as_str())
            .ok_or_else(|| {
                TaskRepoError::InvalidData(format!("missing task record for new item {}", created.id))
            })?;
        conn.execute(
            "INSERT INTO tasks (task_uuid, title, bucket, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                created.id.to_string(),
                title,
                created.bucket.as_str(),
                created.position,
            ],
        )?;
    }

    Ok(())
}

fn load_order_items(conn: &Connection) -> TaskRepoResult<Vec<OrderItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT task_uuid, bucket, position FROM tasks {TASK_ORDER_SQL};"
    ))?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("task_uuid")?;
        let bucket_text: String = row.get("bucket")?;
        items.push(OrderItem::new(
            parse_uuid(&id_text)?,
            parse_bucket(&bucket_text)?,
            row.get("position")?,
        ));
    }
    Ok(items)
}

fn parse_task_row(row: &Row<'_>) -> TaskRepoResult<Task> {
    let id_text: String = row.get("task_uuid")?;
    let bucket_text: String = row.get("bucket")?;
    Ok(Task {
        uuid: parse_uuid(&id_text)?,
        title: row.get("title")?,
        bucket: parse_bucket(&bucket_text)?,
        position: row.get("position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_bucket(value: &str) -> TaskRepoResult<Bucket> {
    Bucket::parse(value)
        .ok_or_else(|| TaskRepoError::InvalidData(format!("invalid bucket `{value}` in tasks.bucket")))
}

fn parse_uuid(value: &str) -> TaskRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| TaskRepoError::InvalidData(format!("invalid uuid `{value}` in tasks.task_uuid")))
}

fn ensure_task_connection_ready(conn: &Connection) -> TaskRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(TaskRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let columns = table_columns(conn, "tasks")?;
    if columns.is_empty() {
        return Err(TaskRepoError::MissingRequiredTable("tasks"));
    }
    for column in [
        "task_uuid",
        "title",
        "bucket",
        "position",
        "created_at",
        "updated_at",
    ] {
        if !columns.iter().any(|current| current == column) {
            return Err(TaskRepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> TaskRepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
