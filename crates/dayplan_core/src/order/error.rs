use crate::model::bucket::Bucket;
use crate::model::task::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OrderResult<T> = Result<T, OrderError>;

/// Rejections from order engine operations.
///
/// All variants are caller-recoverable; the input snapshot is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Add variant invoked with an item tagged for another bucket.
    BucketMismatch { expected: Bucket, actual: Bucket },
    /// Referenced id is absent from the snapshot.
    ItemNotFound(TaskId),
    /// Reorder offset would leave the item's own bucket.
    OutOfRange {
        id: TaskId,
        position: i64,
        diff: i64,
        first: i64,
        last: i64,
    },
    /// Operation is not defined for this bucket kind.
    UnsupportedBucket(Bucket),
    /// Bucket expected to hold members has none.
    EmptyBucket(Bucket),
    /// Inserted id already exists in the snapshot.
    DuplicateItem(TaskId),
}

impl Display for OrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BucketMismatch { expected, actual } => {
                write!(f, "item bucket `{actual}` does not match target `{expected}`")
            }
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::OutOfRange {
                id,
                position,
                diff,
                first,
                last,
            } => write!(
                f,
                "cannot move item {id} from {position} by {diff}: bucket spans {first}..={last}"
            ),
            Self::UnsupportedBucket(bucket) => {
                write!(f, "operation not supported for bucket `{bucket}`")
            }
            Self::EmptyBucket(bucket) => write!(f, "bucket `{bucket}` has no members"),
            Self::DuplicateItem(id) => write!(f, "item already present: {id}"),
        }
    }
}

impl Error for OrderError {}
