//! Bucket tags for the planning list.
//!
//! # Responsibility
//! - Provide the closed set of list partitions.
//! - Expose rank and terminal predicates used by the order engine.
//!
//! # Invariants
//! - Active buckets have a strict total rank: `Today < Tomorrow < NextWeek`.
//! - Terminal buckets rank after every active bucket.
//! - Storage names are stable and never reused.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Position value carried by every terminal-bucket item.
///
/// Larger than any position the dense active numbering can produce.
pub const POSITION_SENTINEL: i64 = i64::MAX;

/// Named partition of the planning list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Work planned for the current day.
    Today,
    /// Work planned for the next day.
    Tomorrow,
    /// Work planned for the coming week.
    NextWeek,
    /// Recurring templates waiting for their next occurrence.
    Scheduled,
    /// Finished work.
    Completed,
}

impl Bucket {
    /// Every bucket in rank order.
    pub const ALL: [Bucket; 5] = [
        Bucket::Today,
        Bucket::Tomorrow,
        Bucket::NextWeek,
        Bucket::Scheduled,
        Bucket::Completed,
    ];

    /// Buckets that take part in dense position numbering, in rank order.
    pub const ACTIVE: [Bucket; 3] = [Bucket::Today, Bucket::Tomorrow, Bucket::NextWeek];

    /// Sort rank used for `(rank, position)` ordering.
    pub fn rank(self) -> u8 {
        match self {
            Self::Today => 0,
            Self::Tomorrow => 1,
            Self::NextWeek => 2,
            Self::Scheduled => 3,
            Self::Completed => 4,
        }
    }

    /// Returns whether members are excluded from the dense numbering.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Scheduled | Self::Completed)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::NextWeek => "next_week",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }

    /// Parses a stable storage name. Unknown names return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(Self::Today),
            "tomorrow" => Some(Self::Tomorrow),
            "next_week" => Some(Self::NextWeek),
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Bucket;

    #[test]
    fn active_ranks_are_strictly_increasing() {
        let ranks: Vec<u8> = Bucket::ACTIVE.iter().map(|bucket| bucket.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn terminal_buckets_rank_after_active_ones() {
        for terminal in Bucket::ALL.into_iter().filter(|b| b.is_terminal()) {
            for active in Bucket::ACTIVE {
                assert!(terminal.rank() > active.rank());
            }
        }
    }

    #[test]
    fn storage_names_parse_back() {
        for bucket in Bucket::ALL {
            assert_eq!(Bucket::parse(bucket.as_str()), Some(bucket));
        }
        assert_eq!(Bucket::parse("archived"), None);
    }
}
