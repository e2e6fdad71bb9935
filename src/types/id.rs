//! Identifier and time types.
//!
//! Virtual time is counted in whole milliseconds from the start of a run.
//! Task identifiers are allocated from a monotonically increasing counter,
//! so the total order on [`TaskId`] is exactly spawn order — the scheduler
//! relies on this for its FIFO tie-break.

use std::fmt;
use std::time::Duration;

/// A point in virtual time, in milliseconds since the start of the run.
///
/// Virtual time is monotonically non-decreasing within a run and advances
/// only when the test driver asks for it. Arithmetic saturates rather than
/// wrapping: a test that advances time by `u64::MAX` twice should clamp,
/// not panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(u64);

impl Time {
    /// The start of every run.
    pub const ZERO: Self = Self(0);

    /// Creates a time from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the time as milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns this time advanced by `millis`, saturating at the maximum.
    #[must_use]
    pub const fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Returns this time advanced by a [`Duration`], saturating at the
    /// maximum. Sub-millisecond components are truncated.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.saturating_add_millis(millis)
    }

    /// Returns the milliseconds elapsed since `earlier`, or zero if
    /// `earlier` is in the future.
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Identifier for a spawned task.
///
/// Identifiers are never reused within a run. The derived ordering is
/// creation order, which the scheduler uses to break ties between tasks
/// that become runnable at the same virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Creates a task ID from a raw sequence number (internal use).
    #[must_use]
    pub(crate) const fn from_seq(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns the raw sequence number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates a task ID for testing purposes.
    ///
    /// Production code receives task IDs from the runtime; this constructor
    /// exists so unit tests can exercise scheduler data structures directly.
    #[must_use]
    pub fn new_for_test(seq: u64) -> Self {
        Self(seq)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}
