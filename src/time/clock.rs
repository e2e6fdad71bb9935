//! The virtual clock.
//!
//! Virtual time never moves on its own: it advances only when the test
//! driver calls `advance_by` / `advance_until_idle` on the runtime (which
//! forwards to [`VirtualClock::advance_to`]). Reads never suspend.

use crate::types::Time;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic virtual-time counter.
///
/// The counter is shared between the runtime, task contexts, and sleep
/// futures, so it lives behind an atomic. Monotonicity is enforced here:
/// a backward target is ignored rather than applied.
#[derive(Debug)]
pub struct VirtualClock {
    now_millis: AtomicU64,
}

impl VirtualClock {
    /// Creates a clock starting at the given time.
    #[must_use]
    pub fn starting_at(time: Time) -> Self {
        Self {
            now_millis: AtomicU64::new(time.as_millis()),
        }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Time {
        Time::from_millis(self.now_millis.load(Ordering::Acquire))
    }

    /// Moves the clock forward to `target`. A target at or before the
    /// current time leaves the clock unchanged.
    pub(crate) fn advance_to(&self, target: Time) {
        self.now_millis
            .fetch_max(target.as_millis(), Ordering::AcqRel);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::starting_at(Time::ZERO)
    }
}
