//! Sleeping on the virtual clock.

use crate::runtime::state::RuntimeShared;
use crate::types::{TaskId, Time};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Future that completes once virtual time reaches its deadline.
///
/// Created by [`Cx::sleep`](crate::cx::Cx::sleep). The first pending poll
/// registers `(task, deadline)` in the scheduler's timer heap; when the
/// test driver advances the clock past the deadline, the task is released
/// and the next poll observes `now >= deadline`.
///
/// # Cancel Safety
///
/// Dropping a `Sleep` before it fires is safe. A stale timer entry may
/// remain in the heap; it produces at most one spurious wake, which the
/// scheduler coalesces.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Sleep {
    shared: Arc<RuntimeShared>,
    task: TaskId,
    deadline: Time,
    registered: bool,
}

impl Sleep {
    pub(crate) fn new(shared: Arc<RuntimeShared>, task: TaskId, deadline: Time) -> Self {
        Self {
            shared,
            task,
            deadline,
            registered: false,
        }
    }

    /// Returns the virtual-time deadline this sleep completes at.
    #[must_use]
    pub fn deadline(&self) -> Time {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.shared.now() >= this.deadline {
            return Poll::Ready(());
        }
        if !this.registered {
            this.shared.register_timer(this.task, this.deadline);
            this.registered = true;
        }
        Poll::Pending
    }
}
