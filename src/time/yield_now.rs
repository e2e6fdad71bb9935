//! Yielding to the scheduler.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future that yields to the scheduler exactly once.
///
/// Created by [`Cx::yield_now`](crate::cx::Cx::yield_now). The first poll
/// wakes the task (sending it to the back of the ready queue) and returns
/// `Pending`; the second poll completes. Virtual time does not move.
#[derive(Debug, Default)]
#[must_use = "futures do nothing unless polled"]
pub struct YieldNow {
    yielded: bool,
}

impl YieldNow {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Future for YieldNow {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.yielded {
            Poll::Ready(())
        } else {
            this.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
