//! Waker implementation for lab tasks.
//!
//! Waking a task pushes it onto the shared ready queue; the queue itself
//! deduplicates, so repeated wakes between polls coalesce into one run.
//! Wakes are never lost while the scheduler is paused — they accumulate
//! in the queue and are drained on resume.
//!
//! Note: This implementation uses safe Rust only (no unsafe).

use crate::runtime::state::RuntimeShared;
use crate::tracing_compat::trace;
use crate::types::TaskId;
use std::sync::Arc;
use std::task::{Wake, Waker};

/// A waker bound to a specific task.
struct TaskWaker {
    shared: Arc<RuntimeShared>,
    task: TaskId,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if self.shared.schedule(self.task) {
            trace!(task_id = %self.task, "task woken");
        }
    }
}

/// Creates a waker that marks `task` runnable when invoked.
pub(crate) fn waker_for(shared: Arc<RuntimeShared>, task: TaskId) -> Waker {
    Waker::from(Arc::new(TaskWaker { shared, task }))
}
