//! State shared between the runtime, task contexts, wakers, and timers.
//!
//! The pieces here are exactly the ones a `std::task::Waker` or a task's
//! capability context must reach from inside a poll: the virtual clock,
//! the timer heap, and the ready queue. The `Waker` contract requires
//! `Send + Sync`, so this state sits behind `parking_lot` mutexes even
//! though execution is single-threaded; task futures themselves are
//! `!Send` and owned by the runtime, never by this struct.

use crate::runtime::ready_queue::ReadyQueue;
use crate::runtime::timer::TimerHeap;
use crate::time::VirtualClock;
use crate::types::{TaskId, Time};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Waker- and context-visible runtime state.
#[derive(Debug)]
pub(crate) struct RuntimeShared {
    /// The virtual clock.
    pub(crate) clock: VirtualClock,
    /// Pending `(deadline, task)` wakeups.
    pub(crate) timers: Mutex<TimerHeap>,
    /// Tasks runnable at the current virtual time.
    pub(crate) ready: Mutex<ReadyQueue>,
    /// Allocator for task sequence numbers (spawn order).
    next_task_seq: AtomicU64,
}

impl RuntimeShared {
    /// Creates fresh shared state with the clock at zero.
    pub(crate) fn new() -> Self {
        Self {
            clock: VirtualClock::default(),
            timers: Mutex::new(TimerHeap::new()),
            ready: Mutex::new(ReadyQueue::new()),
            next_task_seq: AtomicU64::new(0),
        }
    }

    /// Returns the current virtual time.
    pub(crate) fn now(&self) -> Time {
        self.clock.now()
    }

    /// Allocates the next task ID in spawn order.
    pub(crate) fn allocate_task_id(&self) -> TaskId {
        TaskId::from_seq(self.next_task_seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a timer wakeup for a task.
    pub(crate) fn register_timer(&self, task: TaskId, deadline: Time) {
        self.timers.lock().insert(task, deadline);
    }

    /// Marks a task runnable. Returns true if it was newly enqueued.
    pub(crate) fn schedule(&self, task: TaskId) -> bool {
        self.ready.lock().push(task)
    }
}
