//! The capability context type.
//!
//! `Cx` is the token that grants a task access to runtime capabilities:
//!
//! - Querying identity (task ID) and the current virtual time
//! - Suspending on the virtual clock (`sleep`) or yielding (`yield_now`)
//! - Spawning child tasks
//! - Checking cancellation status
//!
//! All effectful operations flow through an explicit `Cx` rather than
//! ambient global state, so the harness — not the host environment —
//! decides how time passes and where child tasks land.
//!
//! # Thread Model
//!
//! The lab executor is single-threaded and cooperative; `Cx` is `!Send`
//! (it carries the same-thread spawn queue) and belongs to exactly one
//! task. Clones share the underlying state, so a cancellation signal is
//! visible to every clone.

use crate::error::{Error, ErrorKind};
use crate::runtime::state::RuntimeShared;
use crate::runtime::task::{self, Spawner, TaskHandle, TaskKind};
use crate::time::{Sleep, YieldNow};
use crate::types::{TaskId, Time};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Mutable per-task state shared between a task's `Cx` clones, its
/// record in the task table, and its handle.
#[derive(Debug)]
pub(crate) struct CxInner {
    /// The task this context belongs to.
    pub(crate) task: TaskId,
    /// Set when cancellation has been requested via `TaskHandle::abort`.
    pub(crate) cancel_requested: bool,
}

impl CxInner {
    pub(crate) fn new(task: TaskId) -> Self {
        Self {
            task,
            cancel_requested: false,
        }
    }
}

/// The capability context for a task.
///
/// A `Cx` instance is provided to each task by the runtime when the task
/// is spawned. It is cheaply clonable; clones share the same underlying
/// state.
///
/// # Example
///
/// ```ignore
/// runtime.spawn(|cx| async move {
///     cx.sleep(Duration::from_millis(100)).await;
///     cx.checkpoint()?;
///     Ok(())
/// });
/// ```
#[derive(Debug, Clone)]
pub struct Cx {
    inner: Arc<RwLock<CxInner>>,
    shared: Arc<RuntimeShared>,
    spawner: Spawner,
}

impl Cx {
    /// Assembles a context from its parts (internal use).
    pub(crate) fn from_parts(
        inner: Arc<RwLock<CxInner>>,
        shared: Arc<RuntimeShared>,
        spawner: Spawner,
    ) -> Self {
        Self {
            inner,
            shared,
            spawner,
        }
    }

    /// Returns the current task ID.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.inner.read().expect("lock poisoned").task
    }

    /// Returns the current virtual time. Never suspends.
    #[must_use]
    pub fn now(&self) -> Time {
        self.shared.now()
    }

    /// Returns a future that completes once virtual time has advanced by
    /// `duration` (truncated to whole milliseconds).
    ///
    /// The future registers a wakeup with the scheduler's timer heap on
    /// first poll; the task is released when the test driver advances the
    /// clock past the deadline. A zero-length sleep completes immediately.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> Sleep {
        let deadline = self.now().saturating_add(duration);
        Sleep::new(Arc::clone(&self.shared), self.task_id(), deadline)
    }

    /// Returns a future that yields to the scheduler exactly once.
    ///
    /// The task goes to the back of the ready queue and runs again at the
    /// same virtual time, after every task queued ahead of it.
    #[must_use]
    pub fn yield_now(&self) -> YieldNow {
        YieldNow::new()
    }

    /// Spawns a child task from inside a running task.
    ///
    /// The child is installed as soon as the current poll returns and —
    /// unless the scheduler is paused — runs synchronously up to its first
    /// suspension point before control returns to the test driver.
    pub fn spawn<T, F, Fut>(&self, f: F) -> TaskHandle<T>
    where
        T: 'static,
        F: FnOnce(Cx) -> Fut,
        Fut: Future<Output = Result<T, Error>> + 'static,
    {
        let (id, record, handle) = task::create_task(&self.shared, &self.spawner, TaskKind::Child, f);
        self.spawner.push(task::PendingSpawn { id, record });
        handle
    }

    /// Returns true if cancellation has been requested for this task.
    ///
    /// This is a non-blocking check. Long-running loops should call
    /// [`checkpoint`](Self::checkpoint) (or this) between steps so an
    /// abort takes effect at a well-defined point.
    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.read().expect("lock poisoned").cancel_requested
    }

    /// Checks for cancellation and returns an error if cancelled.
    ///
    /// Combines the cancellation check with an error return, making it
    /// convenient with the `?` operator.
    ///
    /// # Errors
    ///
    /// Returns an error with kind [`ErrorKind::Cancelled`] if cancellation
    /// is pending.
    pub fn checkpoint(&self) -> Result<(), Error> {
        if self.is_cancel_requested() {
            Err(Error::new(ErrorKind::Cancelled))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cx() -> Cx {
        let shared = Arc::new(RuntimeShared::new());
        let id = shared.allocate_task_id();
        Cx::from_parts(
            Arc::new(RwLock::new(CxInner::new(id))),
            shared,
            Spawner::new(),
        )
    }

    #[test]
    fn checkpoint_without_cancel() {
        let cx = test_cx();
        assert!(cx.checkpoint().is_ok());
    }

    #[test]
    fn checkpoint_with_cancel() {
        let cx = test_cx();
        cx.inner.write().expect("lock poisoned").cancel_requested = true;
        assert!(cx.checkpoint().is_err());
        assert!(cx.is_cancel_requested());
    }

    #[test]
    fn clones_share_cancellation_state() {
        let cx = test_cx();
        let clone = cx.clone();
        cx.inner.write().expect("lock poisoned").cancel_requested = true;
        assert!(clone.is_cancel_requested());
    }

    #[test]
    fn now_reads_the_shared_clock() {
        let cx = test_cx();
        assert_eq!(cx.now(), Time::ZERO);
        cx.shared.clock.advance_to(Time::from_millis(40));
        assert_eq!(cx.now(), Time::from_millis(40));
    }
}
