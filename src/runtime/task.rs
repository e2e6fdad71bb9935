//! Task records, result slots, and task handles.
//!
//! A spawned computation is stored as a type-erased future returning
//! `Result<(), Error>`; its typed result travels through a [`ResultSlot`]
//! shared with the [`TaskHandle`] returned to the spawner. The executor is
//! single-threaded, so futures and slots are `!Send` by design — only the
//! pieces a waker touches live behind sync primitives.

use crate::cx::{Cx, CxInner};
use crate::error::{Error, ErrorKind};
use crate::runtime::state::RuntimeShared;
use crate::types::TaskId;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, RwLock, Weak};

/// The erased future type stored for every task.
pub(crate) type TaskFuture = Pin<Box<dyn Future<Output = Result<(), Error>>>>;

/// Whether a task is the root of a `run_to_completion` call or a spawned
/// child. The distinction drives failure routing: root failures surface to
/// the caller, child failures go to the failure sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    Root,
    Child,
}

/// Single-use slot carrying a task's typed result to its handle.
pub(crate) struct ResultSlot<T> {
    inner: Rc<RefCell<SlotState<T>>>,
}

struct SlotState<T> {
    value: Option<Result<T, Error>>,
    finished: bool,
}

impl<T> ResultSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotState {
                value: None,
                finished: false,
            })),
        }
    }

    /// Records the task's result. Later writes are ignored; the first
    /// outcome wins (a cancelled task that already completed stays
    /// completed).
    pub(crate) fn set(&self, result: Result<T, Error>) {
        let mut state = self.inner.borrow_mut();
        if state.finished {
            return;
        }
        state.value = Some(result);
        state.finished = true;
    }

    /// Takes the result out of the slot, if present.
    pub(crate) fn take(&self) -> Option<Result<T, Error>> {
        self.inner.borrow_mut().value.take()
    }

    /// Returns true once a result has been recorded, even after `take`.
    pub(crate) fn is_finished(&self) -> bool {
        self.inner.borrow().finished
    }
}

impl<T> Clone for ResultSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// A task stored in the runtime's task table.
pub(crate) struct TaskRecord {
    kind: TaskKind,
    future: Option<TaskFuture>,
    cx_inner: Arc<RwLock<CxInner>>,
    cancel_complete: Option<Box<dyn FnOnce()>>,
}

impl TaskRecord {
    pub(crate) fn kind(&self) -> TaskKind {
        self.kind
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cx_inner.read().expect("lock poisoned").cancel_requested
    }

    pub(crate) fn take_future(&mut self) -> Option<TaskFuture> {
        self.future.take()
    }

    pub(crate) fn put_future(&mut self, future: TaskFuture) {
        self.future = Some(future);
    }

    /// Marks the handle's slot cancelled and drops the stored future
    /// without polling it again.
    pub(crate) fn complete_cancelled(&mut self) {
        self.future = None;
        if let Some(complete) = self.cancel_complete.take() {
            complete();
        }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("kind", &self.kind)
            .field("stored", &self.future.is_some())
            .finish_non_exhaustive()
    }
}

/// A freshly created task waiting to be installed into the task table.
pub(crate) struct PendingSpawn {
    pub(crate) id: TaskId,
    pub(crate) record: TaskRecord,
}

/// Same-thread queue of tasks spawned from inside a running task.
///
/// `Cx::spawn` cannot reach the runtime's task table (the runtime is
/// mid-poll), so new tasks are parked here and installed as soon as the
/// current poll returns.
#[derive(Clone, Default)]
pub(crate) struct Spawner {
    pending: Rc<RefCell<Vec<PendingSpawn>>>,
}

impl Spawner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, spawn: PendingSpawn) {
        self.pending.borrow_mut().push(spawn);
    }

    pub(crate) fn drain(&self) -> Vec<PendingSpawn> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

/// A handle to a spawned task.
///
/// The handle does not own the task; dropping it leaves the task running.
/// It provides the task ID, a non-blocking way to observe the result, and
/// cancellation.
///
/// Failures of child tasks are delivered both here and to the runtime's
/// [`FailureSink`](crate::sink::FailureSink); only the sink path is
/// load-bearing for tasks nobody joins.
pub struct TaskHandle<T> {
    task_id: TaskId,
    slot: ResultSlot<T>,
    inner: Weak<RwLock<CxInner>>,
    shared: Arc<RuntimeShared>,
}

impl<T> TaskHandle<T> {
    /// Returns the task ID of the spawned task.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns true if the task has reached a terminal state (completed,
    /// failed, or cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.slot.is_finished()
    }

    /// Attempts to get the task's result without suspending.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` if the task completed successfully
    /// - `Ok(None)` if the task is still running (or the result was
    ///   already consumed by an earlier call)
    /// - `Err(error)` if the task failed, panicked, or was cancelled
    ///
    /// The result is consumed by the first call that observes it.
    pub fn try_join(&self) -> Result<Option<T>, Error> {
        match self.slot.take() {
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }

    /// Requests cancellation of the task.
    ///
    /// This is a request — the task stops at its next scheduling point,
    /// not mid-poll. A cancelled task is removed from the pending set, its
    /// in-flight collections stop emitting, and nothing is recorded in the
    /// failure sink. Aborting a finished task is a no-op.
    pub fn abort(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        {
            let mut guard = inner.write().expect("lock poisoned");
            if guard.cancel_requested {
                return;
            }
            guard.cancel_requested = true;
        }
        // Make the task runnable so the scheduler reaps it promptly.
        self.shared.schedule(self.task_id);
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.task_id)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Builds a task: its context, wrapped future, record, and handle.
///
/// The typed output of `f`'s future is routed into the handle's slot; the
/// erased `Result<(), Error>` the runtime polls carries the failure for
/// sink routing.
pub(crate) fn create_task<T, F, Fut>(
    shared: &Arc<RuntimeShared>,
    spawner: &Spawner,
    kind: TaskKind,
    f: F,
) -> (TaskId, TaskRecord, TaskHandle<T>)
where
    T: 'static,
    F: FnOnce(Cx) -> Fut,
    Fut: Future<Output = Result<T, Error>> + 'static,
{
    let id = shared.allocate_task_id();
    let cx_inner = Arc::new(RwLock::new(CxInner::new(id)));
    let cx = Cx::from_parts(Arc::clone(&cx_inner), Arc::clone(shared), spawner.clone());

    let slot = ResultSlot::new();
    let task_slot = slot.clone();
    let future = f(cx);
    let wrapped = async move {
        match future.await {
            Ok(value) => {
                task_slot.set(Ok(value));
                Ok(())
            }
            Err(error) => {
                task_slot.set(Err(error.clone()));
                Err(error)
            }
        }
    };

    let cancel_slot = slot.clone();
    let record = TaskRecord {
        kind,
        future: Some(Box::pin(wrapped)),
        cx_inner: Arc::clone(&cx_inner),
        cancel_complete: Some(Box::new(move || {
            cancel_slot.set(Err(Error::new(ErrorKind::Cancelled)));
        })),
    };

    let handle = TaskHandle {
        task_id: id,
        slot,
        inner: Arc::downgrade(&cx_inner),
        shared: Arc::clone(shared),
    };

    (id, record, handle)
}
