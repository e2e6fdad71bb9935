//! Lab runtime for deterministic execution.
//!
//! The lab runtime executes tasks with:
//!
//! - Virtual time (controlled advancement, no wall-clock dependencies)
//! - Cooperative single-threaded scheduling (tasks switch only at
//!   suspension points)
//! - Deterministic ordering (equal-deadline timers fire in insertion
//!   order; equal-readiness tasks run in spawn order)
//! - Failure isolation (unhandled child-task failures land in the
//!   [`FailureSink`] instead of aborting the run)
//!
//! # Driving a test
//!
//! Test code owns the runtime and drives it directly:
//!
//! ```ignore
//! let mut lab = LabRuntime::new();
//! let observed = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = observed.clone();
//! lab.spawn(move |cx| async move {
//!     sequence.collect(&cx, |v| sink.lock().push(v)).await
//! });
//!
//! lab.advance_by(100)?;        // release the first emission
//! lab.advance_until_idle();    // run everything else to quiescence
//! ```

use crate::cx::Cx;
use crate::error::{Error, ErrorKind};
use crate::lab::config::LabConfig;
use crate::runtime::state::RuntimeShared;
use crate::runtime::task::{self, PendingSpawn, Spawner, TaskHandle, TaskKind, TaskRecord};
use crate::runtime::waker::waker_for;
use crate::sink::FailureSink;
use crate::types::{TaskId, Time};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Cooperative single-threaded executor driven by virtual time.
///
/// See the [module documentation](self) for the driving model. All
/// methods are synchronous; "suspension" parks a task's continuation in
/// the pending set until the clock is advanced past its deadline.
pub struct LabRuntime {
    shared: Arc<RuntimeShared>,
    tasks: HashMap<TaskId, TaskRecord>,
    spawner: Spawner,
    failures: FailureSink,
    config: LabConfig,
    paused: bool,
    steps: u64,
    step_limit_hit: bool,
}

impl LabRuntime {
    /// Creates a runtime with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LabConfig::default())
    }

    /// Creates a runtime with the given configuration.
    #[must_use]
    pub fn with_config(config: LabConfig) -> Self {
        crate::tracing_compat::info!("lab runtime initialized: start_time_ms=0");
        Self {
            shared: Arc::new(RuntimeShared::new()),
            tasks: HashMap::new(),
            spawner: Spawner::new(),
            failures: FailureSink::new(),
            config,
            paused: false,
            steps: 0,
            step_limit_hit: false,
        }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Time {
        self.shared.now()
    }

    /// Returns the number of task polls executed so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns a handle to the sink collecting unhandled child-task
    /// failures.
    #[must_use]
    pub fn failures(&self) -> FailureSink {
        self.failures.clone()
    }

    /// Returns true if automatic task release is currently withheld.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns true if no task is live and nothing is queued or pending.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.tasks.is_empty() && self.shared.ready.lock().is_empty()
    }

    /// Returns the number of entries in the timer heap.
    ///
    /// Entries for completed or cancelled tasks may linger until the
    /// scheduler next walks the heap, so this is an upper bound on live
    /// wakeups.
    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        self.shared.timers.lock().len()
    }

    /// Returns the earliest deadline of a live pending task, if any.
    #[must_use]
    pub fn next_timer_deadline(&mut self) -> Option<Time> {
        self.next_live_deadline()
    }

    /// Spawns a child task.
    ///
    /// `f` receives the task's capability context and must return the
    /// task's future. Unless the scheduler is paused, the task runs
    /// synchronously up to its first suspension point before `spawn`
    /// returns (eager start); while paused it is queued and runs on
    /// [`resume`](Self::resume).
    ///
    /// An `Err` outcome of a spawned task is captured into the failure
    /// sink; it is also delivered to the returned handle for tests that
    /// want to join explicitly.
    pub fn spawn<T, F, Fut>(&mut self, f: F) -> TaskHandle<T>
    where
        T: 'static,
        F: FnOnce(Cx) -> Fut,
        Fut: Future<Output = Result<T, Error>> + 'static,
    {
        let (id, record, handle) = task::create_task(&self.shared, &self.spawner, TaskKind::Child, f);
        crate::tracing_compat::debug!(task_id = %id, "task spawned");
        self.tasks.insert(id, record);
        if self.paused {
            self.shared.schedule(id);
        } else {
            self.poll_task(id);
        }
        handle
    }

    /// Withholds task execution until [`resume`](Self::resume).
    ///
    /// While paused, `advance_by` still moves virtual time forward and
    /// wakes still accumulate on the ready queue, but no task is polled —
    /// even one that is runnable right now. This lets a test inspect
    /// state between the production of a trigger and its effect.
    pub fn pause(&mut self) {
        self.paused = true;
        crate::tracing_compat::info!(
            "scheduler paused at time_ms={}",
            self.now().as_millis()
        );
    }

    /// Resumes task execution and immediately releases everything
    /// runnable at the current virtual time, in FIFO order, draining
    /// cascading wakes.
    pub fn resume(&mut self) {
        self.paused = false;
        crate::tracing_compat::info!(
            "scheduler resumed at time_ms={}",
            self.now().as_millis()
        );
        self.drain_ready();
    }

    /// Advances virtual time by `delta_ms` milliseconds.
    ///
    /// Tasks whose deadlines fall inside the advanced window are released
    /// in non-decreasing deadline order; all cascading wakeups at each
    /// intermediate time are drained before time moves further. While the
    /// scheduler is paused, time still advances but nothing is released.
    ///
    /// # Errors
    ///
    /// Returns an error with kind [`ErrorKind::InvalidDuration`] if
    /// `delta_ms` is negative; virtual time never moves backward.
    pub fn advance_by(&mut self, delta_ms: i64) -> Result<(), Error> {
        if delta_ms < 0 {
            return Err(Error::new(ErrorKind::InvalidDuration)
                .with_message(format!("cannot advance time backward: delta_ms={delta_ms}")));
        }
        let delta = u64::try_from(delta_ms).unwrap_or_default();
        let from = self.now();
        let target = from.saturating_add_millis(delta);
        crate::tracing_compat::debug!(
            "virtual clock advancing: delta_ms={}, target_ms={}",
            delta,
            target.as_millis()
        );

        if self.paused {
            self.shared.clock.advance_to(target);
            return Ok(());
        }

        self.drain_ready();
        while let Some(deadline) = self.next_live_deadline() {
            if deadline > target || self.step_limit_hit {
                break;
            }
            self.shared.clock.advance_to(deadline);
            self.drain_ready();
        }
        self.shared.clock.advance_to(target);
        self.drain_ready();
        Ok(())
    }

    /// Advances virtual time deadline-by-deadline until no pending task
    /// remains.
    ///
    /// Returns immediately if the scheduler is paused. A producer that
    /// never terminates is eventually stopped by the configured step
    /// limit rather than spinning forever.
    pub fn advance_until_idle(&mut self) {
        if self.paused {
            return;
        }
        loop {
            self.drain_ready();
            if self.step_limit_hit {
                break;
            }
            match self.next_live_deadline() {
                Some(deadline) => {
                    crate::tracing_compat::debug!(
                        "virtual clock auto-advance: next_deadline_ms={}",
                        deadline.as_millis()
                    );
                    self.shared.clock.advance_to(deadline);
                }
                None => break,
            }
        }
    }

    /// Runs `f` as the root task to its natural end.
    ///
    /// Scheduling and virtual time are driven automatically: whenever no
    /// task is runnable, the clock jumps to the next pending deadline (so
    /// a scenario spanning hours of virtual time completes instantly).
    /// Child tasks spawned by the root follow the usual rules — their
    /// failures go to the sink, not to the caller.
    ///
    /// # Errors
    ///
    /// - The root task's own `Err` is returned to the caller.
    /// - [`ErrorKind::Stalled`] if the root can never progress (nothing
    ///   runnable, no pending timer, or the scheduler is paused), or if
    ///   the step limit was exhausted first.
    ///
    /// # Panics
    ///
    /// A panic inside the root task propagates to the caller. Panics in
    /// child tasks are captured into the failure sink instead.
    pub fn run_to_completion<T, F, Fut>(&mut self, f: F) -> Result<T, Error>
    where
        T: 'static,
        F: FnOnce(Cx) -> Fut,
        Fut: Future<Output = Result<T, Error>> + 'static,
    {
        let (id, record, handle) = task::create_task(&self.shared, &self.spawner, TaskKind::Root, f);
        crate::tracing_compat::debug!(task_id = %id, "root task started");
        self.tasks.insert(id, record);
        self.shared.schedule(id);

        loop {
            self.drain_ready();
            if handle.is_finished() {
                return match handle.try_join() {
                    Ok(Some(value)) => Ok(value),
                    Err(error) => Err(error),
                    Ok(None) => Err(Error::new(ErrorKind::Internal)
                        .with_message("root task finished without a result")),
                };
            }
            if self.paused {
                return Err(Error::new(ErrorKind::Stalled)
                    .with_message("scheduler is paused and the root task is not finished"));
            }
            if self.step_limit_hit {
                return Err(Error::new(ErrorKind::Stalled)
                    .with_message("step limit reached before the root task finished"));
            }
            match self.next_live_deadline() {
                Some(deadline) => self.shared.clock.advance_to(deadline),
                None => {
                    crate::tracing_compat::error!(
                        task_id = %id,
                        "root task stalled: nothing runnable and no timer pending"
                    );
                    return Err(Error::new(ErrorKind::Stalled).with_message(
                        "root task cannot make progress: nothing is runnable and no timer is pending",
                    ));
                }
            }
        }
    }

    /// Runs every task runnable at the current virtual time, releasing
    /// newly expired timers and draining cascading wakes. No-op while
    /// paused.
    fn drain_ready(&mut self) {
        if self.paused {
            return;
        }
        loop {
            if self.step_limit_reached() {
                break;
            }
            let now = self.shared.now();
            let expired = self.shared.timers.lock().pop_expired(now);
            for task in expired {
                self.shared.schedule(task);
            }
            let Some(task) = self.shared.ready.lock().pop() else {
                break;
            };
            self.poll_task(task);
        }
    }

    /// Polls a single task once, routing its outcome.
    fn poll_task(&mut self, id: TaskId) {
        let cancelled = match self.tasks.get(&id) {
            // Stale wake for a task that already finished.
            None => return,
            Some(record) => record.is_cancelled(),
        };
        if cancelled {
            if let Some(mut record) = self.tasks.remove(&id) {
                record.complete_cancelled();
            }
            crate::tracing_compat::debug!(task_id = %id, "task cancelled");
            return;
        }
        let Some(record) = self.tasks.get_mut(&id) else {
            return;
        };
        let kind = record.kind();
        let Some(mut future) = record.take_future() else {
            return;
        };

        self.steps += 1;
        let waker = waker_for(Arc::clone(&self.shared), id);
        let mut poll_cx = Context::from_waker(&waker);
        let poll = catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut poll_cx)));

        match poll {
            Ok(Poll::Pending) => {
                if let Some(record) = self.tasks.get_mut(&id) {
                    record.put_future(future);
                }
            }
            Ok(Poll::Ready(outcome)) => {
                self.tasks.remove(&id);
                match outcome {
                    Ok(()) => {
                        crate::tracing_compat::debug!(task_id = %id, "task completed");
                    }
                    Err(error) => {
                        crate::tracing_compat::debug!(
                            task_id = %id,
                            error = %error,
                            "task failed"
                        );
                        if kind == TaskKind::Child {
                            self.failures.capture(error);
                        }
                    }
                }
            }
            Err(payload) => {
                self.tasks.remove(&id);
                if kind == TaskKind::Root {
                    resume_unwind(payload);
                }
                let message = panic_message(payload.as_ref());
                crate::tracing_compat::warn!(
                    task_id = %id,
                    panic = %message,
                    "child task panicked; capturing into failure sink"
                );
                self.failures
                    .capture(Error::new(ErrorKind::TaskPanicked).with_message(message));
            }
        }

        self.install_pending();
    }

    /// Installs tasks spawned during the last poll. Unless paused, each
    /// is eagerly polled to its first suspension point, in spawn order.
    fn install_pending(&mut self) {
        loop {
            let pending = self.spawner.drain();
            if pending.is_empty() {
                break;
            }
            for PendingSpawn { id, record } in pending {
                crate::tracing_compat::debug!(task_id = %id, "task spawned");
                self.tasks.insert(id, record);
                if self.paused {
                    self.shared.schedule(id);
                } else {
                    self.poll_task(id);
                }
            }
        }
    }

    /// Returns the earliest deadline belonging to a live, uncancelled
    /// task, discarding stale heap entries along the way.
    fn next_live_deadline(&mut self) -> Option<Time> {
        let mut timers = self.shared.timers.lock();
        loop {
            let (task, deadline) = timers.peek()?;
            let live = self
                .tasks
                .get(&task)
                .is_some_and(|record| !record.is_cancelled());
            if live {
                return Some(deadline);
            }
            timers.pop();
        }
    }

    fn step_limit_reached(&mut self) -> bool {
        let Some(max_steps) = self.config.max_steps else {
            return false;
        };
        if self.steps < max_steps {
            return false;
        }
        if !self.step_limit_hit {
            self.step_limit_hit = true;
            crate::tracing_compat::error!(
                steps = self.steps,
                "step limit reached; scheduler stops draining"
            );
        }
        true
    }
}

impl Default for LabRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LabRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabRuntime")
            .field("now", &self.now())
            .field("tasks", &self.tasks.len())
            .field("paused", &self.paused)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Extracts a human-readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic payload of unknown type".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::Mutex;
    use std::time::Duration;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn spawn_is_eager_up_to_first_suspension() {
        init_test("spawn_is_eager_up_to_first_suspension");
        let mut lab = LabRuntime::new();
        let trace = Arc::new(Mutex::new(Vec::new()));

        let events = Arc::clone(&trace);
        lab.spawn(move |cx| async move {
            events.lock().expect("lock poisoned").push("before sleep");
            cx.sleep(Duration::from_millis(50)).await;
            events.lock().expect("lock poisoned").push("after sleep");
            Ok(())
        });

        let seen = trace.lock().expect("lock poisoned").clone();
        crate::assert_with_log!(
            seen == vec!["before sleep"],
            "task ran to its first suspension inside spawn",
            vec!["before sleep"],
            seen
        );
        crate::test_complete!("spawn_is_eager_up_to_first_suspension");
    }

    #[test]
    fn advance_by_rejects_negative_durations() {
        init_test("advance_by_rejects_negative_durations");
        let mut lab = LabRuntime::new();
        let err = lab.advance_by(-1).unwrap_err();
        crate::assert_with_log!(
            err.kind() == ErrorKind::InvalidDuration,
            "negative advance is invalid",
            ErrorKind::InvalidDuration,
            err.kind()
        );
        crate::assert_with_log!(
            lab.now() == Time::ZERO,
            "clock did not move",
            Time::ZERO,
            lab.now()
        );
        crate::test_complete!("advance_by_rejects_negative_durations");
    }

    #[test]
    fn advance_by_releases_deadlines_in_window() {
        init_test("advance_by_releases_deadlines_in_window");
        let mut lab = LabRuntime::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, delay_ms) in [("late", 80_u64), ("early", 20), ("middle", 50)] {
            let order = Arc::clone(&order);
            lab.spawn(move |cx| async move {
                cx.sleep(Duration::from_millis(delay_ms)).await;
                order.lock().expect("lock poisoned").push(label);
                Ok(())
            });
        }

        lab.advance_by(100).expect("advance");
        let seen = order.lock().expect("lock poisoned").clone();
        crate::assert_with_log!(
            seen == vec!["early", "middle", "late"],
            "tasks release in non-decreasing deadline order",
            vec!["early", "middle", "late"],
            seen
        );
        crate::test_complete!("advance_by_releases_deadlines_in_window");
    }

    #[test]
    fn equal_deadlines_release_in_spawn_order() {
        init_test("equal_deadlines_release_in_spawn_order");
        let mut lab = LabRuntime::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            lab.spawn(move |cx| async move {
                cx.sleep(Duration::from_millis(40)).await;
                order.lock().expect("lock poisoned").push(label);
                Ok(())
            });
        }

        lab.advance_by(40).expect("advance");
        let seen = order.lock().expect("lock poisoned").clone();
        crate::assert_with_log!(
            seen == vec!["first", "second", "third"],
            "equal deadlines resolve FIFO by spawn order",
            vec!["first", "second", "third"],
            seen
        );
        crate::test_complete!("equal_deadlines_release_in_spawn_order");
    }

    #[test]
    fn cascading_wakeups_drain_within_one_advance() {
        init_test("cascading_wakeups_drain_within_one_advance");
        let mut lab = LabRuntime::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let events = Arc::clone(&order);
        lab.spawn(move |cx| async move {
            cx.sleep(Duration::from_millis(10)).await;
            events.lock().expect("lock poisoned").push("first hop");
            cx.sleep(Duration::from_millis(10)).await;
            events.lock().expect("lock poisoned").push("second hop");
            Ok(())
        });

        lab.advance_by(20).expect("advance");
        let seen = order.lock().expect("lock poisoned").clone();
        crate::assert_with_log!(
            seen == vec!["first hop", "second hop"],
            "a task re-sleeping inside the window is released again",
            vec!["first hop", "second hop"],
            seen
        );
        crate::test_complete!("cascading_wakeups_drain_within_one_advance");
    }

    #[test]
    fn paused_scheduler_moves_time_but_not_tasks() {
        init_test("paused_scheduler_moves_time_but_not_tasks");
        let mut lab = LabRuntime::new();
        let ran = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&ran);
        lab.pause();
        lab.spawn(move |_cx| async move {
            *flag.lock().expect("lock poisoned") = true;
            Ok(())
        });

        lab.advance_by(500).expect("advance");
        crate::assert_with_log!(
            lab.now() == Time::from_millis(500),
            "time moved while paused",
            Time::from_millis(500),
            lab.now()
        );
        let ran_while_paused = *ran.lock().expect("lock poisoned");
        crate::assert_with_log!(
            !ran_while_paused,
            "task withheld while paused",
            false,
            ran_while_paused
        );

        lab.resume();
        let ran_after_resume = *ran.lock().expect("lock poisoned");
        crate::assert_with_log!(
            ran_after_resume,
            "resume releases the withheld task",
            true,
            ran_after_resume
        );
        crate::test_complete!("paused_scheduler_moves_time_but_not_tasks");
    }

    #[test]
    fn run_to_completion_auto_advances_time() {
        init_test("run_to_completion_auto_advances_time");
        let mut lab = LabRuntime::new();
        let result = lab.run_to_completion(|cx| async move {
            cx.sleep(Duration::from_millis(1_000)).await;
            cx.sleep(Duration::from_millis(2_000)).await;
            Ok(cx.now())
        });
        let end = result.expect("root result");
        crate::assert_with_log!(
            end == Time::from_millis(3_000),
            "root saw both sleeps elapse",
            Time::from_millis(3_000),
            end
        );
        crate::test_complete!("run_to_completion_auto_advances_time");
    }

    #[test]
    fn run_to_completion_propagates_root_failure() {
        init_test("run_to_completion_propagates_root_failure");
        let mut lab = LabRuntime::new();
        let result: Result<(), Error> =
            lab.run_to_completion(|_cx| async { Err(Error::user("root exploded")) });
        let err = result.unwrap_err();
        crate::assert_with_log!(
            err.kind() == ErrorKind::User,
            "root failure surfaces to the caller",
            ErrorKind::User,
            err.kind()
        );
        let empty = lab.failures().is_empty();
        crate::assert_with_log!(empty, "root failure bypasses the sink", true, empty);
        crate::test_complete!("run_to_completion_propagates_root_failure");
    }

    #[test]
    fn child_spawned_from_root_runs_eagerly() {
        init_test("child_spawned_from_root_runs_eagerly");
        let mut lab = LabRuntime::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let events = Arc::clone(&order);
        let result = lab.run_to_completion(move |cx| async move {
            let child_events = Arc::clone(&events);
            cx.spawn(move |cx| async move {
                child_events.lock().expect("lock poisoned").push("child start");
                cx.sleep(Duration::from_millis(10)).await;
                child_events.lock().expect("lock poisoned").push("child end");
                Ok(())
            });
            events.lock().expect("lock poisoned").push("root yields");
            cx.sleep(Duration::from_millis(20)).await;
            events.lock().expect("lock poisoned").push("root end");
            Ok(())
        });
        assert!(result.is_ok());

        let seen = order.lock().expect("lock poisoned").clone();
        crate::assert_with_log!(
            seen == vec!["root yields", "child start", "child end", "root end"],
            "child starts before control leaves the scheduler",
            vec!["root yields", "child start", "child end", "root end"],
            seen
        );
        crate::test_complete!("child_spawned_from_root_runs_eagerly");
    }

    #[test]
    fn stalled_root_reports_instead_of_hanging() {
        init_test("stalled_root_reports_instead_of_hanging");
        let mut lab = LabRuntime::new();
        let result: Result<(), Error> = lab.run_to_completion(|_cx| async {
            std::future::pending::<()>().await;
            Ok(())
        });
        let err = result.unwrap_err();
        crate::assert_with_log!(
            err.kind() == ErrorKind::Stalled,
            "unpollable root is reported as stalled",
            ErrorKind::Stalled,
            err.kind()
        );
        crate::test_complete!("stalled_root_reports_instead_of_hanging");
    }

    #[test]
    fn child_failure_lands_in_sink_not_caller() {
        init_test("child_failure_lands_in_sink_not_caller");
        let mut lab = LabRuntime::new();
        lab.spawn(|_cx| async { Err::<(), _>(Error::user("child exploded")) });

        let failure = lab.failures().first().expect("captured failure");
        crate::assert_with_log!(
            failure.kind() == ErrorKind::User,
            "child failure captured",
            ErrorKind::User,
            failure.kind()
        );
        crate::test_complete!("child_failure_lands_in_sink_not_caller");
    }

    #[test]
    fn child_panic_is_captured_and_run_continues() {
        init_test("child_panic_is_captured_and_run_continues");
        let mut lab = LabRuntime::new();
        let trigger = true;
        lab.spawn(move |_cx| async move {
            if trigger {
                panic!("child blew up");
            }
            Ok(())
        });

        let failure = lab.failures().first().expect("captured panic");
        crate::assert_with_log!(
            failure.kind() == ErrorKind::TaskPanicked,
            "panic becomes a captured failure",
            ErrorKind::TaskPanicked,
            failure.kind()
        );
        crate::assert_with_log!(
            failure.message() == Some("child blew up"),
            "panic message preserved",
            Some("child blew up"),
            failure.message()
        );

        // The scheduler still works after the panic.
        lab.advance_by(10).expect("advance");
        crate::test_complete!("child_panic_is_captured_and_run_continues");
    }

    #[test]
    fn aborted_task_is_removed_without_sink_entry() {
        init_test("aborted_task_is_removed_without_sink_entry");
        let mut lab = LabRuntime::new();
        let handle = lab.spawn(|cx| async move {
            cx.sleep(Duration::from_millis(100)).await;
            Ok(())
        });

        handle.abort();
        lab.advance_until_idle();

        crate::assert_with_log!(
            lab.now() == Time::ZERO,
            "idle advance does not chase a cancelled task's deadline",
            Time::ZERO,
            lab.now()
        );
        let empty = lab.failures().is_empty();
        crate::assert_with_log!(empty, "cancellation is not a failure", true, empty);
        let err = handle.try_join().unwrap_err();
        crate::assert_with_log!(
            err.is_cancelled(),
            "handle observes cancellation",
            true,
            err.is_cancelled()
        );
        crate::test_complete!("aborted_task_is_removed_without_sink_entry");
    }

    #[test]
    fn step_limit_stops_a_yield_loop() {
        init_test("step_limit_stops_a_yield_loop");
        let mut lab = LabRuntime::with_config(LabConfig::new().max_steps(100));
        lab.spawn(|cx| async move {
            for _ in 0..u64::MAX {
                cx.yield_now().await;
            }
            Ok(())
        });

        lab.advance_until_idle();
        crate::assert_with_log!(
            lab.steps() <= 101,
            "drain stops at the step limit",
            101_u64,
            lab.steps()
        );
        crate::test_complete!("step_limit_stops_a_yield_loop");
    }

    #[test]
    fn try_join_returns_spawned_value() {
        init_test("try_join_returns_spawned_value");
        let mut lab = LabRuntime::new();
        let handle = lab.spawn(|cx| async move {
            cx.sleep(Duration::from_millis(30)).await;
            Ok(7_u32)
        });

        assert!(matches!(handle.try_join(), Ok(None)));
        lab.advance_by(30).expect("advance");
        let joined = handle.try_join().expect("join");
        crate::assert_with_log!(
            joined == Some(7),
            "value delivered after the task completes",
            Some(7_u32),
            joined
        );
        crate::test_complete!("try_join_returns_spawned_value");
    }
}
