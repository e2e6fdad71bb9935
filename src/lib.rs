//! # timelab
//!
//! A deterministic virtual-time lab runtime for testing concurrent
//! producer/consumer code.
//!
//! Asynchronous, time-dependent logic — delayed emissions, pausable
//! execution, failure propagation from background tasks — runs here under
//! full control of a simulated clock rather than wall-clock time. The
//! executor is a single logical thread: exactly one task runs at a time,
//! switching only at explicit suspension points, and virtual time moves
//! only when the test driver says so. The same inputs produce the same
//! interleaving, run after run.
//!
//! # Components
//!
//! - [`lab::LabRuntime`]: the cooperative scheduler and its time controls
//!   (`spawn`, `pause`/`resume`, `advance_by`, `advance_until_idle`,
//!   `run_to_completion`)
//! - [`time::VirtualClock`]: the monotonic virtual-time counter, with
//!   [`time::Sleep`] and [`time::YieldNow`] as its suspension points
//! - [`stream::LazySequence`]: a restartable, pull-driven producer whose
//!   steps may suspend on the virtual clock
//! - [`watch::StateCell`]: a hot, synchronously-readable latest-value
//!   cell
//! - [`sink::FailureSink`]: ordered capture of unhandled child-task
//!   failures
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use timelab::lab::LabRuntime;
//! use timelab::stream::LazySequence;
//!
//! let mut lab = LabRuntime::new();
//!
//! let sequence = LazySequence::new(|cx, emitter| async move {
//!     for round in 0..5 {
//!         cx.sleep(Duration::from_millis(100)).await;
//!         emitter.emit(round);
//!     }
//!     Ok(())
//! });
//!
//! let observed = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&observed);
//! lab.spawn(move |cx| async move {
//!     sequence
//!         .collect(&cx, |value| sink.lock().unwrap().push(value))
//!         .await
//! });
//!
//! assert!(observed.lock().unwrap().is_empty());
//!
//! lab.advance_by(100).unwrap();
//! assert_eq!(*observed.lock().unwrap(), vec![0]);
//!
//! lab.advance_until_idle();
//! assert_eq!(*observed.lock().unwrap(), vec![0, 1, 2, 3, 4]);
//! ```

pub mod cx;
pub mod error;
pub mod lab;
pub mod runtime;
pub mod sink;
pub mod stream;
pub mod time;
pub mod tracing_compat;
pub mod types;
pub mod watch;

#[cfg(test)]
pub mod test_utils;

pub use cx::Cx;
pub use error::{Error, ErrorCategory, ErrorKind};
pub use lab::{LabConfig, LabRuntime};
pub use runtime::TaskHandle;
pub use sink::FailureSink;
pub use stream::LazySequence;
pub use types::{TaskId, Time};
pub use watch::StateCell;
