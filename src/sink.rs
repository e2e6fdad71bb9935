//! Capture point for unhandled task failures.
//!
//! A failure raised inside a spawned (non-root) task with no enclosing
//! handler does not abort sibling tasks or the scheduler: the runtime
//! redirects it here, insertion-ordered, where assertions can inspect it
//! after the run. The sink is append-only during a run.

use crate::error::{Error, ErrorKind};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Ordered, shared collection of captured failures.
///
/// Handles are cheap clones sharing one collection; the runtime owns one
/// and hands out clones via
/// [`LabRuntime::failures`](crate::lab::LabRuntime::failures).
#[derive(Clone, Default)]
pub struct FailureSink {
    inner: Arc<Mutex<Vec<Error>>>,
}

impl FailureSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure to the sink.
    pub fn capture(&self, failure: Error) {
        self.inner.lock().push(failure);
    }

    /// Returns the first captured failure.
    ///
    /// # Errors
    ///
    /// Returns an error with kind [`ErrorKind::EmptySink`] if nothing has
    /// been captured.
    pub fn first(&self) -> Result<Error, Error> {
        self.inner
            .lock()
            .first()
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::EmptySink))
    }

    /// Returns all captured failures in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Error> {
        self.inner.lock().clone()
    }

    /// Returns the number of captured failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if no failure has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl fmt::Debug for FailureSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureSink")
            .field("captured", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_on_empty_sink_reports_empty() {
        let sink = FailureSink::new();
        assert!(sink.is_empty());
        let err = sink.first().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptySink);
    }

    #[test]
    fn capture_preserves_insertion_order() {
        let sink = FailureSink::new();
        sink.capture(Error::user("one"));
        sink.capture(Error::user("two"));

        let first = sink.first().expect("non-empty");
        assert_eq!(first.message(), Some("one"));

        let all = sink.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].message(), Some("two"));
    }

    #[test]
    fn clones_share_the_collection() {
        let sink = FailureSink::new();
        let writer = sink.clone();
        writer.capture(Error::user("shared"));
        assert_eq!(sink.len(), 1);
    }
}
