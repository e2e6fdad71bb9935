//! Error types and error handling strategy for timelab.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Failures inside spawned tasks never cross task boundaries implicitly;
//!   they are routed to the [`FailureSink`](crate::sink::FailureSink)
//! - Panics inside child tasks are isolated and converted to
//!   [`ErrorKind::TaskPanicked`]
//!
//! # Error Categories
//!
//! - **Time**: malformed virtual-time advancement requests
//! - **Cancellation**: task aborted or cancellation observed at a checkpoint
//! - **Task**: failures surfacing from task execution
//! - **Sink**: failure-sink query errors
//! - **Internal**: runtime bugs and invalid states
//! - **User**: failures injected by task code under test

use core::fmt;
use std::sync::Arc;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Time ===
    /// A time advancement was requested with a negative or otherwise
    /// malformed duration.
    InvalidDuration,

    // === Cancellation ===
    /// The task was cancelled.
    Cancelled,

    // === Task ===
    /// A child task panicked; the payload message is preserved on the error.
    TaskPanicked,
    /// The root computation can never make progress: nothing is runnable
    /// and no timer is pending.
    Stalled,

    // === Sink ===
    /// `first()` was called on a failure sink with no captured failures.
    EmptySink,

    // === Internal / state machine ===
    /// Internal runtime error (bug).
    Internal,

    // === User ===
    /// User-provided error.
    User,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDuration => ErrorCategory::Time,
            Self::Cancelled => ErrorCategory::Cancellation,
            Self::TaskPanicked | Self::Stalled => ErrorCategory::Task,
            Self::EmptySink => ErrorCategory::Sink,
            Self::Internal => ErrorCategory::Internal,
            Self::User => ErrorCategory::User,
        }
    }

    /// Returns a short static name for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDuration => "invalid duration",
            Self::Cancelled => "cancelled",
            Self::TaskPanicked => "task panicked",
            Self::Stalled => "stalled",
            Self::EmptySink => "empty failure sink",
            Self::Internal => "internal error",
            Self::User => "user error",
        }
    }
}

/// High-level error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Virtual-time manipulation failures.
    Time,
    /// Cancellation-related failures.
    Cancellation,
    /// Task execution failures.
    Task,
    /// Failure-sink query failures.
    Sink,
    /// Internal runtime errors.
    Internal,
    /// User-originated errors.
    User,
}

/// The main error type for timelab operations.
///
/// Errors are cheap to clone: the optional source is reference-counted so a
/// single failure can be delivered both to a task handle and to the failure
/// sink without duplication.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a user-originated error with a message.
    ///
    /// This is the conventional way for task code under test to inject a
    /// failure that the harness should capture.
    #[must_use]
    pub fn user(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::User).with_message(msg)
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Returns true if this error came from a panicking task.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self.kind, ErrorKind::TaskPanicked)
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {msg}", self.kind.as_str()),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
