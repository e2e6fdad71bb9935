//! Deterministic lab runtime for testing.
//!
//! The lab runtime provides:
//!
//! - Virtual time (no wall-clock dependencies)
//! - Cooperative single-threaded scheduling with FIFO tie-breaks
//! - Pause/resume control over task release
//! - Failure capture for unhandled child-task errors

pub mod config;
pub mod runtime;

pub use config::LabConfig;
pub use runtime::LabRuntime;
