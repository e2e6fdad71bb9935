//! Configuration for the lab runtime.
//!
//! The configuration is deliberately small: scheduling here is fully
//! deterministic by construction (FIFO tie-breaks, no randomness), so the
//! only knob is the step limit that guards tests against runaway task
//! loops.
//!
//! # Builder Style
//!
//! `LabConfig` uses a fluent, move-based builder style. Each method
//! consumes `self` and returns an updated configuration so options can be
//! chained:
//!
//! ```
//! use timelab::lab::LabConfig;
//!
//! let config = LabConfig::new().max_steps(10_000);
//! assert_eq!(config.max_steps, Some(10_000));
//! ```

/// Configuration for the lab runtime.
#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Maximum number of task polls before the scheduler stops draining.
    ///
    /// A task that yields in a tight loop would otherwise make
    /// `advance_until_idle` spin forever. `None` disables the guard.
    pub max_steps: Option<u64>,
}

impl LabConfig {
    /// Default cap on scheduler steps per runtime.
    pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_steps: Some(Self::DEFAULT_MAX_STEPS),
        }
    }

    /// Sets the maximum number of scheduler steps.
    #[must_use]
    pub fn max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Removes the step limit entirely.
    #[must_use]
    pub fn unlimited_steps(mut self) -> Self {
        self.max_steps = None;
        self
    }
}

impl Default for LabConfig {
    fn default() -> Self {
        Self::new()
    }
}
