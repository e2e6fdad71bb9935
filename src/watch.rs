//! Hot, latest-value-only broadcast cell.
//!
//! A [`StateCell`] is the hot counterpart to
//! [`LazySequence`](crate::stream::LazySequence): readers never wait for a
//! value, because the cell always holds one — the initial value at
//! creation, then whatever was written last. Writes overwrite; there is
//! no buffering of historical values.
//!
//! Because the lab executor is single-threaded and cooperative, a write
//! is visible to every subsequent read without any clock advance — a
//! task cannot be interrupted between a write and a read.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

struct CellState<T> {
    value: T,
    version: u64,
}

/// Shared slot holding the most recent value.
///
/// Handles are cheap clones sharing one slot; every reader observes the
/// latest write.
///
/// # Example
///
/// ```
/// use timelab::watch::StateCell;
///
/// let cell = StateCell::new(String::new());
/// assert_eq!(cell.get(), "");
///
/// cell.set("StateFlowEmission".to_string());
/// assert_eq!(cell.get(), "StateFlowEmission");
/// ```
pub struct StateCell<T> {
    shared: Arc<Mutex<CellState<T>>>,
}

impl<T: Clone> StateCell<T> {
    /// Creates a cell holding `initial`.
    ///
    /// A `get` before any `set` returns exactly this value.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Mutex::new(CellState {
                value: initial,
                version: 0,
            })),
        }
    }

    /// Returns a clone of the current value. Never suspends.
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.lock().value.clone()
    }

    /// Replaces the current value immediately.
    ///
    /// The previous value is dropped, not queued; the write is visible to
    /// all subsequent `get` calls on any handle.
    pub fn set(&self, value: T) {
        let mut state = self.shared.lock();
        state.value = value;
        state.version += 1;
    }

    /// Returns the number of writes applied so far (0 before any `set`).
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.lock().version
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("StateCell")
            .field("value", &state.value)
            .field("version", &state.version)
            .finish()
    }
}
