//! Logging shim over the `tracing` crate.
//!
//! Runtime code logs through `crate::tracing_compat::{trace, debug, info,
//! warn, error}` instead of naming `tracing` directly. With the `tracing`
//! feature enabled (the default) these forward to the real macros; without
//! it they compile to nothing, so the runtime builds with no logging
//! backend at all.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! info {
        ($($arg:tt)*) => {};
    }
    macro_rules! warn_ {
        ($($arg:tt)*) => {};
    }
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {debug, error, info, trace, warn_ as warn};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use disabled::{debug, error, info, trace, warn};
