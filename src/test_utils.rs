//! Shared helpers for the crate's unit tests.

/// Initializes tracing output for a test, once per process.
pub fn init_test_logging() {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .try_init();
    }
}

/// Phase tracking macro for structured test logging.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::tracing_compat::info!(test = $name, "=== TEST START ===");
    };
}

/// Marks a named section within a test.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        $crate::tracing_compat::info!(section = $name, "--- section ---");
    };
}

/// Marks the end of a test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        $crate::tracing_compat::info!(test = $name, "=== TEST COMPLETE ===");
    };
}

/// Assertion with logging for better test output.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {{
        let cond = $cond;
        if !cond {
            $crate::tracing_compat::error!(
                message = $msg,
                expected = ?$expected,
                actual = ?$actual,
                "Assertion failed"
            );
        }
        assert!(cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    }};
}
