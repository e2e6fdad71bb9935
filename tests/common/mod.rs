//! Shared setup for the integration suites.

/// Initializes tracing for tests if not already done.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

/// Phase tracking macro for structured test logging.
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(test = $name, "=== TEST START ===");
    };
}

/// Assertion with logging for better test output.
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {{
        let cond = $cond;
        if !cond {
            tracing::error!(
                message = $msg,
                expected = ?$expected,
                actual = ?$actual,
                "Assertion failed"
            );
        }
        assert!(cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    }};
}
