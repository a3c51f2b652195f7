//! Shared setup for the integration tests and the permission-sensitive unit tests.

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Routes search logs to the test output, filtered by `RUST_LOG`.
///
/// Only the integration tests call this. Library unit tests capture logs with
/// `tracing_test`, which installs its own global subscriber.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        // Another global subscriber may already be set.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Whether the process has UID 0. Root reads a `0o000` directory anyway, so
/// the walker's unreadable-directory test has nothing to check there.
#[cfg(test)]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid takes no arguments and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
