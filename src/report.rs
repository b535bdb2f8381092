//! Failure reporting capability handed to the collaborator.

use std::sync::{Mutex, PoisonError};

/// Sink for test failures raised while verifying mock calls.
pub trait TestReporter: Send + Sync {
    /// Record a failure and continue.
    fn error(&self, message: &str);

    /// Record a failure and abort the current test thread.
    fn fatal(&self, message: &str) -> !;
}

/// Reporter failing the surrounding `#[test]` by panicking on every failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl TestReporter for PanicReporter {
    fn error(&self, message: &str) {
        panic!("{message}");
    }

    fn fatal(&self, message: &str) -> ! {
        panic!("{message}");
    }
}

/// Panic payload raised by [`RecordingReporter::fatal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalFailure(pub String);

/// Reporter collecting failures for later inspection.
///
/// Suited for harnesses that expect some runs to fail, such as call-order permutation tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any failure was recorded.
    pub fn failed(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Recorded failure messages in order.
    pub fn failures(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TestReporter for RecordingReporter {
    fn error(&self, message: &str) {
        tracing::warn!(%message, "mock verification failure");
        self.lock().push(message.to_string());
    }

    fn fatal(&self, message: &str) -> ! {
        self.error(message);
        std::panic::panic_any(FatalFailure(message.to_string()))
    }
}
