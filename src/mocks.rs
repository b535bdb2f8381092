//! Mock handler tying together collaborator, registry and completion tracking.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug_span;

use crate::combinator::{SetupFunc, setup};
use crate::completion::{Completion, CompletionHook};
use crate::config::MocksConfig;
use crate::error::MockError;
use crate::node::Expectation;
use crate::registry::Registry;
use crate::report::TestReporter;

/// Call-matching engine recording expectations and verifying actual calls.
pub trait Collaborator: Send + Sync + 'static {
    /// Handle on one expected call.
    type Expectation: Expectation;

    /// Create the collaborator reporting failures to `reporter`.
    fn from_reporter(reporter: Arc<dyn TestReporter>) -> Self;

    /// Report expectations whose cardinality was not met.
    fn finish(&self);
}

/// Mock handler for one test.
///
/// Lifecycle: created, constraints registered through [`Mocks::expect`], exercised by the
/// code under test, verified through [`Mocks::finish`] (or on drop), disposed.
pub struct Mocks<C: Collaborator> {
    collaborator: C,
    registry: Registry,
    completion: Completion,
    config: MocksConfig,
    finished: AtomicBool,
}

impl<C: Collaborator> Mocks<C> {
    /// Create a handler reporting failures to `reporter`.
    pub fn new(reporter: Arc<dyn TestReporter>) -> Self {
        Self::with_config(reporter, MocksConfig::default())
    }

    /// Create a handler with explicit configuration.
    pub fn with_config(reporter: Arc<dyn TestReporter>, config: MocksConfig) -> Self {
        Self {
            collaborator: C::from_reporter(reporter),
            registry: Registry::new(),
            completion: Completion::new(),
            config,
            finished: AtomicBool::new(false),
        }
    }

    /// Register the ordering constraints of `calls` as a detached root.
    pub fn expect(&self, calls: SetupFunc<C>) -> Result<(), MockError> {
        let label = self.config.label.as_deref().unwrap_or_default();
        let _span = debug_span!("mock_setup", label).entered();
        setup([calls]).build(self)?;
        Ok(())
    }

    /// Resolve the mock of type `M`, creating it on first use.
    ///
    /// `creator` may itself resolve other mock types, e.g. to build a composite mock.
    pub fn get<M, F>(&self, creator: F) -> Arc<M>
    where
        M: Send + Sync + 'static,
        F: FnOnce(&C) -> M,
    {
        self.registry.resolve(|| creator(&self.collaborator))
    }

    /// Expect `n` more completions and return `n`.
    pub fn times(&self, n: usize) -> usize {
        self.completion.times(n)
    }

    /// Completion hook with fixed arity, see [`Completion::done_hook`].
    pub fn done_hook(&self, argc: usize) -> Result<CompletionHook, MockError> {
        self.completion.done_hook(argc)
    }

    /// Completion hook with variadic arity, see [`Completion::var_done_hook`].
    pub fn var_done_hook(&self, argc: usize) -> Result<CompletionHook, MockError> {
        self.completion.var_done_hook(argc)
    }

    /// Panicking completion hook with fixed arity, see [`Completion::panic_hook`].
    pub fn panic_hook(
        &self,
        argc: usize,
        reason: impl Into<String>,
    ) -> Result<CompletionHook, MockError> {
        self.completion.panic_hook(argc, reason)
    }

    /// Panicking completion hook with variadic arity, see [`Completion::var_panic_hook`].
    pub fn var_panic_hook(
        &self,
        argc: usize,
        reason: impl Into<String>,
    ) -> Result<CompletionHook, MockError> {
        self.completion.var_panic_hook(argc, reason)
    }

    /// Shared completion counter, cloneable into other threads.
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// Block until every expected completion was signalled.
    pub fn wait(&self) {
        self.completion.wait();
    }

    /// Verify unmet cardinalities. Runs at most once.
    pub fn finish(&self) {
        if !self.finished.swap(true, Ordering::SeqCst) {
            self.collaborator.finish();
        }
    }

    /// Underlying call-matching collaborator.
    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    /// Handler configuration.
    pub fn config(&self) -> &MocksConfig {
        &self.config
    }
}

impl<C: Collaborator> Drop for Mocks<C> {
    fn drop(&mut self) {
        if self.config.verify_on_drop && !std::thread::panicking() {
            self.finish();
        }
    }
}

impl<C: Collaborator + fmt::Debug> fmt::Debug for Mocks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mocks")
            .field("collaborator", &self.collaborator)
            .field("mocks", &self.registry.len())
            .field("completion", &self.completion)
            .field("config", &self.config)
            .finish()
    }
}
