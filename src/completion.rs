//! Completion synchronization for calls issued from concurrent execution paths.
//!
//! A [`Completion`] tracks the number of expected calls that have not completed yet. Tests
//! declare the count up front with [`Completion::times`], attach a [`CompletionHook`] as the
//! side effect of each expected call, and block in [`Completion::wait`] until every hook has
//! fired.
//!
//! Hooks receive the arguments of the call they are attached to. The arity tables are
//! closed: fixed hooks accept `0..=9` arguments, variadic hooks `1..=9` parameters where the
//! last one is the open tail.

use std::any::Any;
use std::fmt;

use tracing::trace;

use crate::error::MockError;
use crate::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Largest supported hook arity.
pub const MAX_ARITY: usize = 9;

/// Side effect run on every matched call.
pub trait Hook: Send + Sync {
    /// Whether the hook can be attached to a call taking `argc` arguments.
    fn accepts(&self, _argc: usize) -> bool {
        true
    }

    /// Run the side effect with the call's arguments.
    fn invoke(&self, args: &[&dyn Any]);
}

impl<F> Hook for F
where
    F: Fn(&[&dyn Any]) + Send + Sync,
{
    fn invoke(&self, args: &[&dyn Any]) {
        self(args);
    }
}

/// Parameter shape of a completion hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many positional parameters.
    Fixed(usize),
    /// This many parameters, the last one being an open-ended tail.
    Variadic(usize),
}

impl Arity {
    /// Fixed arity from the `0..=9` table.
    pub fn fixed(argc: usize) -> Result<Self, MockError> {
        if argc <= MAX_ARITY {
            Ok(Self::Fixed(argc))
        } else {
            Err(MockError::UnsupportedArity {
                argc,
                variadic: false,
            })
        }
    }

    /// Variadic arity from the `1..=9` table.
    pub fn variadic(argc: usize) -> Result<Self, MockError> {
        if (1..=MAX_ARITY).contains(&argc) {
            Ok(Self::Variadic(argc))
        } else {
            Err(MockError::UnsupportedArity {
                argc,
                variadic: true,
            })
        }
    }

    /// Whether a call with `count` arguments fits.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Fixed(argc) => count == argc,
            Self::Variadic(argc) => count + 1 >= argc,
        }
    }
}

struct State {
    outstanding: Mutex<usize>,
    drained: Condvar,
}

/// Shared count of outstanding completions.
#[derive(Clone)]
pub struct Completion {
    state: Arc<State>,
}

impl Completion {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self {
            state: Arc::new(State {
                outstanding: Mutex::new(0),
                drained: Condvar::new(),
            }),
        }
    }

    /// Expect `n` more completions. Returns `n` for inline use in cardinality declarations.
    pub fn times(&self, n: usize) -> usize {
        let mut outstanding = self.lock();
        *outstanding += n;
        trace!(added = n, outstanding = *outstanding, "expecting completions");
        n
    }

    /// Number of completions still outstanding.
    pub fn outstanding(&self) -> usize {
        *self.lock()
    }

    /// Signal one completion.
    ///
    /// # Panics
    /// Panics when no completion is outstanding.
    pub fn done(&self) {
        let mut outstanding = self.lock();
        assert!(*outstanding > 0, "negative outstanding completion count");
        *outstanding -= 1;
        trace!(outstanding = *outstanding, "completion signalled");
        if *outstanding == 0 {
            self.state.drained.notify_all();
        }
    }

    /// Block until no completion is outstanding.
    pub fn wait(&self) {
        let mut outstanding = self.lock();
        while *outstanding > 0 {
            outstanding = self
                .state
                .drained
                .wait(outstanding)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    /// Hook taking exactly `argc` arguments that signals one completion.
    pub fn done_hook(&self, argc: usize) -> Result<CompletionHook, MockError> {
        Ok(self.hook(Arity::fixed(argc)?, None))
    }

    /// Hook taking `argc - 1` leading arguments plus an open tail that signals one completion.
    pub fn var_done_hook(&self, argc: usize) -> Result<CompletionHook, MockError> {
        Ok(self.hook(Arity::variadic(argc)?, None))
    }

    /// Like [`Completion::done_hook`], but panics with `reason` after signalling.
    pub fn panic_hook(
        &self,
        argc: usize,
        reason: impl Into<String>,
    ) -> Result<CompletionHook, MockError> {
        Ok(self.hook(Arity::fixed(argc)?, Some(reason.into())))
    }

    /// Like [`Completion::var_done_hook`], but panics with `reason` after signalling.
    pub fn var_panic_hook(
        &self,
        argc: usize,
        reason: impl Into<String>,
    ) -> Result<CompletionHook, MockError> {
        Ok(self.hook(Arity::variadic(argc)?, Some(reason.into())))
    }

    fn hook(&self, arity: Arity, reason: Option<String>) -> CompletionHook {
        CompletionHook {
            arity,
            completion: self.clone(),
            reason,
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // Panic hooks unwind on purpose; the count stays consistent.
        self.state
            .outstanding
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// Call side effect signalling one completion, optionally panicking afterwards.
#[derive(Debug, Clone)]
pub struct CompletionHook {
    arity: Arity,
    completion: Completion,
    reason: Option<String>,
}

impl CompletionHook {
    /// Parameter shape of the hook.
    pub fn arity(&self) -> Arity {
        self.arity
    }
}

impl Hook for CompletionHook {
    fn accepts(&self, argc: usize) -> bool {
        self.arity.accepts(argc)
    }

    fn invoke(&self, args: &[&dyn Any]) {
        assert!(
            self.arity.accepts(args.len()),
            "completion hook of arity {:?} invoked with {} argument(s)",
            self.arity,
            args.len()
        );
        self.completion.done();
        if let Some(reason) = &self.reason {
            std::panic::panic_any(reason.clone());
        }
    }
}
