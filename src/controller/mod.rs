//! Reference call-matching collaborator.
//!
//! [`Controller`] records expected calls ([`Call`]) per receiver and method, matches actual
//! calls against them in registration order, enforces the occurs-after relations registered
//! by the ordering combinators, runs attached hooks and hands back stubbed return values.
//! Mock implementations are written against it by hand:
//!
//! ```
//! use std::sync::Arc;
//!
//! use kitchensink_mock::prelude::*;
//!
//! struct MockStore {
//!     ctrl: Controller,
//! }
//!
//! impl MockStore {
//!     fn new(ctrl: &Controller) -> Self {
//!         Self { ctrl: ctrl.clone() }
//!     }
//!
//!     fn expect(&self) -> Recorder {
//!         self.ctrl.recorder("MockStore")
//!     }
//!
//!     fn load(&self, key: &str) -> String {
//!         self.ctrl.call("MockStore", "load", (key.to_string(),))
//!     }
//! }
//!
//! fn load(key: &str, value: &str) -> SetupFunc<Controller> {
//!     let (key, value) = (key.to_string(), value.to_string());
//!     SetupFunc::new(move |mocks: &Mocks<Controller>| -> Result<Call, MockError> {
//!         let call = mocks
//!             .get(MockStore::new)
//!             .expect()
//!             .expect_call("load", (key.clone(),))
//!             .returns(value.clone())
//!             .times(mocks.times(1));
//!         Ok(call.run(mocks.done_hook(1)?))
//!     })
//! }
//!
//! let mocks: Mocks<Controller> = Mocks::new(Arc::new(PanicReporter));
//! mocks.expect(chain([load("a", "1"), load("b", "2")]))?;
//!
//! let store = mocks.get(MockStore::new);
//! assert_eq!(store.load("a"), "1");
//! assert_eq!(store.load("b"), "2");
//! mocks.wait();
//! # Ok::<(), MockError>(())
//! ```

mod args;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

pub use args::Args;

use crate::completion::Hook;
use crate::error::MockError;
use crate::mocks::Collaborator;
use crate::node::{Expectation, IntoNode, Node};
use crate::report::TestReporter;

type Value = Arc<dyn Any + Send + Sync>;

struct CallState {
    receiver: &'static str,
    method: &'static str,
    args: Value,
    args_eq: fn(&dyn Any, &dyn Any) -> bool,
    args_text: String,
    arity: usize,
    times: usize,
    invoked: usize,
    prereqs: Vec<usize>,
    // Set once a successor was called; the call may not match anymore.
    closed: bool,
    hooks: Vec<Arc<dyn Hook>>,
    returns: Option<Value>,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.receiver, self.method, self.args_text)
    }
}

#[derive(Default)]
struct State {
    calls: Vec<CallState>,
}

struct Inner {
    state: Mutex<State>,
    reporter: Arc<dyn TestReporter>,
}

/// Call-matching controller shared by every mock of a test.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    /// Create a controller reporting failures to `reporter`.
    pub fn new(reporter: Arc<dyn TestReporter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                reporter,
            }),
        }
    }

    /// Recorder declaring expectations for `receiver`.
    pub fn recorder(&self, receiver: &'static str) -> Recorder {
        Recorder {
            ctrl: self.clone(),
            receiver,
        }
    }

    /// Declare one expected call of `receiver.method(args)` with cardinality one.
    pub fn expect_call<A: Args>(
        &self,
        receiver: &'static str,
        method: &'static str,
        args: A,
    ) -> Call {
        let mut state = self.lock();
        let id = state.calls.len();
        state.calls.push(CallState {
            receiver,
            method,
            args_text: format!("{args:?}"),
            args: Arc::new(args),
            args_eq: args_eq::<A>,
            arity: A::ARITY,
            times: 1,
            invoked: 0,
            prereqs: Vec::new(),
            closed: false,
            hooks: Vec::new(),
            returns: None,
        });
        trace!(receiver, method, id, "declared expected call");
        Call {
            id,
            ctrl: self.clone(),
        }
    }

    /// Dispatch an actual call and return its stubbed value.
    ///
    /// Calls are matched in registration order. A candidate is skipped when its arguments
    /// differ, its cardinality is exhausted, a predecessor is not satisfied yet, or a successor
    /// was already called. Without a match the failure is fatal. Without a stubbed value the
    /// default of `R` is returned.
    pub fn call<A, R>(&self, receiver: &'static str, method: &'static str, args: A) -> R
    where
        A: Args,
        R: Clone + Default + 'static,
    {
        let mut state = self.lock();
        let mut reasons = Vec::new();
        let mut matched = None;
        for (id, call) in state.calls.iter().enumerate() {
            if call.receiver != receiver || call.method != method {
                continue;
            }
            if !(call.args_eq)(call.args.as_ref(), &args) {
                reasons.push(format!("expected call {call} doesn't match the arguments"));
                continue;
            }
            if call.closed {
                reasons.push(format!(
                    "expected call {call} may not be called after a successor was called"
                ));
                continue;
            }
            if call.invoked >= call.times {
                reasons.push(format!(
                    "expected call {call} has already been called the max number of times"
                ));
                continue;
            }
            let pending = call
                .prereqs
                .iter()
                .map(|&pre| &state.calls[pre])
                .find(|pre| pre.invoked < pre.times);
            if let Some(pre) = pending {
                reasons.push(format!(
                    "expected call {call} doesn't have a prerequisite call satisfied: \
                     {pre} should be called before {call}"
                ));
                continue;
            }
            matched = Some(id);
            break;
        }

        let Some(id) = matched else {
            drop(state);
            let because = if reasons.is_empty() {
                "there are no expected calls of this method".to_string()
            } else {
                reasons.join("\n")
            };
            debug!(receiver, method, "unexpected call");
            self.inner.reporter.fatal(&format!(
                "unexpected call to {receiver}.{method}{args:?} because: {because}"
            ))
        };

        let prereqs = std::mem::take(&mut state.calls[id].prereqs);
        for &pre in &prereqs {
            state.calls[pre].closed = true;
        }
        let call = &mut state.calls[id];
        call.prereqs = prereqs;
        call.invoked += 1;
        trace!(receiver, method, id, invoked = call.invoked, "matched expected call");
        let hooks = call.hooks.clone();
        let returns = call.returns.clone();
        drop(state);

        let list = args.as_any_list();
        for hook in &hooks {
            hook.invoke(&list);
        }

        match returns {
            None => R::default(),
            Some(value) => match value.downcast_ref::<R>() {
                Some(value) => value.clone(),
                None => self.inner.reporter.fatal(&format!(
                    "wrong return type for {receiver}.{method}: expected {}",
                    std::any::type_name::<R>()
                )),
            },
        }
    }

    /// Report every expected call invoked fewer times than its cardinality.
    pub fn finish(&self) {
        let missing: Vec<String> = self
            .lock()
            .calls
            .iter()
            .filter(|call| call.invoked < call.times)
            .map(|call| {
                format!(
                    "missing call(s) to {call}: expected {} time(s), called {}",
                    call.times, call.invoked
                )
            })
            .collect();
        for message in missing {
            self.inner.reporter.error(&message);
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Collaborator for Controller {
    type Expectation = Call;

    fn from_reporter(reporter: Arc<dyn TestReporter>) -> Self {
        Self::new(reporter)
    }

    fn finish(&self) {
        Controller::finish(self);
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("calls", &self.lock().calls.len())
            .finish()
    }
}

fn args_eq<A: Args>(expected: &dyn Any, actual: &dyn Any) -> bool {
    match (expected.downcast_ref::<A>(), actual.downcast_ref::<A>()) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

/// Declares expected calls on behalf of one mock.
///
/// A recorder is not an expectation itself: handing it to a combinator is a composition
/// error.
#[derive(Clone)]
pub struct Recorder {
    ctrl: Controller,
    receiver: &'static str,
}

impl Recorder {
    /// Declare one expected call of `method(args)`.
    pub fn expect_call<A: Args>(&self, method: &'static str, args: A) -> Call {
        self.ctrl.expect_call(self.receiver, method, args)
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("receiver", &self.receiver)
            .finish()
    }
}

impl IntoNode<Call> for Recorder {
    fn into_node(self) -> Result<Node<Call>, MockError> {
        Err(MockError::composition::<Self>())
    }
}

/// Handle on one expected call.
#[derive(Clone)]
pub struct Call {
    id: usize,
    ctrl: Controller,
}

impl Call {
    /// Set the exact number of expected invocations.
    pub fn times(self, n: usize) -> Self {
        self.ctrl.lock().calls[self.id].times = n;
        self
    }

    /// Stub the value returned on every invocation.
    pub fn returns<R: Send + Sync + 'static>(self, value: R) -> Self {
        self.ctrl.lock().calls[self.id].returns = Some(Arc::new(value));
        self
    }

    /// Attach a side effect run on every invocation.
    ///
    /// A hook not accepting the call's argument count is a fatal setup failure.
    pub fn run<H: Hook + 'static>(self, hook: H) -> Self {
        let mut state = self.ctrl.lock();
        let call = &mut state.calls[self.id];
        if !hook.accepts(call.arity) {
            let message = format!(
                "hook does not accept the {} argument(s) of {call}",
                call.arity
            );
            drop(state);
            self.ctrl.inner.reporter.fatal(&message);
        }
        call.hooks.push(Arc::new(hook));
        drop(state);
        self
    }

    /// Number of invocations so far.
    pub fn invoked(&self) -> usize {
        self.ctrl.lock().calls[self.id].invoked
    }
}

impl Expectation for Call {
    fn after(&self, predecessor: &Self) {
        let mut state = self.ctrl.lock();
        let prereqs = &mut state.calls[self.id].prereqs;
        if !prereqs.contains(&predecessor.id) {
            prereqs.push(predecessor.id);
        }
    }

    fn same(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.ctrl.inner, &other.ctrl.inner)
    }
}

impl IntoNode<Call> for Call {
    fn into_node(self) -> Result<Node<Call>, MockError> {
        Ok(Node::Single(self))
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call({})", self.ctrl.lock().calls[self.id])
    }
}
