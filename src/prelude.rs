//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used items from this crate.
//!
//! # Example
//!
//! ```rust
//! use kitchensink_mock::prelude::*;
//! ```

pub use crate::combinator::{SetupFunc, chain, detach, parallel, setup, sub};
pub use crate::completion::{Completion, CompletionHook, Hook};
pub use crate::config::MocksConfig;
pub use crate::error::MockError;
pub use crate::mocks::{Collaborator, Mocks};
pub use crate::node::{DetachMode, Expectation, IntoNode, Node};
pub use crate::report::{PanicReporter, RecordingReporter, TestReporter};

#[cfg(feature = "controller")]
pub use crate::controller::{Call, Controller, Recorder};
