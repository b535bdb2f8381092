//! # kitchensink-mock
//!
//! `kitchensink-mock` declares, compositionally, the permitted relative and concurrent order of
//! the calls a unit makes against its mocked dependencies. It is organized around:
//! - `combinator`: `setup`, `chain`, `parallel`, `detach` and `sub` building ordering trees
//! - `anchor`: propagation wiring occurs-after constraints onto expectations
//! - `mocks`: the per-test handler with its mock registry
//! - `completion`: completion counting for calls issued from concurrent execution paths
//! - `controller`: a reference call-matching collaborator (feature `controller`)
//!
//! Argument matching, return stubbing and verdicts belong to the collaborator; the core only
//! builds ordering constraints and tracks completions.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod anchor;
pub mod combinator;
pub mod completion;
pub mod config;
pub mod error;
pub mod mocks;
pub mod node;
pub mod prelude;
pub mod range;
pub mod registry;
pub mod report;
mod sync;

#[cfg(feature = "controller")]
#[cfg_attr(docsrs, doc(cfg(feature = "controller")))]
pub mod controller;
