//! Composition and setup errors.

use thiserror::Error;

use crate::node::DetachMode;

/// Setup-time defects raised by combinators and callback factories.
///
/// Every variant describes a programming error in the test setup. None of them is recoverable,
/// and none is ever silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// A combinator received a value that does not produce an ordering node.
    #[error("type [{type_name}] is not based on an expectation")]
    Composition {
        /// Name of the offending type.
        type_name: &'static str,
    },
    /// A raw detach mode outside `None`, `Head`, `Tail`, `Both`.
    #[error("detach mode [{0}] is not supported")]
    UnsupportedDetachMode(u8),
    /// `sub` was applied to a detached node.
    #[error("detach [{0}] not supported in sub")]
    DetachNotAllowedInSub(DetachMode),
    /// A completion callback was requested with an arity outside the supported table.
    #[error("argument number not supported: {argc}")]
    UnsupportedArity {
        /// Requested argument count.
        argc: usize,
        /// Whether the variadic table was requested.
        variadic: bool,
    },
}

impl MockError {
    /// Composition error naming the type `T`.
    pub fn composition<T: ?Sized>() -> Self {
        Self::Composition {
            type_name: std::any::type_name::<T>(),
        }
    }
}
