//! Ordering node model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MockError;

/// Handle on one anticipated call, owned by the call-matching collaborator.
///
/// Handles are cheap clones referring to the same underlying expectation.
pub trait Expectation: Clone + fmt::Debug + Send + Sync + 'static {
    /// Register that `self` must occur after `predecessor`.
    fn after(&self, predecessor: &Self);

    /// Identity comparison: whether both handles refer to the same expectation.
    fn same(&self, other: &Self) -> bool;
}

/// How a node is decoupled from the surrounding ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetachMode {
    /// No detachment.
    None,
    /// Do not order the node after its predecessors.
    Head,
    /// Do not order successors after the node.
    Tail,
    /// Neither of the above.
    Both,
}

impl fmt::Display for DetachMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Head => "Head",
            Self::Tail => "Tail",
            Self::Both => "Both",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for DetachMode {
    type Error = MockError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::None),
            1 => Ok(Self::Head),
            2 => Ok(Self::Tail),
            3 => Ok(Self::Both),
            other => Err(MockError::UnsupportedDetachMode(other)),
        }
    }
}

/// Composed set of expectations.
#[derive(Debug, Clone)]
pub enum Node<E> {
    /// One expectation.
    Single(E),
    /// Strictly sequenced children.
    Chain(Vec<Node<E>>),
    /// Children sharing the same predecessors, joined afterwards.
    Parallel(Vec<Node<E>>),
    /// Children ignoring their predecessors.
    DetachHead(Vec<Node<E>>),
    /// Children not constraining their successors.
    DetachTail(Vec<Node<E>>),
    /// Children decoupled in both directions.
    DetachBoth(Vec<Node<E>>),
    /// Nothing to order.
    Empty,
}

impl<E> Node<E> {
    /// Detach mode of the node, if it is a detach wrapper.
    pub fn detach_mode(&self) -> Option<DetachMode> {
        match self {
            Self::DetachHead(_) => Some(DetachMode::Head),
            Self::DetachTail(_) => Some(DetachMode::Tail),
            Self::DetachBoth(_) => Some(DetachMode::Both),
            _ => None,
        }
    }

    /// Wrap `self` according to `mode`.
    pub fn detached(self, mode: DetachMode) -> Self {
        match mode {
            DetachMode::None => self,
            DetachMode::Head => Self::DetachHead(vec![self]),
            DetachMode::Tail => Self::DetachTail(vec![self]),
            DetachMode::Both => Self::DetachBoth(vec![self]),
        }
    }

    /// Whether the node orders nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Values a leaf producer may hand to a combinator.
///
/// The set is closed: anything that is not an expectation (or a composition of them) turns
/// into [`MockError::Composition`].
pub trait IntoNode<E> {
    /// Convert into an ordering node.
    fn into_node(self) -> Result<Node<E>, MockError>;
}

impl<E> IntoNode<E> for Node<E> {
    fn into_node(self) -> Result<Node<E>, MockError> {
        Ok(self)
    }
}

impl<E> IntoNode<E> for () {
    fn into_node(self) -> Result<Node<E>, MockError> {
        Ok(Node::Empty)
    }
}

impl<E, T> IntoNode<E> for Option<T>
where
    T: IntoNode<E>,
{
    fn into_node(self) -> Result<Node<E>, MockError> {
        self.map_or(Ok(Node::Empty), IntoNode::into_node)
    }
}

impl<E, T> IntoNode<E> for Result<T, MockError>
where
    T: IntoNode<E>,
{
    fn into_node(self) -> Result<Node<E>, MockError> {
        self?.into_node()
    }
}
