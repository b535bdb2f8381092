//! Ordering combinators.
//!
//! Combinators compose [`SetupFunc`]s into a tree of [`Node`]s. Nothing is ordered until the
//! tree is evaluated under a [`setup`] root (as [`Mocks::expect`] does), at which point the
//! anchor propagation wires the occurs-after constraints onto the collaborator's expectations.

use std::fmt;
use std::sync::Arc;

use crate::anchor::propagate;
use crate::error::MockError;
use crate::mocks::{Collaborator, Mocks};
use crate::node::{DetachMode, IntoNode, Node};
use crate::range::{SubSlice, sub_slice};

type Expect<C> = <C as Collaborator>::Expectation;
type BuildFn<C> = dyn Fn(&Mocks<C>) -> Result<Node<Expect<C>>, MockError> + Send + Sync;

/// Deferred mock setup producing an ordering node when evaluated against a handler.
pub struct SetupFunc<C: Collaborator> {
    build: Arc<BuildFn<C>>,
}

impl<C: Collaborator> SetupFunc<C> {
    /// Wrap a leaf producer.
    ///
    /// The producer typically resolves a mock through [`Mocks::get`] and returns the
    /// expectation it declares on it.
    pub fn new<F, R>(producer: F) -> Self
    where
        F: Fn(&Mocks<C>) -> R + Send + Sync + 'static,
        R: IntoNode<Expect<C>>,
    {
        Self {
            build: Arc::new(move |mocks: &Mocks<C>| producer(mocks).into_node()),
        }
    }

    /// Evaluate the setup against `mocks`.
    pub fn build(&self, mocks: &Mocks<C>) -> Result<Node<Expect<C>>, MockError> {
        (self.build)(mocks)
    }
}

impl<C: Collaborator> Clone for SetupFunc<C> {
    fn clone(&self) -> Self {
        Self {
            build: Arc::clone(&self.build),
        }
    }
}

impl<C: Collaborator> fmt::Debug for SetupFunc<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupFunc").finish_non_exhaustive()
    }
}

/// Independently rooted, fully detached setups.
///
/// Each child only keeps its own internal order. The children are ordered neither relative
/// to each other nor to the surrounding context.
pub fn setup<C, I>(children: I) -> SetupFunc<C>
where
    C: Collaborator,
    I: IntoIterator<Item = SetupFunc<C>>,
{
    let children: Vec<_> = children.into_iter().collect();
    SetupFunc::new(move |mocks: &Mocks<C>| -> Result<Node<Expect<C>>, MockError> {
        for child in &children {
            let node = child.build(mocks)?;
            propagate(Vec::new(), &Node::DetachBoth(vec![node]));
        }
        Ok(Node::Empty)
    })
}

/// Strict sequence: every child is ordered after the exit anchors of the previous one.
pub fn chain<C, I>(children: I) -> SetupFunc<C>
where
    C: Collaborator,
    I: IntoIterator<Item = SetupFunc<C>>,
{
    let children: Vec<_> = children.into_iter().collect();
    SetupFunc::new(move |mocks: &Mocks<C>| -> Result<Node<Expect<C>>, MockError> {
        let mut nodes = Vec::with_capacity(children.len());
        for child in &children {
            match child.build(mocks)? {
                Node::Chain(inner) => nodes.extend(inner),
                Node::Empty => {}
                node => nodes.push(node),
            }
        }
        Ok(Node::Chain(nodes))
    })
}

/// Unordered branches sharing the same predecessors.
///
/// Successors of the block are ordered after the exit anchors of every branch.
pub fn parallel<C, I>(children: I) -> SetupFunc<C>
where
    C: Collaborator,
    I: IntoIterator<Item = SetupFunc<C>>,
{
    let children: Vec<_> = children.into_iter().collect();
    SetupFunc::new(move |mocks: &Mocks<C>| -> Result<Node<Expect<C>>, MockError> {
        let nodes = children
            .iter()
            .map(|child| child.build(mocks))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::Parallel(nodes))
    })
}

/// Detach `child` from its predecessors, its successors, or both.
pub fn detach<C: Collaborator>(mode: DetachMode, child: SetupFunc<C>) -> SetupFunc<C> {
    SetupFunc::new(move |mocks: &Mocks<C>| -> Result<Node<Expect<C>>, MockError> {
        Ok(child.build(mocks)?.detached(mode))
    })
}

/// Select the inclusive range `[from, to]` of the sequence `child` realizes.
///
/// Negative indexes count from the end, out-of-range indexes are clamped and reversed
/// indexes are swapped. The internal order of `child` is registered before slicing, and the
/// slice keeps the kind of its source: a range of a chain stays a chain, a range of a
/// parallel block stays parallel. Detached children are refused.
pub fn sub<C: Collaborator>(from: isize, to: isize, child: SetupFunc<C>) -> SetupFunc<C> {
    SetupFunc::new(move |mocks: &Mocks<C>| -> Result<Node<Expect<C>>, MockError> {
        let node = child.build(mocks)?;
        if let Some(mode) = node.detach_mode() {
            return Err(MockError::DetachNotAllowedInSub(mode));
        }
        propagate(Vec::new(), &node);
        let picked = match node {
            Node::Chain(nodes) => slice(from, to, nodes, Node::Chain),
            Node::Parallel(nodes) => slice(from, to, nodes, Node::Parallel),
            Node::Empty => Node::Empty,
            single => slice(from, to, vec![single], Node::Chain),
        };
        Ok(picked)
    })
}

fn slice<E>(
    from: isize,
    to: isize,
    nodes: Vec<Node<E>>,
    kind: fn(Vec<Node<E>>) -> Node<E>,
) -> Node<E> {
    match sub_slice(from, to, nodes) {
        Some(SubSlice::Single(node)) => node,
        Some(SubSlice::Range(nodes)) => kind(nodes),
        None => Node::Empty,
    }
}
