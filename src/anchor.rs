//! Anchor propagation: wires occurs-after constraints along a node tree.
//!
//! The anchor set is the current ordering frontier. Walking a node consumes the incoming
//! frontier and yields the frontier its successors must follow.

use tracing::trace;

use crate::node::{Expectation, Node};

/// Register the ordering constraints of `node` after `anchors` and return the new anchors.
pub fn propagate<E: Expectation>(anchors: Vec<E>, node: &Node<E>) -> Vec<E> {
    match node {
        Node::Single(call) => propagate_single(&anchors, call),
        Node::Chain(nodes) => nodes.iter().fold(anchors, propagate),
        Node::Parallel(nodes) => {
            let mut next = Vec::with_capacity(nodes.len());
            for node in nodes {
                next.extend(propagate(anchors.clone(), node));
            }
            next
        }
        Node::DetachBoth(nodes) => {
            for node in nodes {
                propagate(Vec::new(), node);
            }
            anchors
        }
        Node::DetachHead(nodes) => {
            let mut anchors = anchors;
            for node in nodes {
                anchors.extend(propagate(Vec::new(), node));
            }
            anchors
        }
        Node::DetachTail(nodes) => {
            for node in nodes {
                propagate(anchors.clone(), node);
            }
            anchors
        }
        Node::Empty => anchors,
    }
}

fn propagate_single<E: Expectation>(anchors: &[E], call: &E) -> Vec<E> {
    // The same expectation can be reached twice, e.g. through `sub`.
    for anchor in anchors.iter().filter(|anchor| !anchor.same(call)) {
        call.after(anchor);
        trace!(?call, predecessor = ?anchor, "ordered expectation after predecessor");
    }
    vec![call.clone()]
}
