use std::collections::HashSet;
use std::sync::Arc;
use tracing::*;
use crate::error::RingError;
use crate::hash;
use crate::node::{Node, VirtualNode};
use super::Ring;

/// Suffix strings hashed per unit of weight.
pub const POINTS_PER_WEIGHT: usize = 40;

/// Virtual nodes placed per unit of weight.
pub const VNODES_PER_WEIGHT: usize = POINTS_PER_WEIGHT * hash::ALIGNMENTS;

/// Upper bound on virtual nodes in one ring; there are only 2^32 positions.
pub const MAX_VNODES: usize = u32::max_value() as usize;

/// Collects physical nodes and expands them into a sorted ring.
#[derive(Debug)]
pub struct RingBuilder<T> {
    nodes: Vec<Node<T>>,
}

impl<T> RingBuilder<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_node(&mut self, node: Node<T>) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn with_nodes<I>(&mut self, nodes: I) -> &mut Self
    where
        I: IntoIterator<Item = Node<T>>,
    {
        self.nodes.extend(nodes);
        self
    }

    pub fn push_node<S>(&mut self, key: S, payload: T, weight: u32) -> &mut Self
    where
        S: Into<String>,
    {
        self.with_node(Node::new(key, payload, weight))
    }

    /// Builds the ring, draining the nodes collected so far.
    ///
    /// Each node gets `weight * 40` suffix strings `<key>-<j>`, and each
    /// suffix digest yields four positions. Entries are stable-sorted by
    /// position, so equal positions keep insertion order.
    pub fn build(&mut self) -> Result<Ring<T>, RingError> {
        let nodes = std::mem::replace(&mut self.nodes, Vec::new());
        let total = check_nodes(&nodes)?;

        let mut vnodes = Vec::new();
        vnodes.try_reserve_exact(total).map_err(|_| heaviest_overflow(&nodes))?;
        let mut physical = Vec::with_capacity(nodes.len());

        for node in nodes {
            let node = Arc::new(node);
            if node.weight() == 0 {
                warn!(node = node.key(), "node has zero weight and is unreachable");
            }

            for j in 0..(node.weight() as usize * POINTS_PER_WEIGHT) {
                let suffix = format!("{}-{}", node.key(), j);
                for position in hash::alignments(&suffix).iter() {
                    vnodes.push(VirtualNode::new(*position, Arc::clone(&node)));
                }
            }

            physical.push(node);
        }

        vnodes.sort_by_key(|v| v.position());
        debug!(nodes = physical.len(), vnodes = vnodes.len(), "built ketama ring");

        Ok(Ring::from_parts(vnodes, physical))
    }
}

impl<T> Default for RingBuilder<T> {
    fn default() -> Self { Self::new() }
}

/// Number of virtual nodes `node` contributes, if it fits in `usize`.
pub fn vnode_count<T>(node: &Node<T>) -> Option<usize> {
    (node.weight() as usize).checked_mul(VNODES_PER_WEIGHT)
}

fn heaviest_overflow<T>(nodes: &[Node<T>]) -> RingError {
    nodes.iter()
        .max_by_key(|n| n.weight())
        .map(|n| RingError::WeightOverflow { key: n.key().to_owned(), weight: n.weight() })
        .unwrap_or(RingError::WeightOverflow { key: String::new(), weight: 0 })
}

/// Rejects empty and duplicate keys and returns the total virtual node count,
/// which must not exceed `MAX_VNODES`.
fn check_nodes<T>(nodes: &[Node<T>]) -> Result<usize, RingError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    let mut total: usize = 0;

    for node in nodes {
        if node.key().is_empty() {
            return Err(RingError::EmptyKey);
        }

        if !seen.insert(node.key()) {
            return Err(RingError::DuplicateNode(node.key().to_owned()));
        }

        total = vnode_count(node)
            .and_then(|count| total.checked_add(count))
            .filter(|t| *t <= MAX_VNODES)
            .ok_or_else(|| RingError::WeightOverflow {
                key: node.key().to_owned(),
                weight: node.weight(),
            })?;
    }

    Ok(total)
}
