use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use rayon::prelude::*;
use tracing::*;
use crate::hash::{self, QUERY_ALIGNMENT};
use crate::node::{Node, VirtualNode};
use crate::error::RingError;

pub mod builder;
pub mod failover;

pub use self::builder::RingBuilder;
pub use self::failover::{Exclusions, FailoverWalker};

pub struct Ring<T> {
    vnodes: Vec<VirtualNode<T>>,
    nodes: Vec<Arc<Node<T>>>,
}

impl<T> Ring<T> {
    /// Builds a ring from `nodes`, in order.
    ///
    /// An empty list yields an empty ring; every lookup on it fails with
    /// `RingError::EmptyRing`.
    pub fn new(nodes: Vec<Node<T>>) -> Result<Self, RingError> {
        RingBuilder::new().with_nodes(nodes).build()
    }

    pub fn empty() -> Self {
        Self { vnodes: Vec::new(), nodes: Vec::new() }
    }

    pub(crate) fn from_parts(vnodes: Vec<VirtualNode<T>>, nodes: Vec<Arc<Node<T>>>) -> Self {
        Self { vnodes, nodes }
    }

    /// Finds the node owning `key`: the first virtual node whose position is
    /// strictly greater than the key's position, wrapping to the start of the
    /// ring when the key lies past the last virtual node.
    pub fn get<S>(&self, key: S) -> Result<&Node<T>, RingError>
    where
        S: AsRef<str>,
    {
        let index = self.start_index(key.as_ref()).ok_or(RingError::EmptyRing)?;
        Ok(self.vnodes[index].node())
    }

    /// Finds the node owning `key` while skipping every virtual node whose
    /// physical node is listed in `excluded`.
    ///
    /// The walk visits each virtual node at most once. When every visited
    /// entry is excluded the lookup fails with `RingError::AllNodesFailed`.
    pub fn get_excluding<S, E>(&self, key: S, excluded: &E) -> Result<&Node<T>, RingError>
    where
        S: AsRef<str>,
        E: Exclusions + ?Sized,
    {
        let start = self.start_index(key.as_ref()).ok_or(RingError::EmptyRing)?;
        self.walk_from(start)
            .first_available(excluded)
            .map(|vnode| vnode.node())
            .ok_or(RingError::AllNodesFailed)
    }

    /// Iterates the whole ring clockwise starting from `key`'s owner.
    pub fn walk<S>(&self, key: S) -> Result<FailoverWalker<'_, T>, RingError>
    where
        S: AsRef<str>,
    {
        let start = self.start_index(key.as_ref()).ok_or(RingError::EmptyRing)?;
        Ok(self.walk_from(start))
    }

    /// Position of `key` on the ring.
    pub fn position_of<S>(&self, key: S) -> u32
    where
        S: AsRef<str>,
    {
        hash::align_hash(key, QUERY_ALIGNMENT)
    }

    /// Number of virtual nodes.
    pub fn len(&self) -> usize { self.vnodes.len() }

    pub fn is_empty(&self) -> bool { self.vnodes.is_empty() }

    /// Number of physical nodes the ring was built from, zero-weight ones included.
    pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Physical nodes in the order they were given.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter().map(|n| n.as_ref())
    }

    pub fn vnodes(&self) -> &[VirtualNode<T>] { self.vnodes.as_slice() }

    fn walk_from(&self, start: usize) -> FailoverWalker<'_, T> {
        FailoverWalker::new(self.vnodes.as_slice(), start)
    }

    fn start_index(&self, key: &str) -> Option<usize> {
        self.index_for_position(self.position_of(key))
    }

    fn index_for_position(&self, position: u32) -> Option<usize> {
        if self.vnodes.is_empty() {
            return None;
        }

        let upper = self.vnodes.partition_point(|v| v.position() <= position);
        Some(upper % self.vnodes.len())
    }
}

impl<T: Send + Sync> Ring<T> {
    /// Counts how many of `keys` each physical node owns.
    ///
    /// Every physical node appears in the result, unreachable ones with a
    /// count of zero.
    pub fn distribution<S>(&self, keys: &[S]) -> BTreeMap<String, usize>
    where
        S: AsRef<str> + Sync,
    {
        let counts = keys
            .par_iter()
            .filter_map(|k| self.get(k).ok())
            .fold(HashMap::new, |mut acc: HashMap<&str, usize>, node| {
                *acc.entry(node.key()).or_insert(0) += 1;
                acc
            })
            .reduce(HashMap::new, |mut lhs, rhs| {
                for (k, c) in rhs {
                    *lhs.entry(k).or_insert(0) += c;
                }
                lhs
            });

        let mut result: BTreeMap<String, usize> = self.nodes()
            .map(|n| (n.key().to_owned(), 0))
            .collect();

        for (k, c) in counts {
            result.insert(k.to_owned(), c);
        }

        debug!(keys = keys.len(), nodes = result.len(), "computed key distribution");
        result
    }
}

impl<T> Default for Ring<T> {
    fn default() -> Self { Self::empty() }
}

impl<T> Clone for Ring<T> {
    fn clone(&self) -> Self {
        Self { vnodes: self.vnodes.clone(), nodes: self.nodes.clone() }
    }
}

impl<T> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.nodes().map(|n| n.key()).collect();
        write!(f, "Ring(nodes:{:?}, vnodes:{})", keys, self.vnodes.len())
    }
}
