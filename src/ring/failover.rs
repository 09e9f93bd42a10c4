use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};
use tracing::*;
use crate::node::VirtualNode;

/// Physical node keys a failover lookup must skip.
///
/// Only membership is ever asked; the ring does not retain the set.
pub trait Exclusions {
    fn excludes(&self, key: &str) -> bool;
}

impl<S, H> Exclusions for HashSet<S, H>
where
    S: Borrow<str> + Hash + Eq,
    H: BuildHasher,
{
    fn excludes(&self, key: &str) -> bool { self.contains(key) }
}

impl<S> Exclusions for BTreeSet<S>
where
    S: Borrow<str> + Ord,
{
    fn excludes(&self, key: &str) -> bool { self.contains(key) }
}

impl<S: AsRef<str>> Exclusions for [S] {
    fn excludes(&self, key: &str) -> bool {
        self.iter().any(|k| k.as_ref() == key)
    }
}

impl<S: AsRef<str>> Exclusions for Vec<S> {
    fn excludes(&self, key: &str) -> bool { self.as_slice().excludes(key) }
}

impl<E: Exclusions + ?Sized> Exclusions for &E {
    fn excludes(&self, key: &str) -> bool { (**self).excludes(key) }
}

/// Clockwise walk over the ring from a start index, wrapping around and
/// visiting each virtual node exactly once.
#[derive(Debug)]
pub struct FailoverWalker<'r, T> {
    vnodes: &'r [VirtualNode<T>],
    index: usize,
    remaining: usize,
}

impl<'r, T> FailoverWalker<'r, T> {
    pub(crate) fn new(vnodes: &'r [VirtualNode<T>], start: usize) -> Self {
        let index = if vnodes.is_empty() { 0 } else { start % vnodes.len() };
        Self { vnodes, index, remaining: vnodes.len() }
    }

    /// First virtual node whose owner is not excluded, or `None` once the
    /// whole ring has been visited.
    pub fn first_available<E>(mut self, excluded: &E) -> Option<&'r VirtualNode<T>>
    where
        E: Exclusions + ?Sized,
    {
        let mut skipped = 0_usize;
        let found = loop {
            match self.next() {
                Some(vnode) if excluded.excludes(vnode.key()) => skipped += 1,
                other => break other,
            }
        };

        if skipped > 0 {
            trace!(skipped, found = found.is_some(), "failover walk skipped excluded nodes");
        }

        found
    }
}

impl<'r, T> Iterator for FailoverWalker<'r, T> {
    type Item = &'r VirtualNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let vnode = &self.vnodes[self.index];
        self.index = (self.index + 1) % self.vnodes.len();
        self.remaining -= 1;
        Some(vnode)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'r, T> ExactSizeIterator for FailoverWalker<'r, T> {}
