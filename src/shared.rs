use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::*;
use crate::ring::Ring;

pub struct SharedRing<T> {
    current: Arc<RwLock<Arc<Ring<T>>>>,
}

impl<T> SharedRing<T> {
    pub fn new(ring: Ring<T>) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(ring))) }
    }

    /// The ring currently published. The read lock is held only long enough
    /// to clone the `Arc`.
    pub fn snapshot(&self) -> Arc<Ring<T>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replaces the published ring wholesale and returns the previous one.
    pub fn publish(&self, ring: Ring<T>) -> Arc<Ring<T>> {
        let next = Arc::new(ring);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            previous_nodes = guard.node_count(),
            nodes = next.node_count(),
            vnodes = next.len(),
            "publishing new ring"
        );
        std::mem::replace(&mut *guard, next)
    }
}

impl<T> Clone for SharedRing<T> {
    fn clone(&self) -> Self {
        Self { current: Arc::clone(&self.current) }
    }
}

impl<T> Default for SharedRing<T> {
    fn default() -> Self { Self::new(Ring::empty()) }
}

impl<T> From<Ring<T>> for SharedRing<T> {
    fn from(ring: Ring<T>) -> Self { Self::new(ring) }
}

impl<T> fmt::Debug for SharedRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRing({:?})", self.snapshot())
    }
}
