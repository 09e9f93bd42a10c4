use std::fmt;
use std::sync::Arc;

/// A physical backend placed on the ring.
///
/// `payload` is carried for the caller (a connection handle, an address,
/// anything) and is never inspected by the ring. Every virtual node of a
/// physical node shares the same `Node` through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node<T> {
    key: String,
    payload: T,
    weight: u32,
}

impl<T> Node<T> {
    pub fn new<S>(key: S, payload: T, weight: u32) -> Self
    where
        S: Into<String>,
    {
        Self { key: key.into(), payload, weight }
    }

    pub fn key(&self) -> &str { self.key.as_str() }

    pub fn payload(&self) -> &T { &self.payload }

    pub fn weight(&self) -> u32 { self.weight }

    pub fn into_payload(self) -> T { self.payload }
}

impl<T> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.weight)
    }
}

/// One position on the ring owned by a physical node.
#[derive(Debug)]
pub struct VirtualNode<T> {
    position: u32,
    node: Arc<Node<T>>,
}

impl<T> VirtualNode<T> {
    pub(crate) fn new(position: u32, node: Arc<Node<T>>) -> Self {
        Self { position, node }
    }

    pub fn position(&self) -> u32 { self.position }

    pub fn node(&self) -> &Node<T> { self.node.as_ref() }

    pub fn key(&self) -> &str { self.node.key() }
}

impl<T> Clone for VirtualNode<T> {
    fn clone(&self) -> Self {
        Self { position: self.position, node: Arc::clone(&self.node) }
    }
}
