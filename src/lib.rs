//! Weighted consistent hashing in the ketama style.
//!
//! ```
//! use std::collections::HashSet;
//! use ketama_ring::{Node, Ring, RingError};
//!
//! let ring = Ring::new(vec![
//!     Node::new("127.0.0.1:8000", "binding data0", 1),
//!     Node::new("127.0.0.1:8001", "binding data1", 1),
//! ]).unwrap();
//!
//! let owner = ring.get("key1").unwrap();
//! let mut failed = HashSet::new();
//! failed.insert(owner.key().to_owned());
//! assert_ne!(ring.get_excluding("key1", &failed).unwrap().key(), owner.key());
//!
//! failed.insert("127.0.0.1:8000".to_owned());
//! failed.insert("127.0.0.1:8001".to_owned());
//! assert_eq!(ring.get_excluding("key1", &failed).unwrap_err(), RingError::AllNodesFailed);
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod node;
pub mod ring;
pub mod shared;

pub use crate::config::{Configuration, ConfigurationError, NodeSpec};
pub use crate::error::RingError;
pub use crate::node::{Node, VirtualNode};
pub use crate::ring::{Exclusions, FailoverWalker, Ring, RingBuilder};
pub use crate::shared::SharedRing;
