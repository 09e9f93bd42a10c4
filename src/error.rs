use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("ring has no virtual nodes")]
    EmptyRing,

    #[error("every node reachable on the ring is excluded")]
    AllNodesFailed,

    #[error("node key must not be empty")]
    EmptyKey,

    #[error("node, {0}, is listed more than once")]
    DuplicateNode(String),

    #[error("weight {weight} of node, {key}, overflows the ring size")]
    WeightOverflow { key: String, weight: u32 },
}
