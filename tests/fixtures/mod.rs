#![allow(dead_code)]

use std::sync::Once;
use tracing_subscriber::fmt;
use anyhow::{Result, Context};
use ketama_ring::{Node, Ring};

static LOGGER: Once = Once::new();

pub fn setup_logger() {
    LOGGER.call_once(|| {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .context("setting default subscriber failed")
            .unwrap();
    });
}

pub const NODE_KEYS: [&str; 5] = [
    "127.0.0.1:8000",
    "127.0.0.1:8001",
    "127.0.0.1:8002",
    "127.0.0.1:8003",
    "127.0.0.1:8004",
];

pub fn make_nodes(weights: &[u32]) -> Vec<Node<String>> {
    weights.iter()
        .enumerate()
        .map(|(i, w)| Node::new(format!("127.0.0.1:{}", 8000 + i), format!("binding data{}", i), *w))
        .collect()
}

pub fn make_example_ring() -> Result<Ring<String>> {
    Ring::new(make_nodes(&[1, 1, 1, 1, 1])).context("building example ring")
}

pub fn sample_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{}", i)).collect()
}
