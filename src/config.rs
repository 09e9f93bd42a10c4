use std::convert::TryFrom;
use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::*;
use config::Config;
use crate::error::RingError;
use crate::node::Node;
use crate::ring::Ring;

pub const ENV_PREFIX: &str = "KETAMA";

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("ring misconfigured")]
    ConfigSource(#[from] config::ConfigError),

    #[error("invalid ring topology")]
    Topology(#[from] RingError),

    #[error("node, {key}, has invalid weight {weight}")]
    InvalidWeight { key: String, weight: i64 },
}

/// One physical node as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub key: String,
    pub weight: u32,
    /// Opaque payload handed back by lookups, e.g. a connection string.
    pub data: String,
}

impl NodeSpec {
    pub fn new<K, D>(key: K, data: D, weight: u32) -> Self
    where
        K: Into<String>,
        D: Into<String>,
    {
        Self { key: key.into(), weight, data: data.into() }
    }
}

// Weights are read signed so a negative value is reported instead of
// wrapping into a huge unsigned weight.
#[derive(Deserialize, Debug, Clone)]
struct NodeSchema {
    key: String,
    #[serde(default = "NodeSchema::default_weight")]
    weight: i64,
    #[serde(default)]
    data: String,
}

impl NodeSchema {
    fn default_weight() -> i64 { 1 }

    fn into_spec(self) -> Result<NodeSpec, ConfigurationError> {
        let weight = u32::try_from(self.weight)
            .map_err(|_| ConfigurationError::InvalidWeight {
                key: self.key.clone(),
                weight: self.weight,
            })?;

        Ok(NodeSpec { key: self.key, weight, data: self.data })
    }
}

impl From<NodeSpec> for Node<String> {
    fn from(spec: NodeSpec) -> Self {
        Node::new(spec.key, spec.data, spec.weight)
    }
}

#[derive(Deserialize, Debug, Clone)]
struct ConfigSchema {
    #[serde(default)]
    pub nodes: Vec<NodeSchema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    nodes: Vec<NodeSpec>,
}

impl Configuration {
    pub fn new(nodes: Vec<NodeSpec>) -> Self { Self { nodes } }

    /// Loads the node list from `path`, when given, then overlays any
    /// `KETAMA_` prefixed environment variables.
    #[tracing::instrument]
    pub fn load(path: Option<&Path>) -> Result<Configuration, ConfigurationError> {
        let mut config = Config::default();

        if let Some(p) = path {
            config.merge(config::File::from(p))?;
        }

        config.merge(config::Environment::with_prefix(ENV_PREFIX))?;

        Self::load_from_config(config)
    }

    #[tracing::instrument(skip(config))]
    pub fn load_from_config(config: Config) -> Result<Configuration, ConfigurationError> {
        let schema = config.try_into::<ConfigSchema>()?;
        for node in schema.nodes.iter() {
            debug!(key = node.key.as_str(), weight = node.weight, "configured ring node");
        }

        let nodes = schema.nodes
            .into_iter()
            .map(NodeSchema::into_spec)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Configuration { nodes })
    }

    pub fn nodes(&self) -> &[NodeSpec] { self.nodes.as_slice() }

    pub fn build_ring(&self) -> Result<Ring<String>, ConfigurationError> {
        let nodes = self.nodes.iter().cloned().map(Node::from).collect();
        Ring::new(nodes).map_err(|err| err.into())
    }
}
