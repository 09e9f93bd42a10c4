use std::collections::HashSet;
use std::path::PathBuf;
use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::*;
use tracing_subscriber::fmt;
use ketama_ring::{Configuration, NodeSpec, Ring, RingError};

#[derive(StructOpt, Debug)]
#[structopt(name = "ketama")]
pub struct Opt {
    /// node list configuration; the five node example topology is used when absent
    #[structopt(long = "config", parse(from_os_str))]
    pub configuration_path: Option<PathBuf>,

    /// node key to treat as failed; may be repeated
    #[structopt(short, long = "failed")]
    pub failed: Vec<String>,

    /// report how many of this many generated keys land on each node
    #[structopt(short, long)]
    pub sample: Option<usize>,

    /// keys to look up
    pub keys: Vec<String>,
}

fn example_configuration() -> Configuration {
    Configuration::new(vec![
        NodeSpec::new("127.0.0.1:8000", "binding data0", 1),
        NodeSpec::new("127.0.0.1:8001", "binding data1", 1),
        NodeSpec::new("127.0.0.1:8002", "binding data2", 1),
        NodeSpec::new("127.0.0.1:8003", "binding data3", 1),
        NodeSpec::new("127.0.0.1:8004", "binding data4", 1),
    ])
}

fn describe(result: Result<&ketama_ring::Node<String>, RingError>) -> String {
    match result {
        Ok(node) => format!("{} ({})", node.key(), node.payload()),
        Err(err) => format!("<{}>", err),
    }
}

fn main() -> Result<()> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let opt: Opt = Opt::from_args();
    info!("CLI options {:?}", opt);

    let configuration = match opt.configuration_path.as_ref() {
        Some(path) => Configuration::load(Some(path.as_path()))
            .with_context(|| format!("failed to load ring configuration from {:?}", path))?,
        None => example_configuration(),
    };

    let ring: Ring<String> = configuration.build_ring().context("failed to build ring")?;
    info!(nodes = ring.node_count(), vnodes = ring.len(), "ring ready");

    let failed: HashSet<&str> = opt.failed.iter().map(|k| k.as_str()).collect();

    for key in opt.keys.iter() {
        if failed.is_empty() {
            println!("{} -> {}", key, describe(ring.get(key)));
        } else {
            println!(
                "{} -> {} (failover: {})",
                key,
                describe(ring.get(key)),
                describe(ring.get_excluding(key, &failed)),
            );
        }
    }

    if let Some(n) = opt.sample {
        let keys: Vec<String> = (0..n).map(|i| format!("key-{}", i)).collect();
        for (node, count) in ring.distribution(&keys) {
            let share = if n == 0 { 0.0 } else { count as f64 / n as f64 };
            println!("{:<24} {:>10} {:>8.4}", node, count, share);
        }
    }

    Ok(())
}
