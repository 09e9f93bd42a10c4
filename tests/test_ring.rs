mod fixtures;

use std::collections::{BTreeSet, HashSet};
use tracing::*;
use ketama_ring::{Node, Ring, RingBuilder, RingError};
use fixtures::{make_example_ring, make_nodes, sample_keys, NODE_KEYS};

#[test]
fn test_lookup_is_deterministic() {
    fixtures::setup_logger();
    let span = span!(Level::INFO, "test_lookup_is_deterministic");
    let _guard = span.enter();

    let ring = make_example_ring().unwrap();
    let rebuilt = make_example_ring().unwrap();

    for key in sample_keys(1_000) {
        let first = ring.get(&key).unwrap().key().to_owned();
        assert_eq!(ring.get(&key).unwrap().key(), first);
        assert_eq!(rebuilt.get(&key).unwrap().key(), first);
    }
}

#[test]
fn test_every_node_is_reachable() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();

    let hit: HashSet<String> = sample_keys(10_000)
        .iter()
        .map(|k| ring.get(k).unwrap().key().to_owned())
        .collect();

    let expected: HashSet<String> = NODE_KEYS.iter().map(|k| k.to_string()).collect();
    assert_eq!(hit, expected);
}

#[test]
fn test_load_is_proportional_to_weight() {
    fixtures::setup_logger();
    let ring = Ring::new(make_nodes(&[1, 3])).unwrap();
    let keys = sample_keys(20_000);

    let dist = ring.distribution(&keys);
    let light = dist["127.0.0.1:8000"] as f64;
    let heavy = dist["127.0.0.1:8001"] as f64;
    let ratio = heavy / light;
    info!(%light, %heavy, %ratio, "weighted distribution");

    assert!(
        (2.0..=4.5).contains(&ratio),
        "weighted distribution off: light={}, heavy={} (ratio {:.2})",
        light, heavy, ratio
    );
}

#[test]
fn test_equal_weights_roughly_balanced() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();
    let keys = sample_keys(20_000);

    for (node, count) in ring.distribution(&keys) {
        let share = count as f64 / keys.len() as f64;
        assert!(
            (0.1..=0.3).contains(&share),
            "node {} owns {:.3} of keys",
            node, share
        );
    }
}

#[test]
fn test_empty_ring_yields_empty_ring_error() {
    fixtures::setup_logger();
    let ring: Ring<String> = Ring::new(Vec::new()).unwrap();
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.get("x").unwrap_err(), RingError::EmptyRing);

    let excluded: HashSet<String> = NODE_KEYS.iter().map(|k| k.to_string()).collect();
    assert_eq!(ring.get_excluding("x", &excluded).unwrap_err(), RingError::EmptyRing);
}

#[test]
fn test_zero_weight_node_never_returned() {
    fixtures::setup_logger();
    let ring = Ring::new(make_nodes(&[1, 0, 1])).unwrap();
    assert_eq!(ring.node_count(), 3);
    assert_eq!(ring.len(), 2 * 160);

    let none: &[&str] = &[];
    for key in sample_keys(5_000) {
        assert_ne!(ring.get(&key).unwrap().key(), "127.0.0.1:8001");
        assert_ne!(ring.get_excluding(&key, none).unwrap().key(), "127.0.0.1:8001");
    }
}

#[test]
fn test_failover_avoids_excluded_owner() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();

    for key in sample_keys(1_000) {
        let owner = ring.get(&key).unwrap();
        let mut excluded = HashSet::new();
        excluded.insert(owner.key());

        let fallback = ring.get_excluding(&key, &excluded).unwrap();
        assert_ne!(fallback.key(), owner.key(), "key {}", key);

        let expected = ring.walk(&key)
            .unwrap()
            .find(|v| v.key() != owner.key())
            .unwrap();
        assert_eq!(fallback.key(), expected.key());
    }
}

#[test]
fn test_failover_with_single_survivor() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();
    let survivor = NODE_KEYS[3];
    let excluded: BTreeSet<&str> = NODE_KEYS.iter().copied().filter(|k| *k != survivor).collect();

    for key in sample_keys(500) {
        assert_eq!(ring.get_excluding(&key, &excluded).unwrap().key(), survivor);
    }
}

#[test]
fn test_failover_when_all_nodes_excluded() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();
    let excluded: Vec<String> = NODE_KEYS.iter().map(|k| k.to_string()).collect();

    for key in sample_keys(50) {
        assert_eq!(ring.get_excluding(&key, &excluded).unwrap_err(), RingError::AllNodesFailed);
    }
}

#[test]
fn test_failover_ignores_unknown_exclusions() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();
    let excluded = vec!["10.0.0.1:11211"];

    for key in sample_keys(200) {
        assert_eq!(
            ring.get_excluding(&key, &excluded).unwrap().key(),
            ring.get(&key).unwrap().key()
        );
    }
}

#[test]
fn test_adding_node_moves_few_keys_and_only_to_it() {
    fixtures::setup_logger();
    let keys = sample_keys(20_000);

    for &n in &[5_usize, 20] {
        let before = Ring::new(make_nodes(&vec![1; n])).unwrap();
        let after = Ring::new(make_nodes(&vec![1; n + 1])).unwrap();
        let added = format!("127.0.0.1:{}", 8000 + n);

        let mut moved = 0;
        for key in keys.iter() {
            let old = before.get(key).unwrap().key();
            let new = after.get(key).unwrap().key();
            if old != new {
                assert_eq!(new, added, "key {} moved from {} to an existing node {}", key, old, new);
                moved += 1;
            }
        }

        let moved_share = moved as f64 / keys.len() as f64;
        let expected_share = 1.0 / (n as f64 + 1.0);
        info!(%n, %moved_share, %expected_share, "keys moved after adding a node");
        assert!(
            moved_share > expected_share * 0.5 && moved_share < expected_share * 1.6,
            "moved {:.3} of keys, expected about {:.3}",
            moved_share, expected_share
        );
    }
}

#[test]
fn test_removing_node_only_moves_its_keys() {
    fixtures::setup_logger();
    let keys = sample_keys(10_000);
    let nodes = make_nodes(&[1, 2, 1, 1]);
    let removed = nodes[1].key().to_owned();

    let before = Ring::new(nodes.clone()).unwrap();
    let after = Ring::new(nodes.into_iter().filter(|n| n.key() != removed).collect()).unwrap();

    let excluded = vec![removed.as_str()];
    for key in keys.iter() {
        let old = before.get(key).unwrap().key();
        let new = after.get(key).unwrap().key();
        if old != removed {
            assert_eq!(old, new, "key {} was not on the removed node but moved", key);
        }

        // failover over the old ring matches a ring without the node
        assert_eq!(before.get_excluding(key, &excluded).unwrap().key(), new);
    }
}

#[test]
fn test_key_past_last_position_wraps_to_first() {
    fixtures::setup_logger();
    let ring = make_example_ring().unwrap();
    let last = ring.vnodes().last().unwrap().position();

    let key = (0..1_000_000)
        .map(|i| format!("wrap-{}", i))
        .find(|k| ring.position_of(k) >= last)
        .expect("some key hashes past the last virtual node");

    assert_eq!(ring.get(&key).unwrap().key(), ring.vnodes()[0].key());
}

#[test]
fn test_builder_and_constructor_agree() {
    fixtures::setup_logger();
    let from_new = make_example_ring().unwrap();
    let from_builder = RingBuilder::new().with_nodes(make_nodes(&[1, 1, 1, 1, 1])).build().unwrap();

    for key in sample_keys(500) {
        assert_eq!(from_new.get(&key).unwrap().key(), from_builder.get(&key).unwrap().key());
    }
}

#[test]
fn test_payload_is_returned_untouched() {
    fixtures::setup_logger();
    #[derive(Debug, PartialEq)]
    struct Backend {
        port: u16,
    }

    let ring = Ring::new(vec![
        Node::new("a", Backend { port: 11211 }, 1),
        Node::new("b", Backend { port: 11212 }, 1),
    ]).unwrap();

    for key in sample_keys(100) {
        let node = ring.get(&key).unwrap();
        let expected = if node.key() == "a" { 11211 } else { 11212 };
        assert_eq!(node.payload(), &Backend { port: expected });
    }
}

#[test]
fn test_illustrative_five_node_scenario() {
    fixtures::setup_logger();
    let span = span!(Level::INFO, "test_illustrative_five_node_scenario");
    let _guard = span.enter();

    let ring = make_example_ring().unwrap();

    let owner = ring.get("key1").unwrap();
    info!(owner = owner.key(), payload = owner.payload().as_str(), "key1 owner");
    assert!(NODE_KEYS.iter().any(|k| *k == owner.key()));
    assert_eq!(ring.get("key1").unwrap().key(), owner.key());

    let mut failed = HashSet::new();
    failed.insert(owner.key().to_owned());
    let fallback = ring.get_excluding("key1", &failed).unwrap();
    assert_ne!(fallback.key(), owner.key());
    assert!(NODE_KEYS.iter().any(|k| *k == fallback.key()));

    let all: HashSet<String> = NODE_KEYS.iter().map(|k| k.to_string()).collect();
    assert_eq!(ring.get_excluding("key1", &all).unwrap_err(), RingError::AllNodesFailed);
}
