#![allow(clippy::float_cmp)]

use super::*;

fn rec(id: NodeId, x: f32, y: f32) -> NodeRecord {
    NodeRecord { id, x, y, w: 100.0, h: 50.0, vx: 0.0, vy: 0.0, flags: 0 }
}

fn table(capacity: usize) -> NodeTable {
    NodeTable::with_capacity(capacity).expect("table")
}

// =============================================================
// Node
// =============================================================

#[test]
fn from_record_starts_at_unit_scale() {
    let node = Node::from_record(&rec(1, 10.0, 20.0)).expect("node");
    assert_eq!(node.scale, 1.0);
    assert_eq!(node.width(), 100.0);
    assert_eq!(node.to_record(), rec(1, 10.0, 20.0));
}

#[test]
fn flags_decode_known_and_retain_unknown_bits() {
    let mut r = rec(1, 0.0, 0.0);
    r.flags = 1 | 4 | 64;
    let node = Node::from_record(&r).expect("node");
    assert!(node.is_pinned());
    assert!(node.flags.contains(NodeFlags::IMAGE));
    assert!(!node.flags.contains(NodeFlags::PASSIVE));
    assert_eq!(node.to_record().flags, 69);
}

#[test]
fn contains_is_inclusive_and_uses_scaled_size() {
    let mut node = Node::from_record(&rec(1, 0.0, 0.0)).expect("node");
    assert!(node.contains(Point::new(100.0, 50.0)));
    assert!(!node.contains(Point::new(100.1, 50.0)));
    node.scale = 2.0;
    assert!(node.contains(Point::new(200.0, 100.0)));
}

#[test]
fn non_finite_or_negative_size_is_invalid() {
    let mut r = rec(1, f32::NAN, 0.0);
    assert!(matches!(Node::from_record(&r), Err(EngineError::InvalidArgument(_))));
    r.x = 0.0;
    r.w = -1.0;
    assert!(validate_record(&r).is_err());
}

// =============================================================
// NodeTable
// =============================================================

#[test]
fn upsert_inserts_in_order() {
    let mut t = table(4);
    assert!(t.upsert(&rec(3, 0.0, 0.0)).expect("upsert"));
    assert!(t.upsert(&rec(1, 0.0, 0.0)).expect("upsert"));
    let ids: Vec<NodeId> = t.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[test]
fn re_upsert_updates_in_place_and_keeps_scale() {
    let mut t = table(4);
    t.upsert(&rec(1, 0.0, 0.0)).expect("upsert");
    t.upsert(&rec(2, 0.0, 0.0)).expect("upsert");
    t.get_mut(1).expect("node").scale = 1.5;

    t.upsert(&rec(1, 30.0, 40.0)).expect("upsert");
    assert_eq!(t.len(), 2);
    let node = t.get(1).expect("node");
    assert_eq!((node.x, node.y, node.scale), (30.0, 40.0, 1.5));
    assert_eq!(t.as_slice()[0].id, 1);
}

#[test]
fn new_ids_beyond_capacity_are_rejected_but_updates_pass() {
    let mut t = table(1);
    assert!(t.upsert(&rec(1, 0.0, 0.0)).expect("upsert"));
    assert!(!t.upsert(&rec(2, 0.0, 0.0)).expect("upsert"));
    assert!(t.upsert(&rec(1, 5.0, 0.0)).expect("upsert"));
    assert_eq!(t.len(), 1);
    assert!(!t.contains(2));
}

#[test]
fn remove_keeps_order_and_reindexes() {
    let mut t = table(4);
    for id in 1..=4 {
        t.upsert(&rec(id, id as f32, 0.0)).expect("upsert");
    }
    let removed = t.remove(2).expect("removed");
    assert_eq!(removed.id, 2);
    assert!(t.remove(2).is_none());
    let ids: Vec<NodeId> = t.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert_eq!(t.get(4).expect("node").x, 4.0);
    assert_eq!(t.get(3).expect("node").x, 3.0);
}

#[test]
fn clear_empties_but_keeps_capacity() {
    let mut t = table(2);
    t.upsert(&rec(1, 0.0, 0.0)).expect("upsert");
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.capacity(), 2);
    assert!(t.get(1).is_none());
}
