use super::*;
use scene_buffers::NodeRecord;

fn node(id: NodeId, x: f32, y: f32, w: f32, h: f32, flags: NodeFlags) -> Node {
    let rec = NodeRecord { id, x, y, w, h, vx: 0.0, vy: 0.0, flags: flags.bits() };
    Node::from_record(&rec).expect("node")
}

fn particle(x: f32, y: f32, radius: f32) -> Particle {
    Particle { x, y, vx: 0.0, vy: 0.0, radius, life: 1.0 }
}

// =============================================================
// topmost_node
// =============================================================

#[test]
fn empty_scene_hits_nothing() {
    assert_eq!(topmost_node(&[], Point::new(0.0, 0.0)), None);
    assert_eq!(hit_test(&[], &[], Point::new(0.0, 0.0)), None);
}

#[test]
fn last_inserted_wins_on_overlap() {
    let nodes = [
        node(1, 0.0, 0.0, 100.0, 100.0, NodeFlags::empty()),
        node(2, 50.0, 50.0, 100.0, 100.0, NodeFlags::empty()),
    ];
    assert_eq!(topmost_node(&nodes, Point::new(75.0, 75.0)), Some(2));
    assert_eq!(topmost_node(&nodes, Point::new(10.0, 10.0)), Some(1));
}

#[test]
fn boundary_edge_counts_as_inside() {
    let nodes = [node(1, 10.0, 10.0, 20.0, 20.0, NodeFlags::empty())];
    assert_eq!(topmost_node(&nodes, Point::new(10.0, 10.0)), Some(1));
    assert_eq!(topmost_node(&nodes, Point::new(30.0, 30.0)), Some(1));
    assert_eq!(topmost_node(&nodes, Point::new(30.5, 30.0)), None);
}

#[test]
fn passive_nodes_are_transparent() {
    let nodes = [
        node(1, 0.0, 0.0, 100.0, 100.0, NodeFlags::empty()),
        node(2, 0.0, 0.0, 100.0, 100.0, NodeFlags::PASSIVE),
    ];
    assert_eq!(topmost_node(&nodes, Point::new(50.0, 50.0)), Some(1));
}

// =============================================================
// topmost_particle
// =============================================================

#[test]
fn particle_hit_uses_radius_box_and_latest_spawn() {
    let particles = [particle(10.0, 10.0, 5.0), particle(12.0, 12.0, 5.0)];
    assert_eq!(topmost_particle(&particles, Point::new(11.0, 11.0)), Some(1));
    assert_eq!(topmost_particle(&particles, Point::new(5.0, 5.0)), Some(0));
    assert_eq!(topmost_particle(&particles, Point::new(30.0, 30.0)), None);
}

#[test]
fn nodes_take_precedence_over_particles() {
    let nodes = [node(7, 0.0, 0.0, 20.0, 20.0, NodeFlags::empty())];
    let particles = [particle(10.0, 10.0, 5.0)];
    assert_eq!(hit_test(&nodes, &particles, Point::new(10.0, 10.0)), Some(Hit::Node(7)));
    assert_eq!(hit_test(&nodes, &particles, Point::new(40.0, 40.0)), None);
    assert_eq!(hit_test(&[], &particles, Point::new(10.0, 10.0)), Some(Hit::Particle(0)));
}

// =============================================================
// pinch_target
// =============================================================

#[test]
fn pinch_prefers_text_over_image_at_centroid() {
    let nodes = [
        node(1, 0.0, 0.0, 100.0, 100.0, NodeFlags::empty()),
        node(2, 0.0, 0.0, 100.0, 100.0, NodeFlags::IMAGE),
    ];
    assert_eq!(pinch_target(&nodes, Point::new(50.0, 50.0), None), Some(1));
}

#[test]
fn pinch_falls_back_to_image_then_single_target() {
    let nodes = [
        node(1, 0.0, 0.0, 10.0, 10.0, NodeFlags::empty()),
        node(2, 50.0, 50.0, 100.0, 100.0, NodeFlags::IMAGE),
    ];
    assert_eq!(pinch_target(&nodes, Point::new(60.0, 60.0), Some(1)), Some(2));
    assert_eq!(pinch_target(&nodes, Point::new(300.0, 300.0), Some(1)), Some(1));
    assert_eq!(pinch_target(&nodes, Point::new(300.0, 300.0), None), None);
}

#[test]
fn pinned_nodes_are_never_pinch_targets() {
    let nodes = [node(1, 0.0, 0.0, 100.0, 100.0, NodeFlags::PINNED)];
    assert_eq!(pinch_target(&nodes, Point::new(50.0, 50.0), None), None);
    assert_eq!(pinch_target(&nodes, Point::new(500.0, 500.0), Some(1)), None);
}
