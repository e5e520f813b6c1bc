#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geom::Point;
use crate::particles::Particle;
use crate::scene::{Node, NodeFlags, NodeId};

/// What a point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Node(NodeId),
    /// Index into the live particle pool.
    Particle(usize),
}

/// Test what is under `pt`, nodes first, then particles.
#[must_use]
pub fn hit_test(nodes: &[Node], particles: &[Particle], pt: Point) -> Option<Hit> {
    topmost_node(nodes, pt)
        .map(Hit::Node)
        .or_else(|| topmost_particle(particles, pt).map(Hit::Particle))
}

/// Topmost (last in draw order) non-passive node containing `pt`.
#[must_use]
pub fn topmost_node(nodes: &[Node], pt: Point) -> Option<NodeId> {
    nodes
        .iter()
        .rev()
        .find(|n| !n.flags.contains(NodeFlags::PASSIVE) && n.contains(pt))
        .map(|n| n.id)
}

/// Last-spawned particle whose radius box contains `pt`.
#[must_use]
pub fn topmost_particle(particles: &[Particle], pt: Point) -> Option<usize> {
    particles.iter().rposition(|p| {
        pt.x >= p.x - p.radius && pt.x <= p.x + p.radius && pt.y >= p.y - p.radius && pt.y <= p.y + p.radius
    })
}

/// Resolve the node a pinch at `centroid` should scale.
///
/// Non-image nodes win over image nodes at the centroid; with nothing under
/// the centroid the single-pointer `fallback` is used. Pinned nodes are
/// never returned.
#[must_use]
pub fn pinch_target(nodes: &[Node], centroid: Point, fallback: Option<NodeId>) -> Option<NodeId> {
    let mut image = None;
    for node in nodes.iter().rev() {
        if node.flags.intersects(NodeFlags::PASSIVE | NodeFlags::PINNED) || !node.contains(centroid) {
            continue;
        }
        if !node.flags.contains(NodeFlags::IMAGE) {
            return Some(node.id);
        }
        if image.is_none() {
            image = Some(node.id);
        }
    }
    image.or_else(|| fallback.filter(|id| nodes.iter().any(|n| n.id == *id && !n.is_pinned())))
}
