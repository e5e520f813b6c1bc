//! Scene model: nodes, their flags, and the in-memory node table.
//!
//! Nodes enter this layer from the host as decoded [`NodeRecord`]s and are
//! mutated every frame by the gesture recognizer and the node stepper. The
//! table keeps insertion order because that order is the draw order: the
//! last node inserted is the topmost one for hit-testing.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use bitflags::bitflags;
use scene_buffers::NodeRecord;

use crate::error::EngineError;
use crate::geom::Point;

/// Host-chosen node identifier. Always positive.
pub type NodeId = i32;

bitflags! {
    /// Behaviour flags carried in the last field of a node record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u32 {
        /// Never moved by pointer, inertia, or pinch.
        const PINNED = 1;
        /// Ignored by hit-testing.
        const PASSIVE = 1 << 1;
        /// Image content; loses pinch-target priority to other nodes.
        const IMAGE = 1 << 2;
    }
}

/// A positioned rectangle in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Unscaled width as sent by the host.
    pub w: f32,
    /// Unscaled height as sent by the host.
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub flags: NodeFlags,
    /// Engine-owned pinch scale. Survives re-upserts.
    pub scale: f32,
}

impl Node {
    /// Build a node from a host record with unit scale.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for non-finite fields or a
    /// negative size.
    pub fn from_record(rec: &NodeRecord) -> Result<Self, EngineError> {
        validate_record(rec)?;
        Ok(Self {
            id: rec.id,
            x: rec.x,
            y: rec.y,
            w: rec.w,
            h: rec.h,
            vx: rec.vx,
            vy: rec.vy,
            flags: NodeFlags::from_bits_retain(rec.flags),
            scale: 1.0,
        })
    }

    /// Replace the host-owned fields, keeping `scale`.
    pub fn apply_record(&mut self, rec: &NodeRecord) {
        self.x = rec.x;
        self.y = rec.y;
        self.w = rec.w;
        self.h = rec.h;
        self.vx = rec.vx;
        self.vy = rec.vy;
        self.flags = NodeFlags::from_bits_retain(rec.flags);
    }

    /// Effective width after pinch scaling.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.w * self.scale
    }

    /// Effective height after pinch scaling.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.h * self.scale
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Inclusive bounds test against the effective size.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width() && p.y >= self.y && p.y <= self.y + self.height()
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.flags.contains(NodeFlags::PINNED)
    }

    /// Snapshot back into the wire layout (unscaled size).
    #[must_use]
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: self.id,
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            vx: self.vx,
            vy: self.vy,
            flags: self.flags.bits(),
        }
    }
}

/// Check a record before any table mutation.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] for non-finite fields or a
/// negative size.
pub fn validate_record(rec: &NodeRecord) -> Result<(), EngineError> {
    let fields = [rec.x, rec.y, rec.w, rec.h, rec.vx, rec.vy];
    if fields.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::invalid(format!("node {} has a non-finite field", rec.id)));
    }
    if rec.w < 0.0 || rec.h < 0.0 {
        return Err(EngineError::invalid(format!("node {} has a negative size", rec.id)));
    }
    Ok(())
}

// =============================================================
// NodeTable
// =============================================================

/// In-memory store of live nodes in insertion (draw) order.
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    capacity: usize,
}

impl NodeTable {
    /// Create an empty table holding at most `capacity` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Initialization`] if storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, EngineError> {
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(|e| EngineError::Initialization(format!("node table: {e}")))?;
        let mut index = HashMap::new();
        index
            .try_reserve(capacity)
            .map_err(|e| EngineError::Initialization(format!("node index: {e}")))?;
        Ok(Self { nodes, index, capacity })
    }

    /// Insert or update one node by id. Returns `false` if the id is new and
    /// the table is full.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for an invalid record.
    pub fn upsert(&mut self, rec: &NodeRecord) -> Result<bool, EngineError> {
        if let Some(&i) = self.index.get(&rec.id) {
            validate_record(rec)?;
            self.nodes[i].apply_record(rec);
            return Ok(true);
        }
        if self.nodes.len() >= self.capacity {
            return Ok(false);
        }
        let node = Node::from_record(rec)?;
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(true)
    }

    /// Remove a node by id, preserving the order of the rest.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let i = self.index.remove(&id)?;
        let node = self.nodes.remove(i);
        for later in &self.nodes[i..] {
            if let Some(slot) = self.index.get_mut(&later.id) {
                *slot -= 1;
            }
        }
        Some(node)
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Nodes in draw order, bottom first.
    #[must_use]
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub fn as_mut_slice(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove every node. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }
}
