//! Node stepper: pointer holds, inertia, grid snapping, and bounds clamping.
//!
//! Each node goes through the same fixed sequence every frame. A pointer
//! hold beats inertia, snapping runs after movement, and clamping runs last
//! so a snapped position can still be pulled back inside the bounds.

#[cfg(test)]
#[path = "physics_test.rs"]
mod physics_test;

use std::collections::HashMap;

use scene_buffers::ConstraintsRecord;

use crate::consts::VELOCITY_EPSILON;
use crate::error::EngineError;
use crate::geom::Point;
use crate::scene::{Node, NodeId};

/// Active bounds, grid, and inertia configuration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Constraints {
    pub left: f32,
    pub top: f32,
    /// May be `f32::INFINITY` for an open side.
    pub right: f32,
    /// May be `f32::INFINITY` for an open side.
    pub bottom: f32,
    /// Steps of 1 or less disable snapping on that axis.
    pub grid_x: f32,
    pub grid_y: f32,
    pub inertia: bool,
    /// Per-second velocity retention in `[0, 1]`.
    pub damping: f32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: f32::INFINITY,
            bottom: f32::INFINITY,
            grid_x: 1.0,
            grid_y: 1.0,
            inertia: false,
            damping: 1.0,
        }
    }
}

impl Constraints {
    /// Validate a decoded constraints record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for a non-finite origin, a far
    /// side before its near side, a negative or non-finite grid step, or a
    /// damping factor outside `[0, 1]`.
    pub fn from_record(rec: &ConstraintsRecord) -> Result<Self, EngineError> {
        if !rec.left.is_finite() || !rec.top.is_finite() {
            return Err(EngineError::invalid("constraint left/top must be finite"));
        }
        if rec.right.is_nan() || rec.bottom.is_nan() || rec.right < rec.left || rec.bottom < rec.top {
            return Err(EngineError::invalid(format!(
                "constraint rectangle ({}, {}, {}, {}) is inverted",
                rec.left, rec.top, rec.right, rec.bottom
            )));
        }
        if !(rec.grid_x.is_finite() && rec.grid_x >= 0.0 && rec.grid_y.is_finite() && rec.grid_y >= 0.0) {
            return Err(EngineError::invalid("grid steps must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&rec.damping) {
            return Err(EngineError::invalid(format!("damping must be in [0, 1], got {}", rec.damping)));
        }
        Ok(Self {
            left: rec.left,
            top: rec.top,
            right: rec.right,
            bottom: rec.bottom,
            grid_x: rec.grid_x,
            grid_y: rec.grid_y,
            inertia: rec.inertia != 0.0,
            damping: rec.damping,
        })
    }
}

/// Round `pos` to the nearest multiple of `step` when `step > 1`.
#[must_use]
pub fn snap(pos: f32, step: f32) -> f32 {
    if step > 1.0 { (pos / step).round() * step } else { pos }
}

/// Clamp a span of length `size` starting at `pos` into `[lo, hi]`.
///
/// A span larger than the range is pinned to `lo`.
#[must_use]
pub fn clamp_axis(pos: f32, size: f32, lo: f32, hi: f32) -> f32 {
    let max = lo + (hi - lo - size).max(0.0);
    pos.max(lo).min(max)
}

/// Decay one velocity component, snapping the tail to zero.
fn settle(v: f32, factor: f32) -> f32 {
    let v = v * factor;
    if v.abs() < VELOCITY_EPSILON { 0.0 } else { v }
}

/// Advance every unpinned node by `dt` seconds.
///
/// `holds` maps nodes under pointer control to the top-left position the
/// pointer wants, or `None` when the node is held where it already is (the
/// pinch target). Held nodes lose their velocity.
pub fn step_nodes(nodes: &mut [Node], holds: &HashMap<NodeId, Option<Point>>, c: &Constraints, dt: f32) {
    let decay = if c.damping < 1.0 { c.damping.powf(dt) } else { 1.0 };
    for n in nodes.iter_mut().filter(|n| !n.is_pinned()) {
        if let Some(hold) = holds.get(&n.id) {
            if let Some(p) = hold {
                n.x = p.x;
                n.y = p.y;
            }
            n.vx = 0.0;
            n.vy = 0.0;
        } else if c.inertia {
            n.x += n.vx * dt;
            n.y += n.vy * dt;
            if c.damping < 1.0 {
                n.vx = settle(n.vx, decay);
                n.vy = settle(n.vy, decay);
            }
        }

        n.x = snap(n.x, c.grid_x);
        n.y = snap(n.y, c.grid_y);

        n.x = clamp_axis(n.x, n.width(), c.left, c.right);
        n.y = clamp_axis(n.y, n.height(), c.top, c.bottom);
    }
}
