//! Gesture recognition: turns per-frame pointer records into node holds,
//! pinch updates, and tap / double-tap / drag events.
//!
//! # State machine
//!
//! - `Idle` → first contact down → `SinglePressed` (target = topmost node).
//! - `SinglePressed` → movement beyond the move threshold → `Dragging`
//!   (emits `drag_start`). A press that drags never produces a tap.
//! - One contact active, second goes down → `Pinching`. A started drag is
//!   closed with `drag_end` first so drag events always pair.
//! - A pinch contact lifts with others still down → `Settling`; the rest of
//!   the press produces nothing until every contact is up.
//! - Last contact up → `Idle`, emitting `tap` / `double_tap` / `drag_end`.
//!
//! # Invariants
//!
//! 1. Pinch scale is measured from the start of the current two-contact
//!    gesture, never accumulated across pinches.
//! 2. A pinned node is never bound to a pointer and never pinch-scaled.
//! 3. All timing uses the engine clock passed into [`GestureRecognizer::process`].

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::HashMap;

use scene_buffers::{EventKind, EventRecord, PointerRecord, TapParamsRecord};

use crate::consts::{
    DEFAULT_DOUBLE_TAP_WINDOW_S, DEFAULT_MOVE_THRESHOLD_PX, DEFAULT_SINGLE_TAP_DELAY_S, DEFAULT_TAP_MAX_S,
    MIN_PINCH_DISTANCE, MIN_PINCH_SCALE, RELEASE_VELOCITY_SMOOTHING,
};
use crate::error::EngineError;
use crate::geom::{Point, apply_pinch};
use crate::hit;
use crate::physics::Constraints;
use crate::scene::{NodeId, NodeTable};

// ── Configuration ───────────────────────────────────────────────

/// Tap classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TapParams {
    /// Longest press, in seconds, that still counts as a tap.
    pub tap_max_s: f32,
    /// Movement from the press point at which a press becomes a drag.
    pub move_threshold_px: f32,
    /// Window after a tap in which a second tap on the same target is a double tap.
    pub double_tap_window_s: f32,
    /// Delay before a single tap is reported; 0 reports it immediately.
    pub single_tap_delay_s: f32,
}

impl Default for TapParams {
    fn default() -> Self {
        Self {
            tap_max_s: DEFAULT_TAP_MAX_S,
            move_threshold_px: DEFAULT_MOVE_THRESHOLD_PX,
            double_tap_window_s: DEFAULT_DOUBLE_TAP_WINDOW_S,
            single_tap_delay_s: DEFAULT_SINGLE_TAP_DELAY_S,
        }
    }
}

impl TapParams {
    /// Validate a decoded tap params record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] unless every field is finite
    /// and non-negative.
    pub fn from_record(rec: &TapParamsRecord) -> Result<Self, EngineError> {
        let fields = [rec.tap_max_s, rec.move_threshold_px, rec.double_tap_window_s, rec.single_tap_delay_s];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(EngineError::invalid(format!("tap params must be finite and >= 0, got {fields:?}")));
        }
        Ok(Self {
            tap_max_s: rec.tap_max_s,
            move_threshold_px: rec.move_threshold_px,
            double_tap_window_s: rec.double_tap_window_s,
            single_tap_delay_s: rec.single_tap_delay_s,
        })
    }
}

// ── State ───────────────────────────────────────────────────────

/// One pressed pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub pointer_id: i32,
    pub pos: Point,
    pub down_pos: Point,
    /// Engine clock at press.
    pub down_at: f64,
    /// Smoothed velocity in scene units per second.
    pub velocity: Point,
    pub pressure: f32,
    /// Set once movement from `down_pos` exceeded the move threshold.
    pub moved: bool,
}

/// A pointer holding a node, with the pointer-to-origin offset captured at press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerBinding {
    pub pointer_id: i32,
    pub node_id: NodeId,
    pub grab_offset: Point,
}

/// The node a pinch scales, as it was when the pinch began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchTarget {
    pub node_id: NodeId,
    pub start_pos: Point,
    pub start_scale: f32,
}

/// A two-contact gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pinch {
    pub pointers: [i32; 2],
    pub start_centroid: Point,
    pub start_distance: f32,
    pub target: Option<PinchTarget>,
}

/// Current gesture phase for the whole pointer set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase {
    /// No contacts down.
    #[default]
    Idle,
    /// One contact down, still within the move threshold.
    SinglePressed { pointer_id: i32, target: Option<NodeId> },
    /// One contact down and past the move threshold.
    Dragging { pointer_id: i32, target: Option<NodeId> },
    Pinching(Pinch),
    /// A pinch ended with contacts still down; waiting for all to lift.
    Settling,
}

#[derive(Debug, Clone, Copy)]
struct LastTap {
    target: Option<NodeId>,
    at: f64,
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    event: EventRecord,
    at: f64,
}

// ── GestureRecognizer ───────────────────────────────────────────

/// Stateful classifier for the engine's pointer set.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    params: TapParams,
    phase: GesturePhase,
    contacts: Vec<Contact>,
    bindings: HashMap<i32, PointerBinding>,
    last_tap: Option<LastTap>,
    pending_tap: Option<PendingTap>,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(params: TapParams) -> Self {
        Self { params, ..Self::default() }
    }

    #[must_use]
    pub fn params(&self) -> TapParams {
        self.params
    }

    pub fn set_params(&mut self, params: TapParams) {
        self.params = params;
    }

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    #[must_use]
    pub fn binding(&self, pointer_id: i32) -> Option<&PointerBinding> {
        self.bindings.get(&pointer_id)
    }

    fn contact_index(&self, pointer_id: i32) -> Option<usize> {
        self.contacts.iter().position(|c| c.pointer_id == pointer_id)
    }

    fn contact(&self, pointer_id: i32) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.pointer_id == pointer_id)
    }

    /// Apply one frame of pointer records (at most one per id) at engine time
    /// `now`, then resolve the pinch and any due pending tap.
    pub fn process(
        &mut self,
        updates: &[PointerRecord],
        nodes: &mut NodeTable,
        constraints: &Constraints,
        now: f64,
        dt: f32,
    ) -> Vec<EventRecord> {
        let mut events = Vec::new();
        let mut touched = Vec::with_capacity(updates.len());

        for u in updates {
            let pos = Point::new(u.x, u.y);
            match (self.contact_index(u.id), u.is_pressed()) {
                (None, true) => self.pointer_down(u, nodes, now, &mut events),
                (Some(i), true) => self.pointer_move(i, pos, u.pressure, dt, &mut events),
                (Some(i), false) => {
                    self.pointer_move(i, pos, u.pressure, dt, &mut events);
                    self.pointer_up(i, nodes, constraints, now, &mut events);
                }
                (None, false) => {}
            }
            touched.push(u.id);
        }

        // Contacts that reported nothing this frame are standing still.
        for c in self.contacts.iter_mut().filter(|c| !touched.contains(&c.pointer_id)) {
            c.velocity = Point::new(
                c.velocity.x * (1.0 - RELEASE_VELOCITY_SMOOTHING),
                c.velocity.y * (1.0 - RELEASE_VELOCITY_SMOOTHING),
            );
        }

        self.update_pinch(nodes);
        self.flush_pending_tap(now, &mut events);
        events
    }

    fn pointer_down(&mut self, u: &PointerRecord, nodes: &NodeTable, now: f64, events: &mut Vec<EventRecord>) {
        let pos = Point::new(u.x, u.y);
        match self.contacts.len() {
            0 => {
                let target = hit::topmost_node(nodes.as_slice(), pos);
                if let Some(node) = target.and_then(|id| nodes.get(id)).filter(|n| !n.is_pinned()) {
                    self.bindings.insert(
                        u.id,
                        PointerBinding { pointer_id: u.id, node_id: node.id, grab_offset: pos.sub(node.position()) },
                    );
                }
                self.phase = GesturePhase::SinglePressed { pointer_id: u.id, target };
            }
            1 => {
                let first = self.contacts[0];
                let fallback = match self.phase {
                    GesturePhase::SinglePressed { target, .. } | GesturePhase::Dragging { target, .. } => target,
                    _ => None,
                };
                if let GesturePhase::Dragging { pointer_id, target } = self.phase {
                    events.push(drag_end(target, pointer_id, first.down_at, now));
                }
                self.bindings.remove(&first.pointer_id);

                let centroid = first.pos.midpoint(pos);
                let target = hit::pinch_target(nodes.as_slice(), centroid, fallback)
                    .and_then(|id| nodes.get(id))
                    .map(|n| PinchTarget { node_id: n.id, start_pos: n.position(), start_scale: n.scale });
                tracing::debug!(node = ?target.map(|t| t.node_id), "pinch started");
                self.phase = GesturePhase::Pinching(Pinch {
                    pointers: [first.pointer_id, u.id],
                    start_centroid: centroid,
                    start_distance: first.pos.distance(pos).max(MIN_PINCH_DISTANCE),
                    target,
                });
            }
            _ => {}
        }
        self.contacts.push(Contact {
            pointer_id: u.id,
            pos,
            down_pos: pos,
            down_at: now,
            velocity: Point::default(),
            pressure: u.pressure,
            moved: false,
        });
    }

    fn pointer_move(&mut self, i: usize, pos: Point, pressure: f32, dt: f32, events: &mut Vec<EventRecord>) {
        let threshold = self.params.move_threshold_px;
        let c = &mut self.contacts[i];
        if dt > 0.0 {
            let a = RELEASE_VELOCITY_SMOOTHING;
            let d = pos.sub(c.pos);
            c.velocity = Point::new(a * d.x / dt + (1.0 - a) * c.velocity.x, a * d.y / dt + (1.0 - a) * c.velocity.y);
        }
        c.pos = pos;
        c.pressure = pressure;
        if !c.moved && pos.distance(c.down_pos) > threshold {
            c.moved = true;
        }

        let (pid, moved) = (c.pointer_id, c.moved);
        if let GesturePhase::SinglePressed { pointer_id, target } = self.phase {
            if pointer_id == pid && moved {
                self.phase = GesturePhase::Dragging { pointer_id, target };
                events.push(EventRecord { kind: EventKind::DragStart, a: node_wire(target), b: pointer_id, data: 0 });
            }
        }
    }

    fn pointer_up(
        &mut self,
        i: usize,
        nodes: &mut NodeTable,
        constraints: &Constraints,
        now: f64,
        events: &mut Vec<EventRecord>,
    ) {
        let contact = self.contacts.remove(i);
        let binding = self.bindings.remove(&contact.pointer_id);

        if !self.contacts.is_empty() {
            if let GesturePhase::Pinching(pinch) = self.phase {
                if pinch.pointers.contains(&contact.pointer_id) {
                    self.phase = GesturePhase::Settling;
                }
            }
            return;
        }

        match self.phase {
            GesturePhase::SinglePressed { pointer_id, target } if pointer_id == contact.pointer_id => {
                if now - contact.down_at < f64::from(self.params.tap_max_s) {
                    self.register_tap(target, pointer_id, now, events);
                }
            }
            GesturePhase::Dragging { pointer_id, target } if pointer_id == contact.pointer_id => {
                events.push(drag_end(target, pointer_id, contact.down_at, now));
                if constraints.inertia {
                    if let Some(node) = binding.and_then(|b| nodes.get_mut(b.node_id)) {
                        node.vx = contact.velocity.x;
                        node.vy = contact.velocity.y;
                    }
                }
            }
            _ => {}
        }
        self.phase = GesturePhase::Idle;
        self.bindings.clear();
    }

    fn register_tap(&mut self, target: Option<NodeId>, pointer_id: i32, now: f64, events: &mut Vec<EventRecord>) {
        let window = f64::from(self.params.double_tap_window_s);
        if let Some(last) = self.last_tap {
            if last.target == target && now - last.at <= window {
                self.last_tap = None;
                self.pending_tap = None;
                events.push(EventRecord { kind: EventKind::DoubleTap, a: node_wire(target), b: 2, data: pointer_id });
                return;
            }
        }

        // Not a double tap, so whatever tap was still waiting is final.
        if let Some(pending) = self.pending_tap.take() {
            events.push(pending.event);
        }
        self.last_tap = Some(LastTap { target, at: now });
        let tap = EventRecord { kind: EventKind::Tap, a: node_wire(target), b: 1, data: pointer_id };
        if self.params.single_tap_delay_s > 0.0 {
            self.pending_tap = Some(PendingTap { event: tap, at: now });
        } else {
            events.push(tap);
        }
    }

    /// Emit a held tap once its delay has run and it can no longer become
    /// half of a double tap.
    fn flush_pending_tap(&mut self, now: f64, events: &mut Vec<EventRecord>) {
        let delay = f64::from(self.params.single_tap_delay_s);
        let window = f64::from(self.params.double_tap_window_s);
        if self.pending_tap.is_some_and(|p| now - p.at >= delay && now - p.at > window) {
            if let Some(p) = self.pending_tap.take() {
                events.push(p.event);
            }
        }
    }

    /// Scale and reposition the pinch target from the live contact pair.
    fn update_pinch(&mut self, nodes: &mut NodeTable) {
        let GesturePhase::Pinching(pinch) = self.phase else {
            return;
        };
        let Some(target) = pinch.target else {
            return;
        };
        let (Some(a), Some(b)) = (self.contact(pinch.pointers[0]), self.contact(pinch.pointers[1])) else {
            return;
        };
        let centroid = a.pos.midpoint(b.pos);
        let distance = a.pos.distance(b.pos).max(MIN_PINCH_DISTANCE);
        let scale = (target.start_scale * distance / pinch.start_distance).max(MIN_PINCH_SCALE);
        let pos = apply_pinch(target.start_pos, target.start_scale, pinch.start_centroid, centroid, scale);
        if let Some(node) = nodes.get_mut(target.node_id) {
            node.scale = scale;
            node.x = pos.x;
            node.y = pos.y;
        }
    }

    /// Nodes under pointer control this frame.
    ///
    /// Bound nodes map to `pointer - grab_offset`; the pinch target maps to
    /// `None` because [`GestureRecognizer::process`] already placed it.
    #[must_use]
    pub fn holds(&self) -> HashMap<NodeId, Option<Point>> {
        let mut holds = HashMap::with_capacity(self.bindings.len() + 1);
        for b in self.bindings.values() {
            if let Some(c) = self.contact(b.pointer_id) {
                holds.insert(b.node_id, Some(c.pos.sub(b.grab_offset)));
            }
        }
        if let GesturePhase::Pinching(Pinch { target: Some(t), .. }) = self.phase {
            holds.insert(t.node_id, None);
        }
        holds
    }

    /// Drop every reference to a removed node.
    pub fn forget_node(&mut self, id: NodeId) {
        self.bindings.retain(|_, b| b.node_id != id);
        match &mut self.phase {
            GesturePhase::SinglePressed { target, .. } | GesturePhase::Dragging { target, .. } => {
                if *target == Some(id) {
                    *target = None;
                }
            }
            GesturePhase::Pinching(pinch) => {
                if pinch.target.is_some_and(|t| t.node_id == id) {
                    pinch.target = None;
                }
            }
            GesturePhase::Idle | GesturePhase::Settling => {}
        }
        if self.last_tap.is_some_and(|t| t.target == Some(id)) {
            self.last_tap = None;
        }
    }
}

/// Node id on the wire; 0 when nothing was hit.
fn node_wire(target: Option<NodeId>) -> i32 {
    target.unwrap_or(0)
}

fn drag_end(target: Option<NodeId>, pointer_id: i32, down_at: f64, now: f64) -> EventRecord {
    let held_ms = ((now - down_at) * 1000.0).round() as i32;
    EventRecord { kind: EventKind::DragEnd, a: node_wire(target), b: pointer_id, data: held_ms }
}
