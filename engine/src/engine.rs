//! Frame orchestrator.
//!
//! [`EngineCore`] owns one scene and sequences every subsystem once per
//! [`EngineCore::process_frame`]: staged pointers go through the gesture
//! recognizer, nodes are stepped, particles are stepped, and the output
//! buffers are assembled. Host mutations between frames are staged or
//! applied whole; a rejected call leaves the scene untouched.
//!
//! Separated from the `wasm` wrapper so it can be tested natively.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use scene_buffers::{
    ConstraintsRecord, DrawPointRecord, NodeRecord, ParticleParamsRecord, ParticleRecord, PointerLayout, PointerRecord,
    Record, TapParamsRecord, TransformRecord, decode, decode_one, decode_pointers, decode_pointers_with, encode_events,
};
use serde::Serialize;

use crate::consts::{MAX_CAPACITY, MAX_FRAME_DT, SEED_FALLBACK_EXTENT};
use crate::error::EngineError;
use crate::geom::Point;
use crate::gesture::{GestureRecognizer, TapParams};
use crate::hit::{self, Hit};
use crate::image::{ImageStore, ResizeMode};
use crate::particles::{Particle, ParticleParams, ParticlePool};
use crate::paths::{PathId, PathRecorder};
use crate::physics::{self, Constraints};
use crate::scene::{Node, NodeId, NodeTable, validate_record};
use crate::view::View;

/// Buffers produced by one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// `[id, x, y, angle, sx, sy, reserved]` per node, in device space.
    pub transforms: Vec<f32>,
    /// `[x, y, vx, vy, radius, life]` per live particle, in scene space.
    pub particles: Vec<f32>,
    /// `[type, a, b, data]` per gesture event.
    pub events: Vec<i32>,
    /// Variable-length draw-path stream.
    pub draw_paths: Vec<f64>,
}

impl FrameOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty() && self.particles.is_empty() && self.events.is_empty() && self.draw_paths.is_empty()
    }
}

/// Snapshot of engine occupancy for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineStats {
    pub capacity: usize,
    pub nodes: usize,
    pub particles: usize,
    pub draw_paths: usize,
    pub images: usize,
    pub contacts: usize,
    pub frame: u64,
    /// Engine clock in seconds.
    pub clock: f64,
}

/// Everything owned by an initialized engine.
#[derive(Debug)]
struct Scene {
    capacity: usize,
    nodes: NodeTable,
    particles: ParticlePool,
    paths: PathRecorder,
    images: ImageStore,
    gesture: GestureRecognizer,
    constraints: Constraints,
    particle_params: ParticleParams,
    view: View,
    /// Pointer records waiting for the next frame, at most one per id.
    staged: Vec<PointerRecord>,
    clock: f64,
    frame: u64,
}

impl Scene {
    fn new(capacity: usize) -> Result<Self, EngineError> {
        Ok(Self {
            capacity,
            nodes: NodeTable::with_capacity(capacity)?,
            particles: ParticlePool::with_capacity(capacity)?,
            paths: PathRecorder::new(),
            images: ImageStore::default(),
            gesture: GestureRecognizer::new(TapParams::default()),
            constraints: Constraints::default(),
            particle_params: ParticleParams::default(),
            view: View::default(),
            staged: Vec::new(),
            clock: 0.0,
            frame: 0,
        })
    }

    /// Clear all content and restore default configuration in place.
    fn reset(&mut self) {
        self.nodes.clear();
        self.particles.clear();
        self.paths.clear();
        self.images.clear();
        self.gesture = GestureRecognizer::new(TapParams::default());
        self.constraints = Constraints::default();
        self.particle_params = ParticleParams::default();
        self.view = View::default();
        self.staged.clear();
        self.clock = 0.0;
        self.frame = 0;
    }

    fn stage(&mut self, records: Vec<PointerRecord>) -> usize {
        let n = records.len();
        for rec in records {
            match self.staged.iter_mut().find(|s| s.id == rec.id) {
                Some(slot) => *slot = rec,
                None => self.staged.push(rec),
            }
        }
        n
    }

    fn draw_point(&self, x: f32, y: f32, pressure: f32) -> DrawPointRecord {
        DrawPointRecord { x, y, pressure, timestamp: self.clock }
    }

    fn step(&mut self, dt: f32) -> FrameOutput {
        self.clock += f64::from(dt);
        self.frame += 1;

        let updates = std::mem::take(&mut self.staged);
        let events = self.gesture.process(&updates, &mut self.nodes, &self.constraints, self.clock, dt);
        let holds = self.gesture.holds();
        physics::step_nodes(self.nodes.as_mut_slice(), &holds, &self.constraints, dt);
        self.particles.step(&self.particle_params, &self.constraints, dt);

        let mut out = FrameOutput {
            transforms: Vec::with_capacity(self.nodes.len() * TransformRecord::STRIDE),
            events: encode_events(&events),
            ..FrameOutput::default()
        };
        let device_scale = self.view.device_scale();
        for n in self.nodes.iter() {
            let p = self.view.scene_to_device(n.position());
            let s = n.scale * device_scale;
            TransformRecord { id: n.id, x: p.x, y: p.y, angle: 0.0, sx: s, sy: s }.write(&mut out.transforms);
        }
        self.particles.write(&mut out.particles);
        self.paths.write(&mut out.draw_paths);
        out
    }

    /// Centre of the constraints rectangle, or a fixed offset on open axes.
    fn bounds_center(&self) -> Point {
        let c = &self.constraints;
        let mid = |lo: f32, hi: f32| if hi.is_finite() { (lo + hi) / 2.0 } else { lo + SEED_FALLBACK_EXTENT / 2.0 };
        Point::new(mid(c.left, c.right), mid(c.top, c.bottom))
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            capacity: self.capacity,
            nodes: self.nodes.len(),
            particles: self.particles.len(),
            draw_paths: self.paths.len(),
            images: self.images.len(),
            contacts: self.gesture.contacts().len(),
            frame: self.frame,
            clock: self.clock,
        }
    }
}

/// Core engine state, independent of the WASM boundary.
///
/// Any number of engines may coexist; none share state.
#[derive(Debug, Default)]
pub struct EngineCore {
    scene: Option<Scene>,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn scene(&self) -> Result<&Scene, EngineError> {
        self.scene.as_ref().ok_or(EngineError::NotReady)
    }

    fn scene_mut(&mut self) -> Result<&mut Scene, EngineError> {
        self.scene.as_mut().ok_or(EngineError::NotReady)
    }

    // --- Lifecycle ---

    /// Allocate pools for `capacity` nodes and `capacity` particles, dropping
    /// any previous scene.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Initialization`] for a capacity outside
    /// `1..=MAX_CAPACITY` or a failed allocation. The engine is then not ready.
    pub fn init(&mut self, capacity: usize) -> Result<(), EngineError> {
        self.scene = None;
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(EngineError::Initialization(format!(
                "capacity {capacity} outside 1..={MAX_CAPACITY}"
            )));
        }
        self.scene = Some(Scene::new(capacity)?);
        tracing::info!(capacity, "scene engine initialized");
        Ok(())
    }

    /// Whether `init` has succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.scene.is_some()
    }

    /// Clear nodes, pointers, particles, paths, images, and gesture state and
    /// restore default configuration. Capacity is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] before `init`.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.scene_mut()?.reset();
        tracing::info!("scene engine reset");
        Ok(())
    }

    // --- Configuration ---

    /// Set the view scale, keeping pan and pixel ratio.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] or [`EngineError::InvalidArgument`].
    pub fn set_view(&mut self, scale: f32) -> Result<(), EngineError> {
        let scene = self.scene_mut()?;
        let v = scene.view;
        scene.view = View::new(scale, v.pan_x, v.pan_y, v.pixel_ratio)?;
        Ok(())
    }

    /// Replace the whole view transform.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] or [`EngineError::InvalidArgument`].
    pub fn set_view_params(&mut self, scale: f32, pan_x: f32, pan_y: f32, pixel_ratio: f32) -> Result<(), EngineError> {
        let view = View::new(scale, pan_x, pan_y, pixel_ratio)?;
        self.scene_mut()?.view = view;
        Ok(())
    }

    /// Replace the active constraints from an 8-value buffer.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`], [`EngineError::MalformedBuffer`], or
    /// [`EngineError::InvalidArgument`].
    pub fn set_constraints(&mut self, buf: &[f32]) -> Result<(), EngineError> {
        let scene = self.scene_mut()?;
        let rec: ConstraintsRecord = decode_one(buf)?;
        scene.constraints = Constraints::from_record(&rec)?;
        Ok(())
    }

    /// Replace tap classification thresholds from a 4-value buffer.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`], [`EngineError::MalformedBuffer`], or
    /// [`EngineError::InvalidArgument`].
    pub fn set_tap_params(&mut self, buf: &[f32]) -> Result<(), EngineError> {
        let scene = self.scene_mut()?;
        let rec: TapParamsRecord = decode_one(buf)?;
        scene.gesture.set_params(TapParams::from_record(&rec)?);
        Ok(())
    }

    /// Replace particle forces from a 4-value buffer.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`], [`EngineError::MalformedBuffer`], or
    /// [`EngineError::InvalidArgument`].
    pub fn set_particle_params(&mut self, buf: &[f32]) -> Result<(), EngineError> {
        let scene = self.scene_mut()?;
        let rec: ParticleParamsRecord = decode_one(buf)?;
        scene.particle_params = ParticleParams::from_record(&rec)?;
        Ok(())
    }

    // --- Nodes ---

    /// Insert or update nodes from an 8-stride buffer. Returns the number of
    /// records applied; new ids past capacity are skipped.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`], [`EngineError::MalformedBuffer`], or
    /// [`EngineError::InvalidArgument`]. On error no node is touched.
    pub fn upsert_nodes(&mut self, buf: &[f32]) -> Result<usize, EngineError> {
        let scene = self.scene_mut()?;
        let records: Vec<NodeRecord> = decode(buf)?;
        records.iter().try_for_each(validate_record)?;
        let mut applied = 0;
        for rec in &records {
            if scene.nodes.upsert(rec)? {
                applied += 1;
            }
        }
        if applied < records.len() {
            tracing::debug!(applied, offered = records.len(), "node table full");
        }
        Ok(applied)
    }

    /// Remove nodes by id along with any pointer binding on them. Returns the
    /// number removed.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<usize, EngineError> {
        let scene = self.scene_mut()?;
        let mut removed = 0;
        for &id in ids {
            if scene.nodes.remove(id).is_some() {
                scene.gesture.forget_node(id);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Current state of one node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.scene.as_ref()?.nodes.get(id).copied()
    }

    // --- Pointers ---

    /// Stage pointer records for the next frame, detecting the layout from
    /// the buffer length. Returns the number of records staged.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`], [`EngineError::MalformedBuffer`], or
    /// [`EngineError::InvalidArgument`] for a non-finite position.
    pub fn apply_pointers(&mut self, buf: &[f32]) -> Result<usize, EngineError> {
        let scene = self.scene_mut()?;
        let records = decode_pointers(buf)?;
        stage_checked(scene, records)
    }

    /// Stage pointer records in an explicit layout.
    ///
    /// # Errors
    ///
    /// As [`EngineCore::apply_pointers`].
    pub fn apply_pointers_with_layout(&mut self, buf: &[f32], layout: PointerLayout) -> Result<usize, EngineError> {
        let scene = self.scene_mut()?;
        let records = decode_pointers_with(buf, layout)?;
        stage_checked(scene, records)
    }

    // --- Particles ---

    /// Spawn particles from a 6-stride buffer. Returns the admitted count;
    /// records past the remaining capacity are rejected.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`], [`EngineError::MalformedBuffer`], or
    /// [`EngineError::InvalidArgument`]. On error nothing is spawned.
    pub fn spawn_particles(&mut self, buf: &[f32]) -> Result<usize, EngineError> {
        let scene = self.scene_mut()?;
        let records: Vec<ParticleRecord> = decode(buf)?;
        let batch = records.iter().map(Particle::from_record).collect::<Result<Vec<_>, _>>()?;
        let admitted = scene.particles.spawn(&batch);
        if admitted < batch.len() {
            tracing::debug!(admitted, offered = batch.len(), "particle pool full");
        }
        Ok(admitted)
    }

    /// Remove every particle.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn clear_particles(&mut self) -> Result<(), EngineError> {
        self.scene_mut()?.particles.clear();
        Ok(())
    }

    /// Replace the pool with `n` particles on a ring at the bounds centre.
    /// Returns the seeded count.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn seed_particles_for_bench(&mut self, n: usize) -> Result<usize, EngineError> {
        let scene = self.scene_mut()?;
        let center = scene.bounds_center();
        Ok(scene.particles.seed_ring(n, center))
    }

    // --- Images ---

    /// Store an RGBA image under `id`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] or [`EngineError::InvalidArgument`].
    pub fn store_image(&mut self, id: i32, rgba: &[u8], width: u32, height: u32) -> Result<(), EngineError> {
        self.scene_mut()?.images.store(id, rgba, width, height)
    }

    /// Nearest-neighbour resize of a stored image.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] or [`EngineError::InvalidArgument`].
    pub fn resize_image(&self, id: i32, out_w: u32, out_h: u32) -> Result<Vec<u8>, EngineError> {
        self.scene()?.images.resize(id, out_w, out_h, ResizeMode::Nearest)
    }

    /// Resize a stored image with mode `0` (nearest) or `1` (bilinear).
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] or [`EngineError::InvalidArgument`] for an
    /// unknown mode or image.
    pub fn resize_image_mode(&self, id: i32, out_w: u32, out_h: u32, mode: u32) -> Result<Vec<u8>, EngineError> {
        let mode = ResizeMode::try_from(mode)?;
        self.scene()?.images.resize(id, out_w, out_h, mode)
    }

    // --- Draw paths ---

    /// Open a new path. Returns `false` for a duplicate id or invalid stroke.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn start_draw_path(
        &mut self,
        id: PathId,
        x: f32,
        y: f32,
        pressure: f32,
        color: u32,
        line_width: f32,
    ) -> Result<bool, EngineError> {
        let scene = self.scene_mut()?;
        let first = scene.draw_point(x, y, pressure);
        Ok(scene.paths.start(id, first, color, line_width))
    }

    /// Append to an open path. Returns `false` when the path is unknown,
    /// sealed, or full.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn add_draw_point(&mut self, id: PathId, x: f32, y: f32, pressure: f32) -> Result<bool, EngineError> {
        let scene = self.scene_mut()?;
        let point = scene.draw_point(x, y, pressure);
        Ok(scene.paths.add_point(id, point))
    }

    /// Seal a path.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn finish_draw_path(&mut self, id: PathId, closed: bool) -> Result<bool, EngineError> {
        Ok(self.scene_mut()?.paths.finish(id, closed))
    }

    /// Discard every path.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn clear_draw_paths(&mut self) -> Result<(), EngineError> {
        self.scene_mut()?.paths.clear();
        Ok(())
    }

    // --- Frame ---

    /// Advance the scene by `dt` seconds and return the frame's buffers.
    ///
    /// Steps longer than [`MAX_FRAME_DT`] are clamped. Before `init` this
    /// returns empty buffers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for a negative or NaN `dt`.
    pub fn process_frame(&mut self, dt: f32) -> Result<FrameOutput, EngineError> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(FrameOutput::default());
        };
        if dt.is_nan() || dt < 0.0 {
            return Err(EngineError::invalid(format!("frame dt must be >= 0, got {dt}")));
        }
        Ok(scene.step(dt.min(MAX_FRAME_DT)))
    }

    // --- Queries ---

    /// What is under a scene-space point.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] before `init`.
    pub fn hit_test(&self, x: f32, y: f32) -> Result<Option<Hit>, EngineError> {
        let scene = self.scene()?;
        Ok(hit::hit_test(scene.nodes.as_slice(), scene.particles.as_slice(), Point::new(x, y)))
    }

    #[must_use]
    pub fn constraints(&self) -> Option<Constraints> {
        self.scene.as_ref().map(|s| s.constraints)
    }

    #[must_use]
    pub fn view(&self) -> Option<View> {
        self.scene.as_ref().map(|s| s.view)
    }

    #[must_use]
    pub fn tap_params(&self) -> Option<TapParams> {
        self.scene.as_ref().map(|s| s.gesture.params())
    }

    #[must_use]
    pub fn particle_params(&self) -> Option<ParticleParams> {
        self.scene.as_ref().map(|s| s.particle_params)
    }

    #[must_use]
    pub fn stats(&self) -> Option<EngineStats> {
        self.scene.as_ref().map(Scene::stats)
    }
}

fn stage_checked(scene: &mut Scene, records: Vec<PointerRecord>) -> Result<usize, EngineError> {
    if let Some(bad) = records.iter().find(|r| !(r.x.is_finite() && r.y.is_finite() && r.pressure.is_finite())) {
        return Err(EngineError::invalid(format!("pointer {} has a non-finite field", bad.id)));
    }
    Ok(scene.stage(records))
}
