//! Headless frame-cost benchmark.
//!
//! Each run builds a fresh engine with a grid of nodes, seeds the requested
//! number of particles on a ring, and drives a single pointer that grabs a
//! random node, drags it along a random walk, and lets go. Only the timed
//! frames after warm-up count toward the average.

#[cfg(test)]
#[path = "bench_test.rs"]
mod bench_test;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_buffers::{ConstraintsRecord, NodeRecord, ParticleParamsRecord, PointerLayout, PointerRecord};
use scene_engine::{EngineCore, EngineError};
use serde::Serialize;

use crate::config::BenchConfig;

const WORLD_W: f32 = 1280.0;
const WORLD_H: f32 = 720.0;
const GRID_COLUMNS: usize = 8;
const NODE_W: f32 = 96.0;
const NODE_H: f32 = 64.0;
const NODE_GAP: f32 = 24.0;
/// Frames a drag lasts before the pointer lifts and picks another node.
const DRAG_FRAMES: u32 = 45;
const DRAG_STEP_PX: f32 = 12.0;
const POINTER_ID: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to encode results: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timing for one particle count.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub particles: usize,
    /// Particles the pool actually admitted.
    pub seeded: usize,
    pub frames: u32,
    pub avg_step_ms: f64,
    pub est_fps: f64,
}

/// Run every configured particle count in order.
///
/// # Errors
///
/// Returns the first configuration or engine error.
pub fn run(cfg: &BenchConfig) -> Result<Vec<RunResult>, BenchError> {
    cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    cfg.particle_counts.iter().map(|&count| run_one(cfg, count, &mut rng)).collect()
}

fn run_one(cfg: &BenchConfig, particles: usize, rng: &mut StdRng) -> Result<RunResult, BenchError> {
    let mut engine = EngineCore::new();
    engine.init(particles.max(cfg.nodes).max(1))?;
    engine.set_constraints(&scene_buffers::encode(&[ConstraintsRecord {
        left: 0.0,
        top: 0.0,
        right: WORLD_W,
        bottom: WORLD_H,
        grid_x: 1.0,
        grid_y: 1.0,
        inertia: 1.0,
        damping: 0.9,
    }]))?;
    engine.set_particle_params(&scene_buffers::encode(&[ParticleParamsRecord {
        gravity_x: 0.0,
        gravity_y: 500.0,
        damping: 0.02,
        restitution: 0.2,
    }]))?;
    engine.upsert_nodes(&scene_buffers::encode(&grid_nodes(cfg.nodes)))?;
    let seeded = engine.seed_particles_for_bench(particles)?;
    tracing::debug!(particles, seeded, nodes = cfg.nodes, "bench scene ready");

    let mut drag = DragDriver::default();
    for _ in 0..cfg.warmup {
        drag.frame(&mut engine, cfg.dt, rng)?;
    }
    let started = Instant::now();
    for _ in 0..cfg.frames {
        drag.frame(&mut engine, cfg.dt, rng)?;
    }
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let avg_step_ms = elapsed_ms / f64::from(cfg.frames);
    let est_fps = if avg_step_ms > 0.0 { 1000.0 / avg_step_ms } else { 0.0 };
    tracing::info!(particles, avg_step_ms, est_fps, "bench run complete");
    Ok(RunResult { particles, seeded, frames: cfg.frames, avg_step_ms, est_fps })
}

/// Nodes laid out row by row, ids starting at 1.
pub fn grid_nodes(n: usize) -> Vec<NodeRecord> {
    (0..n)
        .map(|i| {
            let col = (i % GRID_COLUMNS) as f32;
            let row = (i / GRID_COLUMNS) as f32;
            NodeRecord {
                id: i as i32 + 1,
                x: NODE_GAP + col * (NODE_W + NODE_GAP),
                y: NODE_GAP + row * (NODE_H + NODE_GAP),
                w: NODE_W,
                h: NODE_H,
                vx: 0.0,
                vy: 0.0,
                flags: 0,
            }
        })
        .collect()
}

/// One pointer alternating between grabbing a node and releasing it.
#[derive(Debug, Default)]
struct DragDriver {
    pos: Option<(f32, f32)>,
    frames_left: u32,
}

impl DragDriver {
    fn frame(&mut self, engine: &mut EngineCore, dt: f32, rng: &mut StdRng) -> Result<(), BenchError> {
        let pointer = match self.pos {
            Some((x, y)) if self.frames_left > 0 => {
                self.frames_left -= 1;
                let nx = (x + rng.random_range(-DRAG_STEP_PX..=DRAG_STEP_PX)).clamp(0.0, WORLD_W);
                let ny = (y + rng.random_range(-DRAG_STEP_PX..=DRAG_STEP_PX)).clamp(0.0, WORLD_H);
                self.pos = Some((nx, ny));
                PointerRecord { id: POINTER_ID, x: nx, y: ny, pressure: 1.0, buttons: 1 }
            }
            Some((x, y)) => {
                self.pos = None;
                PointerRecord { id: POINTER_ID, x, y, pressure: 0.0, buttons: 0 }
            }
            None => {
                let (x, y) = Self::grab_point(engine, rng);
                self.pos = Some((x, y));
                self.frames_left = DRAG_FRAMES;
                PointerRecord { id: POINTER_ID, x, y, pressure: 1.0, buttons: 1 }
            }
        };
        engine.apply_pointers(&scene_buffers::encode_pointers(&[pointer], PointerLayout::Compact))?;
        engine.process_frame(dt)?;
        Ok(())
    }

    /// Centre of a random live node, or a random point if there are none.
    fn grab_point(engine: &EngineCore, rng: &mut StdRng) -> (f32, f32) {
        let count = engine.stats().map_or(0, |s| s.nodes);
        if count > 0 {
            let id = rng.random_range(1..=count) as i32;
            if let Some(node) = engine.node(id) {
                return (node.x + node.width() / 2.0, node.y + node.height() / 2.0);
            }
        }
        (rng.random_range(0.0..WORLD_W), rng.random_range(0.0..WORLD_H))
    }
}

/// Render results as the CSV table the bench prints by default.
#[must_use]
pub fn format_table(results: &[RunResult]) -> String {
    let mut out = String::from("particles, avg_step_ms, est_fps\n");
    for r in results {
        out.push_str(&format!("{}, {:.4}, {:.1}\n", r.particles, r.avg_step_ms, r.est_fps));
    }
    out
}
