//! `wasm-bindgen` host boundary.
//!
//! [`SceneEngine`] wraps one [`EngineCore`] for JavaScript. Every engine
//! error is handled here, once: it is logged and turned into the neutral
//! value the host expects (`false`, `0`, or an empty array), so a rejected
//! call can never throw into UI code.

use js_sys::{Float32Array, Float64Array, Int32Array, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::consts::MAX_PATH_ID;
use crate::engine::{EngineCore, FrameOutput};
use crate::error::EngineError;
use crate::hit::Hit;
use crate::paths::PathId;

/// Log a failed engine call and substitute `fallback`.
fn neutral<T>(op: &'static str, result: Result<T, EngineError>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(EngineError::NotReady) => {
            tracing::debug!(op, "scene engine not ready");
            fallback
        }
        Err(err) => {
            tracing::warn!(op, error = %err, "scene engine call rejected");
            fallback
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Draw-path ids arrive as JS numbers.
fn path_id(id: f64) -> Result<PathId, EngineError> {
    if id.is_finite() && id >= 0.0 && id.fract() == 0.0 && id <= MAX_PATH_ID as f64 {
        Ok(id as PathId)
    } else {
        Err(EngineError::InvalidArgument(format!("draw path id {id} is not a safe integer")))
    }
}

fn frame_object(out: &FrameOutput) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"transforms".into(), &Float32Array::from(out.transforms.as_slice()))?;
    Reflect::set(&obj, &"particles".into(), &Float32Array::from(out.particles.as_slice()))?;
    Reflect::set(&obj, &"events".into(), &Int32Array::from(out.events.as_slice()))?;
    Reflect::set(&obj, &"drawPaths".into(), &Float64Array::from(out.draw_paths.as_slice()))?;
    Ok(obj.into())
}

/// One independent scene, owned by the host.
#[wasm_bindgen]
#[derive(Default)]
pub struct SceneEngine {
    core: EngineCore,
}

#[wasm_bindgen]
impl SceneEngine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        #[cfg(feature = "panic-hook")]
        console_error_panic_hook::set_once();
        Self::default()
    }

    // --- Lifecycle ---

    /// Allocate pools. Returns whether the engine is ready afterwards.
    pub fn init(&mut self, capacity: u32) -> bool {
        neutral("init", self.core.init(capacity as usize).map(|()| true), false)
    }

    pub fn reset(&mut self) {
        neutral("reset", self.core.reset(), ());
    }

    #[wasm_bindgen(js_name = isReady)]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.core.is_ready()
    }

    // --- Configuration ---

    #[wasm_bindgen(js_name = setView)]
    pub fn set_view(&mut self, scale: f32) {
        neutral("setView", self.core.set_view(scale), ());
    }

    #[wasm_bindgen(js_name = setViewParams)]
    pub fn set_view_params(&mut self, scale: f32, pan_x: f32, pan_y: f32, pixel_ratio: f32) {
        neutral("setViewParams", self.core.set_view_params(scale, pan_x, pan_y, pixel_ratio), ());
    }

    #[wasm_bindgen(js_name = setConstraints)]
    pub fn set_constraints(&mut self, buf: &[f32]) {
        neutral("setConstraints", self.core.set_constraints(buf), ());
    }

    #[wasm_bindgen(js_name = setTapParams)]
    pub fn set_tap_params(&mut self, buf: &[f32]) {
        neutral("setTapParams", self.core.set_tap_params(buf), ());
    }

    #[wasm_bindgen(js_name = setParticleParams)]
    pub fn set_particle_params(&mut self, buf: &[f32]) {
        neutral("setParticleParams", self.core.set_particle_params(buf), ());
    }

    // --- Scene input ---

    /// Returns the number of node records applied.
    #[wasm_bindgen(js_name = upsertNodes)]
    pub fn upsert_nodes(&mut self, buf: &[f32]) -> u32 {
        count(neutral("upsertNodes", self.core.upsert_nodes(buf), 0))
    }

    #[wasm_bindgen(js_name = removeNodes)]
    pub fn remove_nodes(&mut self, ids: &[i32]) -> u32 {
        count(neutral("removeNodes", self.core.remove_nodes(ids), 0))
    }

    /// Stage pointers for the next frame (4- or 5-field records).
    #[wasm_bindgen(js_name = applyPointers)]
    pub fn apply_pointers(&mut self, buf: &[f32]) -> u32 {
        count(neutral("applyPointers", self.core.apply_pointers(buf), 0))
    }

    /// Returns the number of particles admitted.
    #[wasm_bindgen(js_name = spawnParticles)]
    pub fn spawn_particles(&mut self, buf: &[f32]) -> u32 {
        count(neutral("spawnParticles", self.core.spawn_particles(buf), 0))
    }

    #[wasm_bindgen(js_name = clearParticles)]
    pub fn clear_particles(&mut self) {
        neutral("clearParticles", self.core.clear_particles(), ());
    }

    #[wasm_bindgen(js_name = seedParticlesForBench)]
    pub fn seed_particles_for_bench(&mut self, n: u32) -> u32 {
        count(neutral("seedParticlesForBench", self.core.seed_particles_for_bench(n as usize), 0))
    }

    // --- Images ---

    #[wasm_bindgen(js_name = storeImage)]
    pub fn store_image(&mut self, id: i32, rgba: &[u8], width: u32, height: u32) -> bool {
        neutral("storeImage", self.core.store_image(id, rgba, width, height).map(|()| true), false)
    }

    #[wasm_bindgen(js_name = resizeImage)]
    #[must_use]
    pub fn resize_image(&self, id: i32, out_w: u32, out_h: u32) -> Vec<u8> {
        neutral("resizeImage", self.core.resize_image(id, out_w, out_h), Vec::new())
    }

    #[wasm_bindgen(js_name = resizeImageMode)]
    #[must_use]
    pub fn resize_image_mode(&self, id: i32, out_w: u32, out_h: u32, mode: u32) -> Vec<u8> {
        neutral("resizeImageMode", self.core.resize_image_mode(id, out_w, out_h, mode), Vec::new())
    }

    // --- Draw paths ---

    #[wasm_bindgen(js_name = startDrawPath)]
    pub fn start_draw_path(&mut self, id: f64, x: f32, y: f32, pressure: f32, color: u32, line_width: f32) -> bool {
        let result = path_id(id).and_then(|id| self.core.start_draw_path(id, x, y, pressure, color, line_width));
        neutral("startDrawPath", result, false)
    }

    #[wasm_bindgen(js_name = addDrawPoint)]
    pub fn add_draw_point(&mut self, id: f64, x: f32, y: f32, pressure: f32) -> bool {
        let result = path_id(id).and_then(|id| self.core.add_draw_point(id, x, y, pressure));
        neutral("addDrawPoint", result, false)
    }

    #[wasm_bindgen(js_name = finishDrawPath)]
    pub fn finish_draw_path(&mut self, id: f64, closed: bool) -> bool {
        let result = path_id(id).and_then(|id| self.core.finish_draw_path(id, closed));
        neutral("finishDrawPath", result, false)
    }

    #[wasm_bindgen(js_name = clearDrawPaths)]
    pub fn clear_draw_paths(&mut self) {
        neutral("clearDrawPaths", self.core.clear_draw_paths(), ());
    }

    // --- Frame ---

    /// Advance by `dt` seconds and return
    /// `{ transforms, particles, events, drawPaths }`.
    ///
    /// # Errors
    ///
    /// Only if the result object cannot be built; engine errors yield empty arrays.
    #[wasm_bindgen(js_name = processFrame)]
    pub fn process_frame(&mut self, dt: f32) -> Result<JsValue, JsValue> {
        let out = neutral("processFrame", self.core.process_frame(dt), FrameOutput::default());
        frame_object(&out)
    }

    // --- Queries ---

    /// Topmost node under a scene point, or 0.
    #[wasm_bindgen(js_name = hitNode)]
    #[must_use]
    pub fn hit_node(&self, x: f32, y: f32) -> i32 {
        match neutral("hitNode", self.core.hit_test(x, y), None) {
            Some(Hit::Node(id)) => id,
            _ => 0,
        }
    }

    /// Index of the topmost particle under a scene point, or -1.
    #[wasm_bindgen(js_name = hitParticle)]
    #[must_use]
    pub fn hit_particle(&self, x: f32, y: f32) -> i32 {
        match neutral("hitParticle", self.core.hit_test(x, y), None) {
            Some(Hit::Particle(i)) => i32::try_from(i).unwrap_or(-1),
            _ => -1,
        }
    }

    /// Occupancy counters as JSON, or an empty string before `init`.
    #[wasm_bindgen(js_name = statsJson)]
    #[must_use]
    pub fn stats_json(&self) -> String {
        let Some(stats) = self.core.stats() else {
            return String::new();
        };
        match serde_json::to_string(&stats) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize engine stats");
                String::new()
            }
        }
    }
}
