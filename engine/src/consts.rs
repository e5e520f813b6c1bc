//! Shared numeric constants for the engine crate.

// ── Capacity ────────────────────────────────────────────────────

/// Largest node/particle pool accepted by `init`.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Points kept per draw path; later appends are dropped.
pub const MAX_POINTS_PER_PATH: usize = 65_536;

/// Largest draw path id the `f64` output stream carries exactly (2^53 - 1).
pub const MAX_PATH_ID: u64 = (1 << 53) - 1;

// ── Frame stepping ──────────────────────────────────────────────

/// Largest step a single frame integrates, in seconds. Longer gaps (a
/// backgrounded tab) are clamped to this.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Node velocity components below this magnitude are zeroed while damping.
pub const VELOCITY_EPSILON: f32 = 1e-3;

/// Weight of the newest sample in the pointer velocity moving average.
pub const RELEASE_VELOCITY_SMOOTHING: f32 = 0.5;

// ── Pinch ───────────────────────────────────────────────────────

/// Smallest node scale a pinch can produce.
pub const MIN_PINCH_SCALE: f32 = 0.05;

/// Floor for the inter-pointer distance, so coincident touches never divide by zero.
pub const MIN_PINCH_DISTANCE: f32 = 1.0;

// ── Tap defaults ────────────────────────────────────────────────

/// Longest press, in seconds, that still counts as a tap.
pub const DEFAULT_TAP_MAX_S: f32 = 0.25;

/// Movement, in scene pixels, beyond which a press becomes a drag.
pub const DEFAULT_MOVE_THRESHOLD_PX: f32 = 6.0;

/// Window, in seconds, in which a second tap on the same target is a double tap.
pub const DEFAULT_DOUBLE_TAP_WINDOW_S: f32 = 0.30;

/// How long, in seconds, a single tap is held back waiting for a double tap.
pub const DEFAULT_SINGLE_TAP_DELAY_S: f32 = 0.0;

// ── Bench seeding ───────────────────────────────────────────────

/// Distance from the bounds centre at which seeded particles start.
pub const SEED_RING_RADIUS: f32 = 100.0;

/// Outward speed of seeded particles in scene units per second.
pub const SEED_SPEED: f32 = 200.0;

pub const SEED_PARTICLE_RADIUS: f32 = 2.0;

/// Seeded particles outlive any realistic benchmark run.
pub const SEED_LIFE_S: f32 = 3600.0;

/// Centre used for seeding when the bounds are open on an axis.
pub const SEED_FALLBACK_EXTENT: f32 = 800.0;
