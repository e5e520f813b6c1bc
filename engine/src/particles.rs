//! Capacity-bounded particle pool with gravity, damping, and bounded bounces.
//!
//! Spawning past capacity rejects the excess and reports how many were
//! admitted. Expiry is tracked as an absolute `f64` deadline on the pool's
//! own clock, so a particle is dropped on the first step where elapsed time
//! reaches its life no matter how `dt` rounds.

#[cfg(test)]
#[path = "particles_test.rs"]
mod particles_test;

use std::f32::consts::TAU;

use scene_buffers::{ParticleParamsRecord, ParticleRecord, Record};

use crate::consts::{SEED_LIFE_S, SEED_PARTICLE_RADIUS, SEED_RING_RADIUS, SEED_SPEED};
use crate::error::EngineError;
use crate::geom::Point;
use crate::physics::Constraints;

/// One live particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    /// Remaining lifetime in seconds.
    pub life: f32,
}

impl Particle {
    /// Validate a spawn record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for non-finite motion fields,
    /// a negative radius, or a NaN life.
    pub fn from_record(rec: &ParticleRecord) -> Result<Self, EngineError> {
        if [rec.x, rec.y, rec.vx, rec.vy, rec.radius].iter().any(|v| !v.is_finite()) || rec.life.is_nan() {
            return Err(EngineError::invalid("particle record has a non-finite field"));
        }
        if rec.radius < 0.0 {
            return Err(EngineError::invalid(format!("particle radius must be >= 0, got {}", rec.radius)));
        }
        Ok(Self { x: rec.x, y: rec.y, vx: rec.vx, vy: rec.vy, radius: rec.radius, life: rec.life })
    }

    #[must_use]
    pub fn to_record(&self) -> ParticleRecord {
        ParticleRecord { x: self.x, y: self.y, vx: self.vx, vy: self.vy, radius: self.radius, life: self.life }
    }
}

/// Process-wide particle forces.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ParticleParams {
    pub gravity_x: f32,
    pub gravity_y: f32,
    /// Per-second velocity retention in `[0, 1]`.
    pub damping: f32,
    /// Fraction of normal velocity kept after a bounce, in `[0, 1]`.
    pub restitution: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self { gravity_x: 0.0, gravity_y: 0.0, damping: 1.0, restitution: 1.0 }
    }
}

impl ParticleParams {
    /// Validate a decoded params record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for non-finite gravity or a
    /// damping or restitution outside `[0, 1]`.
    pub fn from_record(rec: &ParticleParamsRecord) -> Result<Self, EngineError> {
        if !rec.gravity_x.is_finite() || !rec.gravity_y.is_finite() {
            return Err(EngineError::invalid("particle gravity must be finite"));
        }
        if !(0.0..=1.0).contains(&rec.damping) {
            return Err(EngineError::invalid(format!("particle damping must be in [0, 1], got {}", rec.damping)));
        }
        if !(0.0..=1.0).contains(&rec.restitution) {
            return Err(EngineError::invalid(format!(
                "particle restitution must be in [0, 1], got {}",
                rec.restitution
            )));
        }
        Ok(Self {
            gravity_x: rec.gravity_x,
            gravity_y: rec.gravity_y,
            damping: rec.damping,
            restitution: rec.restitution,
        })
    }
}

/// Live particles in spawn order.
#[derive(Debug, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Deadline per particle, index-aligned with `particles`.
    expires_at: Vec<f64>,
    /// Seconds stepped since the pool was created or last cleared.
    clock: f64,
    capacity: usize,
}

impl ParticlePool {
    /// Create an empty pool holding at most `capacity` particles.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Initialization`] if storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, EngineError> {
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(capacity)
            .map_err(|e| EngineError::Initialization(format!("particle pool: {e}")))?;
        let mut expires_at = Vec::new();
        expires_at
            .try_reserve_exact(capacity)
            .map_err(|e| EngineError::Initialization(format!("particle deadlines: {e}")))?;
        Ok(Self { particles, expires_at, clock: 0.0, capacity })
    }

    /// Append particles up to the remaining capacity. Returns the admitted count.
    pub fn spawn(&mut self, batch: &[Particle]) -> usize {
        let room = self.capacity.saturating_sub(self.particles.len());
        let admitted = batch.len().min(room);
        for p in &batch[..admitted] {
            self.push(*p);
        }
        admitted
    }

    fn push(&mut self, p: Particle) {
        self.expires_at.push(self.clock + f64::from(p.life));
        self.particles.push(p);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.expires_at.clear();
        self.clock = 0.0;
    }

    /// Replace the pool with up to `n` particles on a ring around `center`,
    /// each moving outward. Returns the admitted count.
    pub fn seed_ring(&mut self, n: usize, center: Point) -> usize {
        self.clear();
        let n = n.min(self.capacity);
        for i in 0..n {
            let theta = TAU * i as f32 / n as f32;
            let (sin, cos) = theta.sin_cos();
            self.push(Particle {
                x: center.x + cos * SEED_RING_RADIUS,
                y: center.y + sin * SEED_RING_RADIUS,
                vx: cos * SEED_SPEED,
                vy: sin * SEED_SPEED,
                radius: SEED_PARTICLE_RADIUS,
                life: SEED_LIFE_S,
            });
        }
        n
    }

    /// Advance every particle by `dt` and drop the expired ones.
    pub fn step(&mut self, params: &ParticleParams, bounds: &Constraints, dt: f32) {
        self.clock += f64::from(dt);
        let now = self.clock;
        let decay = if params.damping < 1.0 { params.damping.powf(dt) } else { 1.0 };
        let r = params.restitution;
        let mut deadlines = self.expires_at.iter();
        self.particles.retain_mut(|p| {
            let Some(&expires_at) = deadlines.next() else {
                return false;
            };
            if now >= expires_at {
                return false;
            }
            p.vx += params.gravity_x * dt;
            p.vy += params.gravity_y * dt;
            p.vx *= decay;
            p.vy *= decay;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            reflect(&mut p.x, &mut p.vx, bounds.left, bounds.right, r);
            reflect(&mut p.y, &mut p.vy, bounds.top, bounds.bottom, r);
            p.life = (expires_at - now) as f32;
            true
        });
        self.expires_at.retain(|&t| now < t);
    }

    /// Append every live particle in the spawn layout.
    pub fn write(&self, out: &mut Vec<f32>) {
        out.reserve(self.particles.len() * ParticleRecord::STRIDE);
        for p in &self.particles {
            p.to_record().write(out);
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Bounce one axis off `[lo, hi]`. Infinite sides never trigger.
fn reflect(pos: &mut f32, vel: &mut f32, lo: f32, hi: f32, restitution: f32) {
    if *pos < lo {
        *pos = lo;
        *vel = -*vel * restitution;
    } else if *pos > hi {
        *pos = hi;
        *vel = -*vel * restitution;
    }
}
