#![allow(clippy::float_cmp)]

use super::*;

fn particle(x: f32, y: f32, vx: f32, vy: f32, life: f32) -> Particle {
    Particle { x, y, vx, vy, radius: 1.0, life }
}

fn pool(capacity: usize) -> ParticlePool {
    ParticlePool::with_capacity(capacity).expect("pool")
}

fn open() -> Constraints {
    Constraints::default()
}

fn boxed(right: f32, bottom: f32) -> Constraints {
    Constraints { right, bottom, ..Constraints::default() }
}

// =============================================================
// Records and params
// =============================================================

#[test]
fn spawn_record_validation() {
    let rec = ParticleRecord { x: 0.0, y: 0.0, vx: 1.0, vy: 1.0, radius: 2.0, life: 1.0 };
    assert_eq!(Particle::from_record(&rec).expect("valid").to_record(), rec);
    assert!(Particle::from_record(&ParticleRecord { radius: -1.0, ..rec }).is_err());
    assert!(Particle::from_record(&ParticleRecord { vx: f32::NAN, ..rec }).is_err());
    assert!(Particle::from_record(&ParticleRecord { life: f32::INFINITY, ..rec }).is_ok());
}

#[test]
fn params_reject_out_of_range() {
    let ok = ParticleParamsRecord { gravity_x: 0.0, gravity_y: 900.0, damping: 0.995, restitution: 0.6 };
    assert!(ParticleParams::from_record(&ok).is_ok());
    assert!(ParticleParams::from_record(&ParticleParamsRecord { restitution: 1.2, ..ok }).is_err());
    assert!(ParticleParams::from_record(&ParticleParamsRecord { damping: -0.1, ..ok }).is_err());
    assert!(ParticleParams::from_record(&ParticleParamsRecord { gravity_y: f32::INFINITY, ..ok }).is_err());
}

// =============================================================
// Capacity
// =============================================================

#[test]
fn spawn_beyond_capacity_rejects_excess() {
    let mut p = pool(3);
    let batch = vec![particle(0.0, 0.0, 0.0, 0.0, 1.0); 2];
    assert_eq!(p.spawn(&batch), 2);
    assert_eq!(p.spawn(&batch), 1);
    assert_eq!(p.spawn(&batch), 0);
    assert_eq!(p.len(), 3);
}

#[test]
fn clear_empties_pool() {
    let mut p = pool(3);
    p.spawn(&[particle(0.0, 0.0, 0.0, 0.0, 1.0)]);
    p.clear();
    assert!(p.is_empty());
}

// =============================================================
// Step
// =============================================================

#[test]
fn gravity_applies_before_motion() {
    let mut p = pool(1);
    p.spawn(&[particle(0.0, 0.0, 0.0, 0.0, 10.0)]);
    let params = ParticleParams { gravity_y: 10.0, ..ParticleParams::default() };
    p.step(&params, &open(), 0.5);
    let q = p.as_slice()[0];
    assert_eq!(q.vy, 5.0);
    assert_eq!(q.y, 2.5);
}

#[test]
fn life_expires_on_the_frame_elapsed_reaches_life() {
    let mut p = pool(1);
    p.spawn(&[particle(10.0, 10.0, 0.0, 0.0, 1.0)]);
    for frame in 1..=3 {
        p.step(&ParticleParams::default(), &open(), 0.25);
        assert_eq!(p.len(), 1, "present after frame {frame}");
    }
    p.step(&ParticleParams::default(), &open(), 0.25);
    assert!(p.is_empty());
}

#[test]
fn life_expiry_does_not_drift_with_fractional_dt() {
    let mut p = pool(1);
    p.spawn(&[particle(10.0, 10.0, 0.0, 0.0, 0.1)]);
    let dt = 1.0_f32 / 60.0;
    for frame in 1..=5 {
        p.step(&ParticleParams::default(), &open(), dt);
        assert_eq!(p.len(), 1, "present after frame {frame}");
    }
    p.step(&ParticleParams::default(), &open(), dt);
    assert!(p.is_empty());
}

#[test]
fn remaining_life_counts_down_from_deadline() {
    let mut p = pool(1);
    p.spawn(&[particle(0.0, 0.0, 0.0, 0.0, 2.0)]);
    p.step(&ParticleParams::default(), &open(), 0.5);
    assert_eq!(p.as_slice()[0].life, 1.5);
}

#[test]
fn late_spawn_expires_relative_to_its_own_spawn() {
    let mut p = pool(2);
    p.step(&ParticleParams::default(), &open(), 0.75);
    p.spawn(&[particle(0.0, 0.0, 0.0, 0.0, 0.5)]);
    p.step(&ParticleParams::default(), &open(), 0.25);
    assert_eq!(p.len(), 1);
    p.step(&ParticleParams::default(), &open(), 0.25);
    assert!(p.is_empty());
}

#[test]
fn restitution_flips_normal_component_only() {
    let mut p = pool(1);
    p.spawn(&[particle(95.0, 50.0, 100.0, 7.0, 10.0)]);
    let params = ParticleParams { restitution: 0.6, ..ParticleParams::default() };
    p.step(&params, &boxed(100.0, 100.0), 0.1);
    let q = p.as_slice()[0];
    assert_eq!(q.x, 100.0);
    assert_eq!(q.vx, -100.0_f32 * 0.6);
    assert_eq!(q.vy, 7.0);
}

#[test]
fn zero_restitution_stops_dead_at_floor() {
    let mut p = pool(1);
    p.spawn(&[particle(10.0, 99.0, 0.0, 50.0, 10.0)]);
    let params = ParticleParams { restitution: 0.0, ..ParticleParams::default() };
    p.step(&params, &boxed(100.0, 100.0), 0.1);
    let q = p.as_slice()[0];
    assert_eq!(q.y, 100.0);
    assert_eq!(q.vy, 0.0);
}

#[test]
fn open_sides_never_collide() {
    let mut p = pool(1);
    p.spawn(&[particle(10.0, 10.0, 1000.0, 1000.0, 10.0)]);
    p.step(&ParticleParams::default(), &open(), 0.1);
    let q = p.as_slice()[0];
    assert_eq!((q.x, q.y, q.vx), (110.0, 110.0, 1000.0));
}

#[test]
fn damping_scales_velocity_per_second() {
    let mut p = pool(1);
    p.spawn(&[particle(0.0, 0.0, 100.0, 0.0, 10.0)]);
    let params = ParticleParams { damping: 0.25, ..ParticleParams::default() };
    p.step(&params, &open(), 0.5);
    assert!((p.as_slice()[0].vx - 50.0).abs() < 1e-3);
}

// =============================================================
// Output and seeding
// =============================================================

#[test]
fn write_uses_spawn_layout() {
    let mut p = pool(2);
    p.spawn(&[particle(1.0, 2.0, 3.0, 4.0, 5.0)]);
    let mut out = Vec::new();
    p.write(&mut out);
    assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 1.0, 5.0]);
}

#[test]
fn seed_ring_replaces_pool_up_to_capacity() {
    let mut p = pool(8);
    p.spawn(&[particle(0.0, 0.0, 0.0, 0.0, 1.0)]);
    assert_eq!(p.seed_ring(20, Point::new(400.0, 300.0)), 8);
    assert_eq!(p.len(), 8);
    let first = p.as_slice()[0];
    assert!((first.x - (400.0 + SEED_RING_RADIUS)).abs() < 1e-3);
    assert!((first.y - 300.0).abs() < 1e-3);
    assert!(first.vx > 0.0);
}
