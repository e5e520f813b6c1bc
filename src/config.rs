//! Bench configuration: command-line flags with `SCENE_BENCH_*` fallbacks.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use clap::Parser;

use crate::bench::BenchError;

const DEFAULT_DT: f32 = 1.0 / 60.0;

#[derive(Parser, Debug, Clone)]
#[command(name = "scene-bench", about = "Headless frame-cost benchmark for the scene engine")]
pub struct BenchConfig {
    /// Particle counts to measure, one run each.
    #[arg(
        long,
        env = "SCENE_BENCH_PARTICLE_COUNTS",
        value_delimiter = ',',
        default_values_t = [100, 1000, 5000, 10_000]
    )]
    pub particle_counts: Vec<usize>,

    /// Untimed frames before measuring.
    #[arg(long, env = "SCENE_BENCH_WARMUP", default_value_t = 120)]
    pub warmup: u32,

    /// Timed frames per run.
    #[arg(long, env = "SCENE_BENCH_FRAMES", default_value_t = 600)]
    pub frames: u32,

    /// Nodes in the synthetic scene that the pointer drags around.
    #[arg(long, env = "SCENE_BENCH_NODES", default_value_t = 64)]
    pub nodes: usize,

    /// Frame step in seconds.
    #[arg(long, env = "SCENE_BENCH_DT", default_value_t = DEFAULT_DT)]
    pub dt: f32,

    /// RNG seed for the drag path.
    #[arg(long, env = "SCENE_BENCH_SEED", default_value_t = 7)]
    pub seed: u64,

    /// Print results as JSON instead of CSV lines.
    #[arg(long, env = "SCENE_BENCH_JSON")]
    pub json: bool,
}

impl BenchConfig {
    /// Reject settings that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Config`] describing the first bad setting.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.particle_counts.is_empty() {
            return Err(BenchError::Config("at least one particle count is required".into()));
        }
        if self.frames == 0 {
            return Err(BenchError::Config("frames must be positive".into()));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(BenchError::Config(format!("dt must be positive and finite, got {}", self.dt)));
        }
        Ok(())
    }
}
