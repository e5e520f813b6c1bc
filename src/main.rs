//! `scene-bench`: drive the scene engine headlessly and report frame cost.

mod bench;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::bench::BenchError;
use crate::config::BenchConfig;

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = BenchConfig::parse();
    if let Err(err) = run(&cfg) {
        tracing::error!(error = %err, "bench failed");
        std::process::exit(1);
    }
}

fn run(cfg: &BenchConfig) -> Result<(), BenchError> {
    tracing::info!(counts = ?cfg.particle_counts, frames = cfg.frames, warmup = cfg.warmup, "starting bench");
    let results = bench::run(cfg)?;
    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", bench::format_table(&results));
    }
    Ok(())
}
