#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Grid Defense scenario without rendering.

mod config;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::SimulationConfig, simulation::Simulation};

#[derive(Parser, Debug)]
#[command(name = "grid-defense")]
#[command(about = "Runs a headless Grid Defense scenario and prints a summary")]
struct Args {
    /// Scenario file in TOML format; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 1200)]
    frames: u64,

    /// Simulated duration of each frame in milliseconds
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,

    /// Overrides the spawning and combat seeds
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Grid Defense command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("unable to start scenario {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    info!(
        columns = config.board.columns,
        rows = config.board.rows,
        layout_edits = config.layout.len(),
        frames = args.frames,
        frame_ms = args.frame_ms,
        "starting simulation"
    );

    let mut simulation = Simulation::new(&config);
    let dt = Duration::from_millis(args.frame_ms);
    for _ in 0..args.frames {
        simulation.step(dt);
    }

    let stats = simulation.stats();
    info!(
        spawned = stats.spawned,
        killed = stats.killed,
        escaped = stats.escaped,
        alive = simulation.enemies_alive(),
        "simulation finished"
    );
    println!("{stats}");
    println!("enemies alive:    {}", simulation.enemies_alive());
    Ok(())
}
