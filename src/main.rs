//! CLI entry point for the latency rig simulator.
//!
//! Runs the full controller loop against a software-simulated rig and
//! writes the transcript to stdout, exactly as a hardware build would write
//! it to its serial port:
//!
//! ```bash
//! latency_rig --seed 42 --latency-ms 35 --jitter-ms 10 --trials 20 > log.txt
//! ```
//!
//! The measurement core itself has no command-line surface; these flags
//! configure only the simulated device under test and the run length.

use anyhow::Result;
use clap::Parser;
use latency_rig::hardware::{SimulatedRig, SystemClock};
use latency_rig::{Controller, ControllerConfig, Pacing, Transcript};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "latency_rig")]
#[command(about = "End-to-end latency measurement loop against a simulated rig", long_about = None)]
struct Cli {
    /// Seed for trial pacing and simulated sensor noise (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Base latency of the simulated device under test, in milliseconds
    #[arg(long, default_value = "35")]
    latency_ms: u64,

    /// Uniform jitter added on top of the base latency, in milliseconds
    #[arg(long, default_value = "10")]
    jitter_ms: u64,

    /// Number of trials to run before exiting (runs forever if omitted)
    #[arg(long)]
    trials: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let pacing = match cli.seed {
        Some(seed) => Pacing::from_seed(seed),
        None => Pacing::from_entropy(),
    };
    let seed = pacing.seed();

    let rig = SimulatedRig::new(seed).with_latency(
        Duration::from_millis(cli.latency_ms),
        Duration::from_millis(cli.jitter_ms),
    );

    let stdout = io::stdout();
    let mut transcript = Transcript::new(stdout.lock());
    // Recorded up front so any run can be replayed bit-for-bit.
    transcript.comment("seed", seed)?;

    let mut controller = Controller::new(
        ControllerConfig::default(),
        rig,
        SystemClock::new(),
        pacing,
        transcript,
    )?;

    match cli.trials {
        Some(n) => controller.run_for(n)?,
        None => controller.run()?,
    }
    Ok(())
}
