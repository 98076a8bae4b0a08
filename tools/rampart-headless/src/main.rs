//! rampart-headless: run the tower-defense simulation without a renderer.
//!
//! Usage:
//!   rampart-headless --seconds 60 --seed 7
//!   rampart-headless --level level.json --tuning tuning.json --snapshot

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use rampart_core::constants::TICK_RATE;
use rampart_core::tuning::Tuning;
use rampart_level::{load_level, Level};
use rampart_sim::{SimConfig, SimulationEngine};

/// Headless RAMPART simulation runner
#[derive(Parser)]
#[command(version, about = "Runs the RAMPART simulation headless and reports what happened.")]
struct Cli {
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// RNG seed for turret layout and effects.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ticks per simulated second.
    #[arg(long, default_value_t = TICK_RATE)]
    tick_rate: u32,

    /// Level JSON file. Uses the built-in level when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// Tuning overrides JSON file.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,

    /// Leave every tile empty instead of placing turrets.
    #[arg(long)]
    no_turrets: bool,

    /// Print the final snapshot as JSON on stdout.
    #[arg(long)]
    snapshot: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let level = match &cli.level {
        Some(path) => load_level(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => Level::default_level(),
    };
    let tuning = match &cli.tuning {
        Some(path) => load_tuning(path).unwrap_or_else(|e| fail(&e)),
        None => Tuning::default(),
    };
    if cli.tick_rate == 0 {
        fail("--tick-rate must be at least 1");
    }

    let config = SimConfig {
        seed: cli.seed,
        tick_rate: cli.tick_rate,
        tuning,
        populate_turrets: !cli.no_turrets,
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config, level);

    let ticks = (cli.seconds.max(0.0) * cli.tick_rate as f64).round() as u64;
    let mut last = None;
    for _ in 0..ticks {
        last = Some(engine.tick());
    }

    let stats = engine.stats();
    log::info!(
        "ran {} ticks ({:.1}s): spawned={} destroyed={} escaped={} cannon_shots={} railgun_shots={}",
        engine.time().tick,
        engine.time().elapsed_secs,
        stats.enemies_spawned,
        stats.enemies_destroyed,
        stats.enemies_escaped,
        stats.cannon_shots,
        stats.railgun_shots
    );

    if cli.snapshot {
        let snapshot = last.unwrap_or_else(|| engine.tick());
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(&format!("failed to encode snapshot: {e}")),
        }
    }
}

fn load_tuning(path: &Path) -> Result<Tuning, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read tuning file {}: {e}", path.display()))?;
    Tuning::from_json(&json).map_err(|e| e.to_string())
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}
