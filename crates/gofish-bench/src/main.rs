use std::path::PathBuf;

use clap::Parser;

use gofish_bench::config::{ResolvedOutputs, SimulationConfig};
use gofish_bench::logging::init_logging;
use gofish_bench::runner::SimulationRunner;

/// Batch simulation harness for Go Fish strategies.
#[derive(Debug, Parser)]
#[command(
    name = "gofish-bench",
    author,
    version,
    about = "Deterministic Go Fish simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of turn-order rotations per game.
    #[arg(long, value_name = "COUNT")]
    rotations: Option<usize>,

    /// Exit after validating the configuration (no games are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimulationConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.sim.games = games;
    }

    if let Some(seed) = cli.seed {
        config.sim.seed = Some(seed);
    }

    if let Some(rotations) = cli.rotations {
        config.sim.rotations = rotations;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let player_count = config.players.len();
    let run_id = config.run_id.clone();
    let games = config.sim.games;
    let rotations = config.sim.rotations;

    println!(
        "Loaded configuration '{run_id}' with {player_count} player{} ({games} games, {rotations} rotations)",
        if player_count == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = SimulationRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: simulation execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Simulation complete for '{run_id}': {} games × {} rotations → {} rows at {}",
        summary.games_played,
        summary.rotations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Win rate plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
