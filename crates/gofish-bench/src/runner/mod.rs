mod rotations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gofish_core::game::state::{GameConfig, GameState, PlayerSetup};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{PlayerKind, ResolvedOutputs, SimulationConfig};

use rotations::OrderRotations;

/// Primary entry point for orchestrating batch simulations.
#[derive(Debug)]
pub struct SimulationRunner {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
    rotations: OrderRotations,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rotations: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
}

impl SimulationRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let player_count = config.players.len();
        if player_count < 2 {
            return Err(RunnerError::PlayerCount {
                found: player_count,
            });
        }

        if config.sim.rotations > player_count {
            return Err(RunnerError::RotationLimit {
                requested: config.sim.rotations,
                max: player_count,
            });
        }

        let rotations = OrderRotations::new(player_count, config.sim.rotations);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            rotations,
        })
    }

    /// Execute the simulation, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let orders = self.rotations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.sim.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for game_index in 0..self.config.sim.games {
            let base_seed = rng.next_u64();

            for (rotation_index, order) in orders.iter().enumerate() {
                let outcome = self.play_game(game_index, rotation_index, base_seed, order)?;
                analytics.record_game(game_index, rotation_index, &outcome)?;
                rows_written += write_game_rows(
                    &mut writer,
                    &self.config,
                    game_index,
                    rotation_index,
                    base_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        let telemetry_path = if self.logging_enabled {
            let telemetry_dir = self
                .outputs
                .summary_md
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Some(telemetry_dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            games_played: self.config.sim.games,
            rotations: orders.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            telemetry_path,
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        rotation_index: usize,
        base_seed: u64,
        order: &[usize],
    ) -> Result<GameOutcome, RunnerError> {
        let mut roster = Vec::with_capacity(order.len());
        let mut kinds = Vec::with_capacity(order.len());
        for &player_index in order {
            let player =
                self.config
                    .players
                    .get(player_index)
                    .ok_or(RunnerError::InvalidRotation {
                        rotation: rotation_index,
                        player_index,
                    })?;
            roster.push(PlayerSetup::new(
                player.name.clone(),
                player.kind.strategy().build(),
            ));
            kinds.push(player.kind);
        }

        let game_config = GameConfig::new(roster)
            .with_initial_cards(self.config.rules.initial_cards)
            .with_refill(self.config.rules.refill)
            .with_seed(base_seed);
        let mut game = GameState::new(game_config)
            .map_err(|err| RunnerError::game(format!("game construction failed: {err}")))?;
        let summary = game
            .play_to_completion()
            .map_err(|err| RunnerError::game(format!("turn execution failed: {err}")))?;

        let shared = summary.winners.len() > 1;
        let seating: Vec<SeatSnapshot> = summary
            .standings
            .iter()
            .map(|standing| SeatSnapshot {
                seat: standing.seat.to_string(),
                player: standing.name.clone(),
            })
            .collect();

        let mut results = Vec::with_capacity(summary.standings.len());
        for (standing, kind) in summary.standings.iter().zip(kinds) {
            let win = summary.winners.contains(&standing.seat);
            results.push(PlayerResult {
                player: standing.name.clone(),
                kind,
                seat: standing.seat.to_string(),
                books: standing.books,
                win,
                shared_win: win && shared,
            });
        }

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            let winners = results
                .iter()
                .filter(|result| result.win)
                .map(|result| result.player.as_str())
                .collect::<Vec<_>>()
                .join(",");
            event!(
                target: "gofish_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                rotation_index = rotation_index as u32,
                seed = base_seed,
                turns = summary.turns,
                winners = %winners
            );
        }

        Ok(GameOutcome {
            seating,
            results,
            turns: summary.turns,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &SimulationConfig,
    game_index: usize,
    rotation_index: usize,
    base_seed: u64,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{game_index:05}_R{rotation_index:02}");
    let seating = outcome.seating.clone();

    let mut rows_written = 0usize;
    for result in &outcome.results {
        let row = GameLogRow {
            run_id: config.run_id.clone(),
            game_id: game_id.clone(),
            game_index,
            rotation_index,
            game_seed: base_seed,
            seat: result.seat.clone(),
            player: result.player.clone(),
            kind: result.kind,
            seating: seating.clone(),
            books: result.books,
            win: result.win,
            shared_win: result.shared_win,
            turns: outcome.turns,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

/// Result of one simulated game under one turn order.
pub struct GameOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub results: Vec<PlayerResult>,
    pub turns: u32,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub player: String,
}

pub struct PlayerResult {
    pub player: String,
    pub kind: PlayerKind,
    pub seat: String,
    pub books: usize,
    pub win: bool,
    pub shared_win: bool,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    rotation_index: usize,
    game_seed: u64,
    seat: String,
    player: String,
    kind: PlayerKind,
    seating: Vec<SeatSnapshot>,
    books: usize,
    win: bool,
    shared_win: bool,
    turns: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires at least two players but found {found}")]
    PlayerCount { found: usize },
    #[error("requested {requested} turn-order rotations exceeds the player count of {max}")]
    RotationLimit { requested: usize, max: usize },
    #[error("rotation {rotation} references invalid player index {player_index}")]
    InvalidRotation { rotation: usize, player_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        LoggingConfig, MetricsConfig, OutputsConfig, PlayerConfig, RulesConfig, SimConfig,
    };

    fn test_config() -> SimulationConfig {
        SimulationConfig {
            run_id: "unit".to_string(),
            sim: SimConfig {
                seed: Some(7),
                games: 1,
                rotations: 2,
            },
            rules: RulesConfig::default(),
            players: vec![
                PlayerConfig {
                    name: "baseline".to_string(),
                    kind: PlayerKind::Random,
                },
                PlayerConfig {
                    name: "sharp".to_string(),
                    kind: PlayerKind::Smart,
                },
            ],
            outputs: OutputsConfig {
                jsonl: "out/games.jsonl".to_string(),
                summary_md: "out/summary.md".to_string(),
                plots_dir: "out/plots".to_string(),
            },
            metrics: MetricsConfig {
                baseline: Some("baseline".to_string()),
            },
            logging: LoggingConfig::default(),
        }
    }

    fn test_runner() -> SimulationRunner {
        let config = test_config();
        let outputs = config.resolved_outputs();
        SimulationRunner::new(config, outputs).expect("runner created")
    }

    #[test]
    fn a_played_game_accounts_for_all_thirteen_books() {
        let outcome = test_runner()
            .play_game(0, 0, 42, &[0, 1])
            .expect("game completes");

        assert_eq!(outcome.results.len(), 2);
        let books: usize = outcome.results.iter().map(|result| result.books).sum();
        assert_eq!(books, 13);
        assert!(outcome.results.iter().any(|result| result.win));
        assert!(outcome.turns > 0);
    }

    #[test]
    fn rotated_orders_move_the_opening_player() {
        let outcome = test_runner()
            .play_game(0, 1, 42, &[1, 0])
            .expect("game completes");

        assert_eq!(outcome.seating[0].player, "sharp");
        assert_eq!(outcome.results[0].kind, PlayerKind::Smart);
        assert_eq!(outcome.results[1].player, "baseline");
    }

    #[test]
    fn shared_wins_are_flagged_on_every_tied_leader() {
        let outcome = test_runner()
            .play_game(0, 0, 42, &[0, 1])
            .expect("game completes");

        let winners = outcome.results.iter().filter(|result| result.win).count();
        for result in &outcome.results {
            assert_eq!(result.shared_win, result.win && winners > 1);
        }
    }

    #[test]
    fn rejects_more_rotations_than_players() {
        let mut config = test_config();
        config.sim.rotations = 3;
        let outputs = config.resolved_outputs();
        let err = SimulationRunner::new(config, outputs).expect_err("should fail");
        assert!(matches!(
            err,
            RunnerError::RotationLimit {
                requested: 3,
                max: 2
            }
        ));
    }
}
