use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{PlayerKind, SimulationConfig};
use crate::runner::GameOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline player '{0}' not present in simulation results")]
    MissingBaseline(String),
    #[error("player '{0}' present in results but missing from configuration")]
    UnknownPlayer(String),
    #[error("baseline '{0}' missing from game {1}")]
    MissingBaselineGame(String, String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub struct AnalyticsCollector {
    baseline: String,
    players: HashMap<String, PlayerAccumulator>,
    comparisons: HashMap<String, ComparisonAccumulator>,
    player_order: Vec<String>,
    total_turns: u64,
    games_recorded: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &SimulationConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut players = HashMap::new();
        let mut order = Vec::new();
        for player in &config.players {
            players.insert(
                player.name.clone(),
                PlayerAccumulator::new(player.name.clone(), player.kind),
            );
            order.push(player.name.clone());
        }

        Ok(Self {
            baseline,
            players,
            comparisons: HashMap::new(),
            player_order: order,
            total_turns: 0,
            games_recorded: 0,
        })
    }

    pub fn record_game(
        &mut self,
        game_index: usize,
        rotation_index: usize,
        outcome: &GameOutcome,
    ) -> Result<(), AnalyticsError> {
        let game_id = format!("G{game_index:05}_R{rotation_index:02}");

        let baseline_books = outcome
            .results
            .iter()
            .find(|result| result.player == self.baseline)
            .map(|result| result.books as f64)
            .ok_or_else(|| {
                AnalyticsError::MissingBaselineGame(self.baseline.clone(), game_id.clone())
            })?;

        for result in &outcome.results {
            let acc = self
                .players
                .get_mut(&result.player)
                .ok_or_else(|| AnalyticsError::UnknownPlayer(result.player.clone()))?;

            acc.record_game(result.books as f64, result.win, result.shared_win);
        }

        for result in &outcome.results {
            if result.player == self.baseline {
                continue;
            }
            let diff = result.books as f64 - baseline_books;
            self.comparisons
                .entry(result.player.clone())
                .or_insert_with(ComparisonAccumulator::new)
                .record(diff);
        }

        self.total_turns += u64::from(outcome.turns);
        self.games_recorded += 1;

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.player_order {
            if let Some(acc) = self.players.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut comparisons = Vec::new();
        for report in &reports {
            if report.name == self.baseline {
                comparisons.push(ComparisonReport {
                    player: report.name.clone(),
                    p_value: 1.0,
                    sample_size: report.games,
                });
                continue;
            }
            if let Some(comp) = self.comparisons.remove(&report.name) {
                let (p_value, sample_size) = comp.signed_rank_p_value();
                comparisons.push(ComparisonReport {
                    player: report.name.clone(),
                    p_value,
                    sample_size,
                });
            } else {
                comparisons.push(ComparisonReport {
                    player: report.name.clone(),
                    p_value: 1.0,
                    sample_size: 0,
                });
            }
        }

        let avg_turns = if self.games_recorded == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games_recorded as f64
        };

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            players: reports,
            comparisons,
            avg_turns,
        }
        .enrich())
    }
}

struct PlayerAccumulator {
    name: String,
    kind: PlayerKind,
    total_books: f64,
    games: u32,
    wins: u32,
    shared_wins: u32,
    per_game_books: Vec<f64>,
}

impl PlayerAccumulator {
    fn new(name: String, kind: PlayerKind) -> Self {
        Self {
            name,
            kind,
            total_books: 0.0,
            games: 0,
            wins: 0,
            shared_wins: 0,
            per_game_books: Vec::new(),
        }
    }

    fn record_game(&mut self, books: f64, is_winner: bool, is_shared: bool) {
        self.total_books += books;
        self.games += 1;
        self.per_game_books.push(books);
        if is_winner {
            self.wins += 1;
        }
        if is_shared {
            self.shared_wins += 1;
        }
    }

    fn into_report(self) -> PlayerReport {
        let avg_books = if self.games == 0 {
            0.0
        } else {
            self.total_books / f64::from(self.games)
        };

        let (ci_low, ci_high) = confidence_interval(&self.per_game_books);

        PlayerReport {
            name: self.name,
            kind: self.kind,
            games: self.games as usize,
            avg_books,
            ci95: (ci_low, ci_high),
            wins: self.wins as usize,
            shared_wins: self.shared_wins as usize,
            delta_vs_baseline: 0.0, // Filled later once the baseline average is known
        }
    }
}

#[derive(Clone)]
struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn new() -> Self {
        Self { diffs: Vec::new() }
    }

    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    /// Two-sided Wilcoxon signed-rank test (normal approximation) over the
    /// per-game book differences against the baseline.
    fn signed_rank_p_value(self) -> (f64, usize) {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return (1.0, 0);
        }

        let mut signed: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        signed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        // Rank handling with ties
        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < signed.len() {
            let mut j = i;
            while j + 1 < signed.len() && (signed[j + 1].0 - signed[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            for k in i..=j {
                ranks.push((rank, signed[k].1));
            }
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();

        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        // Variance with tie correction
        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return (1.0, n);
        }

        let z = ((w - mean_w).abs() - 0.5) / variance_w.sqrt();
        let normal = Normal::new(0.0, 1.0).unwrap();
        let p = 2.0 * (1.0 - normal.cdf(z));
        (p.clamp(0.0, 1.0), n)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub players: Vec<PlayerReport>,
    pub comparisons: Vec<ComparisonReport>,
    pub avg_turns: f64,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avg = self
            .players
            .iter()
            .find(|player| player.name == self.baseline)
            .map(|player| player.avg_books)
            .unwrap_or(0.0);

        for player in &mut self.players {
            player.delta_vs_baseline = player.avg_books - baseline_avg;
        }

        self
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Simulation Summary\n\n");
        rows.push_str(&format!(
            "Average game length: {:.1} turns\n\n",
            self.avg_turns
        ));
        rows.push_str(
            "| Player | Kind | Games | Wins | Win % | Avg books | Δ vs baseline | 95% CI | p-value |\n",
        );
        rows.push_str(
            "|--------|------|-------|------|-------|-----------|----------------|--------|---------|\n",
        );

        for player in &self.players {
            let comparison = self
                .comparisons
                .iter()
                .find(|c| c.player == player.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {wins} ({shared} shared) | {win:.1}% | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {pval:.3} |\n",
                name = player.name,
                kind = player.kind,
                games = player.games,
                wins = player.wins,
                shared = player.shared_wins,
                win = player.win_rate() * 100.0,
                avg = player.avg_books,
                delta = player.delta_vs_baseline,
                ci_low = player.ci95.0,
                ci_high = player.ci95.1,
                pval = comparison,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("win_rate.png");
        let baseline = self.baseline.clone();
        let players_snapshot = self.players.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut players = players_snapshot;
            players.sort_by(|a, b| a.win_rate().partial_cmp(&b.win_rate()).unwrap());

            let baseline_rate = players
                .iter()
                .find(|player| player.name == baseline)
                .map(PlayerReport::win_rate)
                .unwrap_or(0.0);

            let y_max = players
                .iter()
                .map(PlayerReport::win_rate)
                .fold(0.0f64, |acc, v| acc.max(v));
            let margin = (y_max * 0.1).max(0.05);

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Win rate by player (shared wins included)", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..players.len(), 0.0..(y_max + margin))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Win rate")
                .x_desc("Player")
                .x_label_formatter(&|idx| {
                    players
                        .get(*idx)
                        .map(|player| player.name.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(players.iter().enumerate().map(|(idx, player)| {
                    let color = if player.name == baseline {
                        &BLUE
                    } else if player.win_rate() >= baseline_rate {
                        &GREEN
                    } else {
                        &RED
                    };
                    Rectangle::new([(idx, 0.0), (idx + 1, player.win_rate())], color.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub name: String,
    pub kind: PlayerKind,
    pub games: usize,
    pub avg_books: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
    pub shared_wins: usize,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
}

impl PlayerReport {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub player: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_interval_is_symmetric_around_the_mean() {
        let (low, high) = confidence_interval(&[2.0, 4.0, 6.0]);
        assert!(low < 4.0 && 4.0 < high);
        assert!(((low + high) / 2.0 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_interval_degenerates_for_tiny_samples() {
        assert_eq!(confidence_interval(&[]), (0.0, 0.0));
        assert_eq!(confidence_interval(&[3.0]), (3.0, 3.0));
    }

    #[test]
    fn signed_rank_test_is_inconclusive_for_a_single_game() {
        let mut comp = ComparisonAccumulator::new();
        comp.record(2.0);
        let (p, n) = comp.signed_rank_p_value();
        assert_eq!(n, 1);
        assert!((p - 1.0).abs() < 1e-9);
    }

    #[test]
    fn signed_rank_test_flags_a_uniform_gap() {
        let mut comp = ComparisonAccumulator::new();
        for _ in 0..30 {
            comp.record(1.0);
        }
        let (p, n) = comp.signed_rank_p_value();
        assert_eq!(n, 30);
        assert!(p < 0.01, "a thirty-game sweep should be significant, got {p}");
    }

    #[test]
    fn enrich_fills_deltas_relative_to_the_baseline() {
        let report = |name: &str, avg: f64| PlayerReport {
            name: name.to_string(),
            kind: PlayerKind::Random,
            games: 10,
            avg_books: avg,
            ci95: (avg, avg),
            wins: 5,
            shared_wins: 0,
            delta_vs_baseline: 0.0,
        };

        let summary = AnalyticsSummary {
            baseline: "baseline".to_string(),
            players: vec![report("baseline", 4.0), report("sharp", 6.0)],
            comparisons: Vec::new(),
            avg_turns: 0.0,
        }
        .enrich();

        assert_eq!(summary.players[0].delta_vs_baseline, 0.0);
        assert_eq!(summary.players[1].delta_vs_baseline, 2.0);
    }
}
