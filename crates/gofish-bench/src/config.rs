use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use gofish_bot::StrategyKind;
use gofish_core::game::state::{DEFAULT_INITIAL_CARDS, RefillRule};

const DEFAULT_ROTATIONS: usize = 1;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub run_id: String,
    pub sim: SimConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    pub players: Vec<PlayerConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimulationConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        validate_players(&self.players)?;
        self.sim.validate(self.players.len())?;
        self.rules.validate(self.players.len())?;
        self.outputs.validate(&self.run_id)?;
        self.metrics.validate(&self.players)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// Batch sizing and seeding block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    pub seed: Option<u64>,
    pub games: usize,
    #[serde(default = "default_rotations")]
    pub rotations: usize,
}

impl SimConfig {
    fn validate(&self, player_count: usize) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(ValidationError::InvalidField {
                field: "sim.games".to_string(),
                message: "number of games must be greater than zero".to_string(),
            });
        }

        if self.rotations == 0 {
            return Err(ValidationError::InvalidField {
                field: "sim.rotations".to_string(),
                message: "rotations must be at least 1".to_string(),
            });
        }

        if self.rotations > player_count {
            return Err(ValidationError::InvalidField {
                field: "sim.rotations".to_string(),
                message: format!(
                    "{} rotations exceed the player count of {player_count}",
                    self.rotations
                ),
            });
        }

        Ok(())
    }
}

fn default_rotations() -> usize {
    DEFAULT_ROTATIONS
}

/// Rule knobs forwarded to the game engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RulesConfig {
    #[serde(default = "default_initial_cards")]
    pub initial_cards: usize,
    #[serde(default)]
    pub refill: RefillRule,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            initial_cards: default_initial_cards(),
            refill: RefillRule::default(),
        }
    }
}

impl RulesConfig {
    fn validate(&self, player_count: usize) -> Result<(), ValidationError> {
        if self.initial_cards == 0 {
            return Err(ValidationError::InvalidField {
                field: "rules.initial_cards".to_string(),
                message: "initial hand size must be at least 1".to_string(),
            });
        }

        if player_count * self.initial_cards > 52 {
            return Err(ValidationError::InvalidField {
                field: "rules.initial_cards".to_string(),
                message: format!(
                    "dealing {} cards to {player_count} players exceeds the 52-card deck",
                    self.initial_cards
                ),
            });
        }

        Ok(())
    }
}

fn default_initial_cards() -> usize {
    DEFAULT_INITIAL_CARDS
}

/// Definition of one simulated participant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlayerConfig {
    pub name: String,
    pub kind: PlayerKind,
}

/// Strategy selector as written in YAML.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Random,
    Smart,
    Memory,
}

impl PlayerKind {
    /// Map onto the strategy factory used at game construction time.
    pub fn strategy(self) -> StrategyKind {
        match self {
            PlayerKind::Random => StrategyKind::Random,
            PlayerKind::Smart => StrategyKind::Smart,
            PlayerKind::Memory => StrategyKind::Memory,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Metrics configuration block.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
}

impl MetricsConfig {
    fn validate(&self, players: &[PlayerConfig]) -> Result<(), ValidationError> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: "baseline player must be specified".to_string(),
            });
        };

        if !players.iter().any(|p| &p.name == baseline) {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: format!("baseline player '{baseline}' is not in the players list"),
            });
        }

        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_players(players: &[PlayerConfig]) -> Result<(), ValidationError> {
    if players.len() < 2 {
        return Err(ValidationError::InvalidField {
            field: "players".to_string(),
            message: "at least two players must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for player in players {
        if player.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "players.name".to_string(),
                message: "player name must not be empty".to_string(),
            });
        }

        if !player.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("players[{}].name", player.name),
                message: "player name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(player.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "players".to_string(),
                message: format!("player name '{}' defined more than once", player.name),
            });
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "nightly_ladder"
sim:
  seed: 123
  games: 16
players:
  - name: "baseline"
    kind: "random"
  - name: "sharp"
    kind: "smart"
  - name: "recall"
    kind: "memory"
outputs:
  jsonl: "bench/out/{run_id}/games.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
  plots_dir: "bench/out/{run_id}/plots"
metrics:
  baseline: "baseline"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: SimulationConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.sim.rotations, DEFAULT_ROTATIONS);
        assert_eq!(cfg.rules.initial_cards, DEFAULT_INITIAL_CARDS);
        assert_eq!(cfg.rules.refill, RefillRule::TurnStart);
        assert!(cfg.logging.enable_structured);

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/nightly_ladder/games.jsonl")
        );
    }

    #[test]
    fn rejects_missing_baseline() {
        let yaml = BASIC_YAML.replace("metrics:\n  baseline: \"baseline\"\n", "");
        let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "metrics.baseline"
        ));
    }

    #[test]
    fn rejects_duplicate_players() {
        let yaml = BASIC_YAML.replace(
            "  - name: \"sharp\"\n    kind: \"smart\"\n",
            "  - name: \"baseline\"\n    kind: \"smart\"\n",
        );
        let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate players should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "players"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("nightly_ladder", "nightly ladder");
        let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_more_rotations_than_players() {
        let yaml = BASIC_YAML.replace("  games: 16\n", "  games: 16\n  rotations: 7\n");
        let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("excess rotations");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "sim.rotations"
        ));
    }

    #[test]
    fn rejects_a_deal_larger_than_the_deck() {
        let yaml = BASIC_YAML.replace("players:\n", "rules:\n  initial_cards: 18\nplayers:\n");
        let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("oversized deal");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "rules.initial_cards"
        ));
    }

    #[test]
    fn outputs_resolve_template_multiple_occurrences() {
        let yaml = BASIC_YAML.replace(
            "bench/out/{run_id}/plots",
            "bench/out/{run_id}/{run_id}/plots",
        );
        let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.plots_dir,
            PathBuf::from("bench/out/nightly_ladder/nightly_ladder/plots")
        );
    }
}
