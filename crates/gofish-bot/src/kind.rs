use crate::strategies::{MemoryStrategy, RandomStrategy, SmartStrategy};
use core::fmt;
use gofish_core::strategy::Strategy;
use std::str::FromStr;

/// The AI strategy families selectable from configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Random,
    Smart,
    Memory,
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::Random
    }
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Random,
        StrategyKind::Smart,
        StrategyKind::Memory,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::Smart => "smart",
            StrategyKind::Memory => "memory",
        }
    }

    /// Fresh strategy instance with no carried-over knowledge.
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Random => Box::new(RandomStrategy::new()),
            StrategyKind::Smart => Box::new(SmartStrategy::new()),
            StrategyKind::Memory => Box::new(MemoryStrategy::new()),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(StrategyKind::Random),
            "smart" => Ok(StrategyKind::Smart),
            "memory" => Ok(StrategyKind::Memory),
            other => Err(format!(
                "unknown strategy kind '{other}' (expected random, smart, or memory)"
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::StrategyKind;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("random".parse(), Ok(StrategyKind::Random));
        assert_eq!(" Smart ".parse(), Ok(StrategyKind::Smart));
        assert_eq!("MEMORY".parse(), Ok(StrategyKind::Memory));
        assert!("clever".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.label().parse(), Ok(kind));
        }
    }
}
