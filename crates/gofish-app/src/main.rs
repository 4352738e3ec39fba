mod human;
mod render;

use clap::Parser;
use gofish_bot::StrategyKind;
use gofish_core::game::state::{DEFAULT_INITIAL_CARDS, GameConfig, GameState, PlayerSetup};
use human::HumanStrategy;
use tracing_subscriber::EnvFilter;

/// Console Go Fish table for humans and bots.
#[derive(Debug, Parser)]
#[command(name = "gofish", author, version, about = "Console Go Fish simulator")]
struct Cli {
    /// Number of players at the table.
    #[arg(long, value_name = "COUNT", default_value_t = 4)]
    players: usize,

    /// Take the first seat yourself and play interactively.
    #[arg(long)]
    human: bool,

    /// Strategy kinds for the AI seats, cycled in order.
    #[arg(long, value_name = "KINDS", value_delimiter = ',', default_value = "random")]
    types: Vec<StrategyKind>,

    /// Cards dealt to each player at the start.
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_INITIAL_CARDS)]
    initial_cards: usize,

    /// RNG seed; omit for a fresh shuffle.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Suppress turn-by-turn narration (ignored with --human).
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let narrate = !cli.quiet || cli.human;

    let mut config = GameConfig::new(build_roster(&cli)).with_initial_cards(cli.initial_cards);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let mut game = GameState::new(config)?;

    println!(
        "Go Fish: {} players, {} cards each, seed {}",
        game.player_count(),
        cli.initial_cards,
        game.seed()
    );
    if narrate {
        for event in game.setup_events() {
            println!("  {}", render::describe(&game, event));
        }
    }

    while !game.is_over() {
        let report = game.play_turn()?;
        if narrate {
            for event in &report.events {
                println!("  {}", render::describe(&game, event));
            }
        }
    }

    let summary = game.summary();
    println!();
    println!("Final standings after {} turns:", summary.turns);
    for line in render::standings_lines(&summary) {
        println!("  {line}");
    }
    println!("{}", render::winner_line(&summary));
    Ok(())
}

fn build_roster(cli: &Cli) -> Vec<PlayerSetup> {
    let mut roster = Vec::with_capacity(cli.players);
    let mut bot_index = 0;
    for seat in 0..cli.players {
        if cli.human && seat == 0 {
            roster.push(PlayerSetup::new(
                "You",
                Box::new(HumanStrategy::from_stdin()),
            ));
            continue;
        }
        let kind = cli.types[bot_index % cli.types.len()];
        roster.push(PlayerSetup::new(
            format!("{}-{}", kind.label(), seat + 1),
            kind.build(),
        ));
        bot_index += 1;
    }
    roster
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::{Cli, build_roster};
    use clap::CommandFactory;
    use gofish_bot::StrategyKind;

    fn cli(players: usize, human: bool, types: Vec<StrategyKind>) -> Cli {
        Cli {
            players,
            human,
            types,
            initial_cards: 7,
            seed: None,
            quiet: true,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn roster_cycles_the_requested_kinds() {
        let roster = build_roster(&cli(
            5,
            false,
            vec![StrategyKind::Random, StrategyKind::Smart],
        ));
        let names: Vec<_> = roster.iter().map(|setup| setup.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["random-1", "smart-2", "random-3", "smart-4", "random-5"]
        );
    }

    #[test]
    fn human_takes_the_first_seat() {
        let roster = build_roster(&cli(3, true, vec![StrategyKind::Memory]));
        let names: Vec<_> = roster.iter().map(|setup| setup.name.as_str()).collect();
        assert_eq!(names, vec!["You", "memory-2", "memory-3"]);
    }
}
