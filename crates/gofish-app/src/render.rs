use gofish_core::game::events::GameEvent;
use gofish_core::game::state::{GameState, GameSummary};
use gofish_core::model::hand::Hand;

pub fn hand_line(hand: &Hand) -> String {
    hand.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One narration line per event.
pub fn describe(game: &GameState, event: &GameEvent) -> String {
    match *event {
        GameEvent::Asked {
            asker,
            target,
            rank,
        } => format!(
            "{} asks {} for {}s",
            game.name(asker),
            game.name(target),
            rank
        ),
        GameEvent::Handed {
            target,
            rank,
            count,
            ..
        } => format!(
            "{} hands over {} {}{}",
            game.name(target),
            count,
            rank,
            plural(count)
        ),
        GameEvent::GoFish { target, .. } => format!("{} says: go fish!", game.name(target)),
        GameEvent::Drew {
            seat,
            matched: Some(rank),
        } => format!("{} draws the {} they asked for!", game.name(seat), rank),
        GameEvent::Drew {
            seat,
            matched: None,
        } => format!("{} draws a card", game.name(seat)),
        GameEvent::Refilled { seat } => {
            format!("{} is out of cards and draws a fresh one", game.name(seat))
        }
        GameEvent::Skipped { seat } => {
            format!("{} has no cards left and is skipped", game.name(seat))
        }
        GameEvent::BookCompleted { seat, rank } => {
            format!("{} completes the book of {}s", game.name(seat), rank)
        }
    }
}

/// Final standings, best first, seat order breaking ties.
pub fn standings_lines(summary: &GameSummary) -> Vec<String> {
    let mut rows = summary.standings.clone();
    rows.sort_by(|a, b| b.books.cmp(&a.books).then(a.seat.cmp(&b.seat)));
    rows.iter()
        .map(|row| format!("{}: {} book{}", row.name, row.books, plural(row.books)))
        .collect()
}

pub fn winner_line(summary: &GameSummary) -> String {
    let leaders: Vec<&str> = summary
        .standings
        .iter()
        .filter(|row| summary.winners.contains(&row.seat))
        .map(|row| row.name.as_str())
        .collect();
    let books = summary
        .standings
        .iter()
        .filter(|row| summary.winners.contains(&row.seat))
        .map(|row| row.books)
        .max()
        .unwrap_or(0);
    match leaders.as_slice() {
        [] => "Nobody wins.".to_string(),
        [single] => format!("{single} wins with {books} book{}.", plural(books)),
        many => format!(
            "Tie between {} at {books} book{} each.",
            many.join(" and "),
            plural(books)
        ),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::{describe, hand_line, standings_lines, winner_line};
    use gofish_bot::StrategyKind;
    use gofish_core::game::events::GameEvent;
    use gofish_core::game::state::{
        GameConfig, GameState, GameSummary, PlayerSetup, PlayerStanding,
    };
    use gofish_core::model::card::Card;
    use gofish_core::model::hand::Hand;
    use gofish_core::model::player::Seat;
    use gofish_core::model::rank::Rank;
    use gofish_core::model::suit::Suit;

    fn sample_game() -> GameState {
        let players = vec![
            PlayerSetup::new("Ada", StrategyKind::Random.build()),
            PlayerSetup::new("Bea", StrategyKind::Random.build()),
        ];
        GameState::new(GameConfig::new(players).with_seed(5)).expect("valid configuration")
    }

    #[test]
    fn narration_uses_player_names() {
        let game = sample_game();
        let asked = GameEvent::Asked {
            asker: Seat::new(0),
            target: Seat::new(1),
            rank: Rank::Queen,
        };
        assert_eq!(describe(&game, &asked), "Ada asks Bea for Qs");

        let handed = GameEvent::Handed {
            asker: Seat::new(0),
            target: Seat::new(1),
            rank: Rank::Queen,
            count: 2,
        };
        assert_eq!(describe(&game, &handed), "Bea hands over 2 Qs");

        let fish = GameEvent::GoFish {
            asker: Seat::new(0),
            target: Seat::new(1),
            rank: Rank::Queen,
        };
        assert_eq!(describe(&game, &fish), "Bea says: go fish!");

        let lucky = GameEvent::Drew {
            seat: Seat::new(0),
            matched: Some(Rank::Queen),
        };
        assert_eq!(describe(&game, &lucky), "Ada draws the Q they asked for!");
    }

    #[test]
    fn hand_line_lists_sorted_cards() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Queen, Suit::Diamonds),
            Card::new(Rank::Two, Suit::Clubs),
        ]);
        assert_eq!(hand_line(&hand), "2C QD");
    }

    fn summary_with_books(books: &[usize], winners: &[usize]) -> GameSummary {
        let names = ["Ada", "Bea", "Cal"];
        GameSummary {
            seed: 1,
            turns: 40,
            standings: books
                .iter()
                .enumerate()
                .map(|(index, &count)| PlayerStanding {
                    seat: Seat::new(index),
                    name: names[index].to_string(),
                    books: count,
                })
                .collect(),
            winners: winners.iter().map(|&index| Seat::new(index)).collect(),
        }
    }

    #[test]
    fn standings_sort_best_first() {
        let summary = summary_with_books(&[2, 7, 4], &[1]);
        assert_eq!(
            standings_lines(&summary),
            vec!["Bea: 7 books", "Cal: 4 books", "Ada: 2 books"]
        );
    }

    #[test]
    fn winner_line_names_a_sole_winner() {
        let summary = summary_with_books(&[2, 7, 4], &[1]);
        assert_eq!(winner_line(&summary), "Bea wins with 7 books.");
    }

    #[test]
    fn winner_line_reports_ties_whole() {
        let summary = summary_with_books(&[5, 5, 3], &[0, 1]);
        assert_eq!(
            winner_line(&summary),
            "Tie between Ada and Bea at 5 books each."
        );
    }
}
