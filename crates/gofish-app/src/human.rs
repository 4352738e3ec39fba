use crate::render;
use gofish_core::model::player::Seat;
use gofish_core::model::rank::Rank;
use gofish_core::strategy::{AskContext, Strategy};
use std::io::{self, BufRead, BufReader, Write};

/// Interactive console player. Shows the hand and the opponents, then
/// re-prompts until the input names a held rank or a listed opponent.
/// A closed input stream falls back to the first option, with a notice.
pub struct HumanStrategy {
    input: Box<dyn BufRead + Send>,
}

impl HumanStrategy {
    pub fn from_stdin() -> Self {
        Self {
            input: Box::new(BufReader::new(io::stdin())),
        }
    }

    pub fn with_input(input: Box<dyn BufRead + Send>) -> Self {
        Self { input }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    }
}

impl Strategy for HumanStrategy {
    fn choose_rank(&mut self, ctx: &mut AskContext) -> Rank {
        let fallback = *ctx
            .hand
            .ranks()
            .first()
            .expect("active player holds at least one card");
        println!();
        println!("Your hand: {}", render::hand_line(ctx.hand));
        loop {
            print!("Ask for which rank? ");
            let _ = io::stdout().flush();
            let Some(line) = self.read_line() else {
                println!("input closed; asking for {fallback}");
                return fallback;
            };
            match Rank::from_symbol(&line) {
                Some(rank) if ctx.hand.has_rank(rank) => return rank,
                Some(rank) => println!("You do not hold any {rank}s."),
                None => println!("'{line}' is not a rank (2-10, J, Q, K, A)."),
            }
        }
    }

    fn choose_opponent(&mut self, ctx: &mut AskContext, rank: Rank) -> Seat {
        if ctx.opponents.len() == 1 {
            println!("Asking {} for {rank}s.", ctx.opponents[0].name);
            return ctx.opponents[0].seat;
        }
        for (index, view) in ctx.opponents.iter().enumerate() {
            println!("  {}. {} ({} cards)", index + 1, view.name, view.cards);
        }
        loop {
            print!("Ask which player for {rank}s? ");
            let _ = io::stdout().flush();
            let Some(line) = self.read_line() else {
                println!("input closed; asking {}", ctx.opponents[0].name);
                return ctx.opponents[0].seat;
            };
            match line.parse::<usize>() {
                Ok(number) if (1..=ctx.opponents.len()).contains(&number) => {
                    return ctx.opponents[number - 1].seat;
                }
                _ => println!("Enter a number between 1 and {}.", ctx.opponents.len()),
            }
        }
    }
}
