use gofish_core::model::player::Seat;
use gofish_core::model::rank::Rank;
use gofish_core::strategy::{AskContext, Strategy};
use rand::seq::SliceRandom;
use tracing::{Level, event};

/// Asks for the rank it holds the most copies of, so successful asks and
/// lucky draws finish books sooner. Ties go to the lowest rank; the
/// opponent is uniform over the eligible list.
#[derive(Debug, Default)]
pub struct SmartStrategy;

impl SmartStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SmartStrategy {
    fn choose_rank(&mut self, ctx: &mut AskContext) -> Rank {
        let ranks = ctx.hand.ranks();
        let mut choice = *ranks
            .first()
            .expect("active player holds at least one card");
        for rank in ranks.into_iter().skip(1) {
            if ctx.hand.rank_count(rank) > ctx.hand.rank_count(choice) {
                choice = rank;
            }
        }
        event!(
            target: "gofish_bot::ask",
            Level::DEBUG,
            seat = %ctx.seat,
            rank = %choice,
            copies = ctx.hand.rank_count(choice),
            reason = "most_held"
        );
        choice
    }

    fn choose_opponent(&mut self, ctx: &mut AskContext, rank: Rank) -> Seat {
        let target = ctx
            .opponents
            .choose(ctx.rng)
            .expect("engine provides at least one opponent")
            .seat;
        event!(
            target: "gofish_bot::ask",
            Level::DEBUG,
            seat = %ctx.seat,
            rank = %rank,
            target = %target,
            eligible = ctx.opponents.len(),
            reason = "uniform_target"
        );
        target
    }
}
