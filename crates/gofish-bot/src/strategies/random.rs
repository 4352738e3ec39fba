use gofish_core::model::player::Seat;
use gofish_core::model::rank::Rank;
use gofish_core::strategy::{AskContext, Strategy};
use rand::seq::SliceRandom;

/// Uniform choice over held ranks and over eligible opponents.
#[derive(Debug, Default)]
pub struct RandomStrategy;

impl RandomStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for RandomStrategy {
    fn choose_rank(&mut self, ctx: &mut AskContext) -> Rank {
        *ctx.hand
            .ranks()
            .choose(ctx.rng)
            .expect("active player holds at least one card")
    }

    fn choose_opponent(&mut self, ctx: &mut AskContext, _rank: Rank) -> Seat {
        ctx.opponents
            .choose(ctx.rng)
            .expect("engine provides at least one opponent")
            .seat
    }
}

#[cfg(test)]
mod tests {
    use super::RandomStrategy;
    use gofish_core::model::card::Card;
    use gofish_core::model::hand::Hand;
    use gofish_core::model::player::Seat;
    use gofish_core::model::rank::Rank;
    use gofish_core::model::suit::Suit;
    use gofish_core::strategy::{AskContext, OpponentView, Strategy};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_hand() -> Hand {
        Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Spades),
        ])
    }

    #[test]
    fn chooses_a_held_rank_and_an_eligible_opponent() {
        let hand = sample_hand();
        let views = [
            OpponentView {
                seat: Seat::new(1),
                name: "Bea",
                cards: 4,
            },
            OpponentView {
                seat: Seat::new(2),
                name: "Cal",
                cards: 2,
            },
        ];
        let mut strategy = RandomStrategy::new();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ctx = AskContext {
                seat: Seat::new(0),
                hand: &hand,
                opponents: &views,
                rng: &mut rng,
            };
            let rank = strategy.choose_rank(&mut ctx);
            assert!(hand.has_rank(rank));
            let target = strategy.choose_opponent(&mut ctx, rank);
            assert!(views.iter().any(|view| view.seat == target));
        }
    }

    #[test]
    fn same_seed_gives_the_same_choices() {
        let hand = sample_hand();
        let views = [OpponentView {
            seat: Seat::new(1),
            name: "Bea",
            cards: 4,
        }];
        let mut pick = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ctx = AskContext {
                seat: Seat::new(0),
                hand: &hand,
                opponents: &views,
                rng: &mut rng,
            };
            RandomStrategy::new().choose_rank(&mut ctx)
        };
        assert_eq!(pick(9), pick(9));
    }
}
