use crate::game::events::GameEvent;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::rank::Rank;
use rand::rngs::StdRng;

/// Public information about one opponent the active player may ask.
/// The engine pre-filters the list: never the asker, never an empty hand.
#[derive(Debug)]
pub struct OpponentView<'a> {
    pub seat: Seat,
    pub name: &'a str,
    pub cards: usize,
}

/// Context handed to a strategy for one decision. `rng` is the game's
/// single seeded source, so a fixed seed replays every choice.
pub struct AskContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub opponents: &'a [OpponentView<'a>],
    pub rng: &'a mut StdRng,
}

/// Decision interface for one player. AI implementations live in the bot
/// crate; the interactive console player implements the same trait.
pub trait Strategy: Send {
    /// Pick the rank to ask for. Must be a rank currently held.
    fn choose_rank(&mut self, ctx: &mut AskContext) -> Rank;

    /// Pick which opponent to ask for `rank`. Must be one of
    /// `ctx.opponents`.
    fn choose_opponent(&mut self, ctx: &mut AskContext, rank: Rank) -> Seat;

    /// Called with every public event as it resolves. Stateful strategies
    /// update their knowledge here.
    fn observe(&mut self, _event: &GameEvent) {}
}
