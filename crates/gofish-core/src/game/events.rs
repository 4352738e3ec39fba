use crate::model::player::Seat;
use crate::model::rank::Rank;

/// One public step of play. The engine broadcasts every event to every
/// strategy as it happens and records the turn's sequence in the
/// `TurnReport`, so shells can narrate and bots can track knowledge from
/// the same stream. Payloads carry public information only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// `asker` asked `target` for every card of `rank`.
    Asked { asker: Seat, target: Seat, rank: Rank },
    /// `target` held the rank and handed over `count` cards.
    Handed {
        asker: Seat,
        target: Seat,
        rank: Rank,
        count: usize,
    },
    /// `target` held none of `rank`.
    GoFish { asker: Seat, target: Seat, rank: Rank },
    /// `seat` drew from the deck. `matched` is the asked rank when the
    /// draw completed the ask (the card is shown); an unmatched card
    /// stays hidden.
    Drew { seat: Seat, matched: Option<Rank> },
    /// `seat` began a turn empty-handed and drew a replacement card.
    Refilled { seat: Seat },
    /// `seat` had no cards and the deck was empty, so the turn passed.
    Skipped { seat: Seat },
    /// `seat` collected all four cards of `rank`.
    BookCompleted { seat: Seat, rank: Rank },
}
