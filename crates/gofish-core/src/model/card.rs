use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Gameplay matching ignores suits entirely.
    pub fn same_rank(self, other: Card) -> bool {
        self.rank == other.rank
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn same_rank_ignores_suit() {
        let queen_spades = Card::new(Rank::Queen, Suit::Spades);
        let queen_hearts = Card::new(Rank::Queen, Suit::Hearts);
        let king_spades = Card::new(Rank::King, Suit::Spades);
        assert!(queen_spades.same_rank(queen_hearts));
        assert!(!queen_spades.same_rank(king_spades));
    }

    #[test]
    fn display_concatenates_rank_and_suit() {
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "10H");
        assert_eq!(Card::new(Rank::Ace, Suit::Clubs).to_string(), "AC");
    }
}
