use crate::model::hand::Hand;
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A position at the table, assigned in join order at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(usize);

impl Seat {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    pub const fn next(self, table_size: usize) -> Seat {
        Seat((self.0 + 1) % table_size)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    name: String,
    hand: Hand,
    books: Vec<Rank>,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Hand::new(),
            books: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    /// Ranks booked so far, in completion order.
    pub fn books(&self) -> &[Rank] {
        &self.books
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub(crate) fn record_book(&mut self, rank: Rank) {
        self.books.push(rank);
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerState, Seat};
    use crate::model::rank::Rank;

    #[test]
    fn next_wraps_around_the_table() {
        assert_eq!(Seat::new(2).next(3), Seat::new(0));
        assert_eq!(Seat::new(0).next(3), Seat::new(1));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Seat::new(0).to_string(), "P1");
        assert_eq!(Seat::new(3).to_string(), "P4");
    }

    #[test]
    fn record_book_appends_in_order() {
        let mut player = PlayerState::new("Ada");
        player.record_book(Rank::Nine);
        player.record_book(Rank::Two);
        assert_eq!(player.books(), &[Rank::Nine, Rank::Two]);
        assert_eq!(player.book_count(), 2);
    }
}
