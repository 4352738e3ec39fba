use crate::model::card::Card;
use crate::model::rank::Rank;

/// A player's cards, kept sorted by rank then suit so display and
/// iteration order are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    /// Removes and returns every card of `rank`. A rank that is not held
    /// yields an empty vector; callers treat that as "nothing to give".
    pub fn remove_rank(&mut self, rank: Rank) -> Vec<Card> {
        let mut taken = Vec::new();
        self.cards.retain(|&card| {
            if card.rank == rank {
                taken.push(card);
                false
            } else {
                true
            }
        });
        taken
    }

    pub fn has_rank(&self, rank: Rank) -> bool {
        self.cards.iter().any(|card| card.rank == rank)
    }

    pub fn rank_count(&self, rank: Rank) -> usize {
        self.cards.iter().filter(|card| card.rank == rank).count()
    }

    /// Distinct ranks held, ascending.
    pub fn ranks(&self) -> Vec<Rank> {
        let mut ranks: Vec<Rank> = Vec::new();
        for card in &self.cards {
            if ranks.last() != Some(&card.rank) {
                ranks.push(card.rank);
            }
        }
        ranks
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.rank.cmp(&b.rank).then(a.suit.cmp(&b.suit)));
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn cards_are_sorted_by_rank_then_suit() {
        let mut hand = Hand::new();
        hand.add(Card::new(Rank::King, Suit::Spades));
        hand.add(Card::new(Rank::Two, Suit::Hearts));
        hand.add(Card::new(Rank::Two, Suit::Clubs));
        let ordered: Vec<_> = hand.iter().copied().collect();
        assert_eq!(ordered[0], Card::new(Rank::Two, Suit::Clubs));
        assert_eq!(ordered[1], Card::new(Rank::Two, Suit::Hearts));
        assert_eq!(ordered[2], Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn remove_rank_takes_every_copy() {
        let mut hand = Hand::with_cards(vec![
            Card::new(Rank::Seven, Suit::Clubs),
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Diamonds),
        ]);
        let taken = hand.remove_rank(Rank::Seven);
        assert_eq!(taken.len(), 2);
        assert!(!hand.has_rank(Rank::Seven));
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn remove_rank_missing_returns_empty() {
        let mut hand = Hand::with_cards(vec![Card::new(Rank::Ace, Suit::Clubs)]);
        assert!(hand.remove_rank(Rank::Two).is_empty());
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn ranks_are_distinct_and_ascending() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Queen, Suit::Clubs),
            Card::new(Rank::Three, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Spades),
            Card::new(Rank::Three, Suit::Clubs),
        ]);
        assert_eq!(hand.ranks(), vec![Rank::Three, Rank::Queen]);
    }

    #[test]
    fn rank_count_counts_copies() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Five, Suit::Clubs),
            Card::new(Rank::Five, Suit::Spades),
            Card::new(Rank::Five, Suit::Hearts),
        ]);
        assert_eq!(hand.rank_count(Rank::Five), 3);
        assert_eq!(hand.rank_count(Rank::Six), 0);
    }
}
