use crate::game::events::GameEvent;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{PlayerState, Seat};
use crate::model::rank::Rank;
use crate::strategy::{AskContext, OpponentView, Strategy};
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_INITIAL_CARDS: usize = 7;

/// How an empty hand is replenished while the deck lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefillRule {
    /// Draw one card at the start of the player's own turn.
    TurnStart,
    /// As above, and a player whose hand empties by handing cards over
    /// draws a replacement immediately.
    AfterGiving,
}

impl Default for RefillRule {
    fn default() -> Self {
        Self::TurnStart
    }
}

/// One participant: a display name and the strategy that plays for it.
pub struct PlayerSetup {
    pub name: String,
    pub strategy: Box<dyn Strategy>,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>, strategy: Box<dyn Strategy>) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }
}

pub struct GameConfig {
    pub players: Vec<PlayerSetup>,
    pub initial_cards: usize,
    pub seed: Option<u64>,
    pub refill: RefillRule,
}

impl GameConfig {
    pub fn new(players: Vec<PlayerSetup>) -> Self {
        Self {
            players,
            initial_cards: DEFAULT_INITIAL_CARDS,
            seed: None,
            refill: RefillRule::default(),
        }
    }

    pub fn with_initial_cards(mut self, initial_cards: usize) -> Self {
        self.initial_cards = initial_cards;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_refill(mut self, refill: RefillRule) -> Self {
        self.refill = refill;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The roster or deal parameters are unplayable.
    InvalidPlayerConfiguration(String),
    /// A strategy broke its contract (rank not held, ineligible target).
    InvalidStrategyChoice { seat: Seat, detail: String },
    /// `play_turn` was called after the terminal state.
    Finished,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidPlayerConfiguration(detail) => {
                write!(f, "invalid player configuration: {detail}")
            }
            GameError::InvalidStrategyChoice { seat, detail } => {
                write!(f, "invalid choice by {seat}: {detail}")
            }
            GameError::Finished => write!(f, "the game is already over"),
        }
    }
}

impl std::error::Error for GameError {}

/// What happened during one `play_turn` call, in event order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub seat: Seat,
    pub events: Vec<GameEvent>,
    /// The actor caught a card (by ask or by lucky draw) and plays again.
    pub goes_again: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStanding {
    pub seat: Seat,
    pub name: String,
    pub books: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub seed: u64,
    pub turns: u32,
    pub standings: Vec<PlayerStanding>,
    /// Every player tied at the top book count; a clean win is a set of one.
    pub winners: Vec<Seat>,
}

/// Full state of one game: deck, hands, books, strategies, and the single
/// seeded RNG behind the shuffle and every strategy decision.
pub struct GameState {
    deck: Deck,
    players: Vec<PlayerState>,
    strategies: Vec<Box<dyn Strategy>>,
    rng: StdRng,
    seed: u64,
    refill: RefillRule,
    current: usize,
    turns: u32,
    setup_events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let GameConfig {
            players,
            initial_cards,
            seed,
            refill,
        } = config;

        if players.len() < 2 {
            return Err(GameError::InvalidPlayerConfiguration(format!(
                "need at least two players, got {}",
                players.len()
            )));
        }
        if initial_cards == 0 {
            return Err(GameError::InvalidPlayerConfiguration(
                "initial hand size must be at least one card".to_string(),
            ));
        }
        if players.len() * initial_cards > 52 {
            return Err(GameError::InvalidPlayerConfiguration(format!(
                "cannot deal {initial_cards} cards to {} players from a 52 card deck",
                players.len()
            )));
        }
        let mut seen = HashSet::new();
        for setup in &players {
            if !seen.insert(setup.name.as_str()) {
                return Err(GameError::InvalidPlayerConfiguration(format!(
                    "duplicate player name '{}'",
                    setup.name
                )));
            }
        }

        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = Deck::shuffled(&mut rng);

        let mut states = Vec::with_capacity(players.len());
        let mut strategies = Vec::with_capacity(players.len());
        for setup in players {
            states.push(PlayerState::new(setup.name));
            strategies.push(setup.strategy);
        }

        let mut state = Self {
            deck,
            players: states,
            strategies,
            rng,
            seed,
            refill,
            current: 0,
            turns: 0,
            setup_events: Vec::new(),
        };
        state.deal(initial_cards);
        Ok(state)
    }

    /// Deals `initial_cards` consecutive draws per player in seat order,
    /// then books any four-of-a-kind already present.
    fn deal(&mut self, initial_cards: usize) {
        for index in 0..self.players.len() {
            for _ in 0..initial_cards {
                if let Some(card) = self.deck.draw() {
                    self.players[index].hand_mut().add(card);
                }
            }
        }
        let mut events = Vec::new();
        for index in 0..self.players.len() {
            self.collect_books(Seat::new(index), &mut events);
        }
        self.setup_events = events;
    }

    /// Plays one turn for the current player and reports its events.
    pub fn play_turn(&mut self) -> Result<TurnReport, GameError> {
        if self.is_over() {
            return Err(GameError::Finished);
        }
        self.turns += 1;
        let seat = Seat::new(self.current);
        let mut events = Vec::new();

        if self.players[self.current].hand().is_empty() {
            match self.deck.draw() {
                Some(card) => {
                    self.players[self.current].hand_mut().add(card);
                    self.emit(&mut events, GameEvent::Refilled { seat });
                }
                None => {
                    self.emit(&mut events, GameEvent::Skipped { seat });
                    self.advance();
                    return Ok(TurnReport {
                        seat,
                        events,
                        goes_again: false,
                    });
                }
            }
        }

        let opponents = self.eligible_opponents(seat);
        if opponents.is_empty() {
            if let Some(card) = self.deck.draw() {
                self.players[self.current].hand_mut().add(card);
                self.emit(&mut events, GameEvent::Drew { seat, matched: None });
                self.collect_books(seat, &mut events);
            }
            self.advance();
            return Ok(TurnReport {
                seat,
                events,
                goes_again: false,
            });
        }

        let (rank, target) = {
            let current = self.current;
            let players = &self.players;
            let views: Vec<OpponentView<'_>> = opponents
                .iter()
                .map(|&opp| OpponentView {
                    seat: opp,
                    name: players[opp.index()].name(),
                    cards: players[opp.index()].hand().len(),
                })
                .collect();
            let mut ctx = AskContext {
                seat,
                hand: players[current].hand(),
                opponents: &views,
                rng: &mut self.rng,
            };
            let strategy = &mut self.strategies[current];
            let rank = strategy.choose_rank(&mut ctx);
            let target = strategy.choose_opponent(&mut ctx, rank);
            (rank, target)
        };

        if !self.players[self.current].hand().has_rank(rank) {
            return Err(GameError::InvalidStrategyChoice {
                seat,
                detail: format!("asked for {rank} without holding it"),
            });
        }
        if !opponents.contains(&target) {
            return Err(GameError::InvalidStrategyChoice {
                seat,
                detail: format!("chose ineligible opponent {target}"),
            });
        }

        self.emit(
            &mut events,
            GameEvent::Asked {
                asker: seat,
                target,
                rank,
            },
        );

        let taken = self.players[target.index()].hand_mut().remove_rank(rank);
        if taken.is_empty() {
            self.emit(
                &mut events,
                GameEvent::GoFish {
                    asker: seat,
                    target,
                    rank,
                },
            );
            let mut caught = false;
            if let Some(card) = self.deck.draw() {
                caught = card.rank == rank;
                self.players[self.current].hand_mut().add(card);
                self.emit(
                    &mut events,
                    GameEvent::Drew {
                        seat,
                        matched: if caught { Some(rank) } else { None },
                    },
                );
                self.collect_books(seat, &mut events);
            }
            if !caught {
                self.advance();
            }
            Ok(TurnReport {
                seat,
                events,
                goes_again: caught,
            })
        } else {
            let count = taken.len();
            for card in taken {
                self.players[self.current].hand_mut().add(card);
            }
            self.emit(
                &mut events,
                GameEvent::Handed {
                    asker: seat,
                    target,
                    rank,
                    count,
                },
            );
            self.collect_books(seat, &mut events);
            if self.refill == RefillRule::AfterGiving
                && self.players[target.index()].hand().is_empty()
            {
                if let Some(card) = self.deck.draw() {
                    self.players[target.index()].hand_mut().add(card);
                    self.emit(&mut events, GameEvent::Refilled { seat: target });
                }
            }
            Ok(TurnReport {
                seat,
                events,
                goes_again: true,
            })
        }
    }

    /// Runs the game to its terminal state and returns the summary.
    pub fn play_to_completion(&mut self) -> Result<GameSummary, GameError> {
        while !self.is_over() {
            self.play_turn()?;
        }
        Ok(self.summary())
    }

    /// The deck and every hand are empty; all 52 cards sit in books.
    pub fn is_over(&self) -> bool {
        self.deck.is_empty() && self.players.iter().all(|player| player.hand().is_empty())
    }

    /// Seats holding the maximal book count. A tie is reported whole.
    pub fn winners(&self) -> Vec<Seat> {
        let best = self
            .players
            .iter()
            .map(PlayerState::book_count)
            .max()
            .unwrap_or(0);
        self.players
            .iter()
            .enumerate()
            .filter(|(_, player)| player.book_count() == best)
            .map(|(index, _)| Seat::new(index))
            .collect()
    }

    pub fn summary(&self) -> GameSummary {
        let standings = self
            .players
            .iter()
            .enumerate()
            .map(|(index, player)| PlayerStanding {
                seat: Seat::new(index),
                name: player.name().to_string(),
                books: player.book_count(),
            })
            .collect();
        GameSummary {
            seed: self.seed,
            turns: self.turns,
            standings,
            winners: self.winners(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn_count(&self) -> u32 {
        self.turns
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_seat(&self) -> Seat {
        Seat::new(self.current)
    }

    pub fn name(&self, seat: Seat) -> &str {
        self.players[seat.index()].name()
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        self.players[seat.index()].hand()
    }

    pub fn books(&self, seat: Seat) -> &[Rank] {
        self.players[seat.index()].books()
    }

    pub fn book_count(&self, seat: Seat) -> usize {
        self.players[seat.index()].book_count()
    }

    /// Books completed straight out of the deal, before the first turn.
    pub fn setup_events(&self) -> &[GameEvent] {
        &self.setup_events
    }

    fn eligible_opponents(&self, asker: Seat) -> Vec<Seat> {
        self.players
            .iter()
            .enumerate()
            .filter(|(index, player)| *index != asker.index() && !player.hand().is_empty())
            .map(|(index, _)| Seat::new(index))
            .collect()
    }

    /// Extracts every four-of-a-kind from the seat's hand. Runs after any
    /// card enters a hand, so no hand ever holds a completed book.
    fn collect_books(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        let completed: Vec<Rank> = {
            let hand = self.players[seat.index()].hand();
            hand.ranks()
                .into_iter()
                .filter(|&rank| hand.rank_count(rank) == 4)
                .collect()
        };
        for rank in completed {
            let player = &mut self.players[seat.index()];
            player.hand_mut().remove_rank(rank);
            player.record_book(rank);
            self.emit(events, GameEvent::BookCompleted { seat, rank });
        }
    }

    fn emit(&mut self, events: &mut Vec<GameEvent>, event: GameEvent) {
        for strategy in &mut self.strategies {
            strategy.observe(&event);
        }
        events.push(event);
    }

    fn advance(&mut self) {
        self.current = (self.current + 1) % self.players.len();
    }
}
