use gofish_core::game::events::GameEvent;
use gofish_core::model::player::Seat;
use gofish_core::model::rank::Rank;
use gofish_core::strategy::{AskContext, Strategy};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{Level, event};

/// Remembers which (player, rank) pairs are known misses from the public
/// event stream and steers asks away from them. A "go fish" answer and a
/// surrendered rank both prove the target holds none of it; a player
/// asking for a rank proves possession and clears the fact. Facts are
/// never invalidated by hidden draws, so the memory can go stale and the
/// strategy falls back to guessing when every option is ruled out.
pub struct MemoryStrategy {
    known_missing: HashSet<(Seat, Rank)>,
}

impl MemoryStrategy {
    pub fn new() -> Self {
        Self {
            known_missing: HashSet::new(),
        }
    }

    fn everyone_misses(&self, ctx: &AskContext, rank: Rank) -> bool {
        ctx.opponents
            .iter()
            .all(|view| self.known_missing.contains(&(view.seat, rank)))
    }
}

impl Default for MemoryStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MemoryStrategy {
    fn choose_rank(&mut self, ctx: &mut AskContext) -> Rank {
        let held = ctx.hand.ranks();
        let viable: Vec<Rank> = held
            .iter()
            .copied()
            .filter(|&rank| !self.everyone_misses(ctx, rank))
            .collect();
        let forced = viable.is_empty();
        let pool = if forced { &held } else { &viable };
        let choice = *pool
            .choose(ctx.rng)
            .expect("active player holds at least one card");
        event!(
            target: "gofish_bot::ask",
            Level::DEBUG,
            seat = %ctx.seat,
            rank = %choice,
            held = held.len(),
            viable = viable.len(),
            facts = self.known_missing.len(),
            reason = if forced { "forced_guess" } else { "memory_filtered" }
        );
        choice
    }

    fn choose_opponent(&mut self, ctx: &mut AskContext, rank: Rank) -> Seat {
        let fresh: Vec<Seat> = ctx
            .opponents
            .iter()
            .map(|view| view.seat)
            .filter(|&seat| !self.known_missing.contains(&(seat, rank)))
            .collect();
        let target = match fresh.choose(ctx.rng) {
            Some(&seat) => seat,
            None => {
                ctx.opponents
                    .choose(ctx.rng)
                    .expect("engine provides at least one opponent")
                    .seat
            }
        };
        event!(
            target: "gofish_bot::ask",
            Level::DEBUG,
            seat = %ctx.seat,
            rank = %rank,
            target = %target,
            fresh = fresh.len(),
            eligible = ctx.opponents.len(),
            reason = "memory_target"
        );
        target
    }

    fn observe(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Asked { asker, rank, .. } => {
                self.known_missing.remove(&(asker, rank));
            }
            GameEvent::GoFish { target, rank, .. } => {
                self.known_missing.insert((target, rank));
            }
            GameEvent::Handed {
                asker,
                target,
                rank,
                ..
            } => {
                self.known_missing.insert((target, rank));
                self.known_missing.remove(&(asker, rank));
            }
            _ => {}
        }
    }
}
