//! Heuristic move selection for when no adaptive engine is running.
//!
//! This is a biased-random policy, not a chess-strength model: it never
//! evaluates a position. Strong settings only narrow the pool to forcing
//! moves (captures and checks) before picking uniformly at random.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use shakmaty::{Chess, Move, Position};

/// Skill levels above this prefer captures and checks (the top tier only).
pub const TACTICAL_SKILL_THRESHOLD: u8 = 15;

pub struct FallbackSelector {
    rng: Mutex<StdRng>,
}

impl Default for FallbackSelector {
    fn default() -> Self {
        Self::from_rng(rand::make_rng())
    }
}

impl FallbackSelector {
    /// Reproducible selector for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn select(&self, pos: &Chess, skill_level: u8) -> Option<Move> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        select_with(pos, skill_level, &mut *rng)
    }
}

/// Pick a legal move for `pos`, or `None` if there is none.
pub fn select_with<R: Rng + ?Sized>(pos: &Chess, skill_level: u8, rng: &mut R) -> Option<Move> {
    let legal: Vec<Move> = pos.legal_moves().into_iter().collect();

    if skill_level > TACTICAL_SKILL_THRESHOLD {
        let forcing: Vec<Move> = legal
            .iter()
            .copied()
            .filter(|mv| mv.is_capture() || gives_check(pos, *mv))
            .collect();
        if let Some(mv) = forcing.choose(rng) {
            return Some(*mv);
        }
    }

    legal.choose(rng).copied()
}

fn gives_check(pos: &Chess, mv: Move) -> bool {
    let mut after = pos.clone();
    after.play_unchecked(mv);
    after.is_check()
}
