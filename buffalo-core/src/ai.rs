//! Buffalo selection heuristic

use crate::board::Coord;
use crate::config::AiConfig;
use crate::pieces::Piece;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Weight of a buffalo one step from the goal row
pub const ABOUT_TO_WIN_WEIGHT: f64 = 999.0;

/// Weight of a buffalo that exercised free will this turn
pub const SUPPRESSED_WEIGHT: f64 = -999.0;

/// Weight per row of progress
const ROW_WEIGHT: f64 = 5.0;

// ============================================================================
// SELECTOR
// ============================================================================

/// Picks which eligible buffalo advances each AI half-turn
#[derive(Clone, Debug)]
pub struct BuffaloSelector {
    pub config: AiConfig,
    rng: ChaCha8Rng,
}

impl BuffaloSelector {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Choose one buffalo from `eligible`.
    ///
    /// `goal_row` is the last board row; `dogs` are the columns-blocking dog squares.
    /// Returns `None` only when `eligible` is empty.
    pub fn select_advancing(
        &mut self,
        eligible: &[Piece],
        player: Coord,
        dogs: &[Coord],
        goal_row: i8,
    ) -> Option<Piece> {
        if eligible.is_empty() {
            return None;
        }

        // Random upset
        if self.rng.gen::<f64>() < self.config.upset_chance {
            let pick = eligible[self.rng.gen_range(0..eligible.len())];
            tracing::debug!("Random upset picked buffalo {} at {}", pick.id, pick.pos);
            return Some(pick);
        }

        // One weight per buffalo per call, scanned in the caller's order
        let mut best = eligible[0];
        let mut best_weight = self.weight(&best, player, dogs, goal_row);
        for candidate in &eligible[1..] {
            let w = self.weight(candidate, player, dogs, goal_row);
            if best_weight < w {
                best = *candidate;
                best_weight = w;
            }
        }

        tracing::debug!(
            "Selected buffalo {} at {} (weight {:.2})",
            best.id,
            best.pos,
            best_weight
        );
        Some(best)
    }

    /// Score a buffalo relative to the player position
    fn weight(&mut self, buffalo: &Piece, player: Coord, dogs: &[Coord], goal_row: i8) -> f64 {
        // Adjacent to the player: usually keeps its head down
        if buffalo.pos.chebyshev(player) <= 1
            && self.rng.gen::<f64>() < self.config.suppress_chance
        {
            return SUPPRESSED_WEIGHT;
        }

        if buffalo.pos.row + 1 == goal_row {
            return ABOUT_TO_WIN_WEIGHT;
        }

        let jitter = self.rng.gen::<f64>() * self.config.tie_break;
        ROW_WEIGHT * (buffalo.pos.row - blocked_by_dog(buffalo.pos, dogs)) as f64
            + (player.col - buffalo.pos.col).abs() as f64
            + jitter
    }
}

/// 1 if any dog shares the buffalo's column
fn blocked_by_dog(pos: Coord, dogs: &[Coord]) -> i8 {
    if dogs.iter().any(|d| d.col == pos.col) {
        1
    } else {
        0
    }
}

// ============================================================================
// TESTS
// ============================================================================
