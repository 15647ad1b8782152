use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// One action proposed by the [`Solver`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Reveal a cell proven safe by a satisfied number.
    SafeReveal(Coord2),
    /// Flag a cell proven to be a mine by a saturated number.
    Flag(Coord2),
    /// Nothing could be deduced, reveal a random hidden cell.
    Guess(Coord2),
    /// No hidden cell left to act on.
    Stuck,
    Win,
    Lose,
}

impl Move {
    pub const fn target(self) -> Option<Coord2> {
        match self {
            Self::SafeReveal(coords) | Self::Flag(coords) | Self::Guess(coords) => Some(coords),
            Self::Stuck | Self::Win | Self::Lose => None,
        }
    }

    /// Whether the game cannot continue after this move.
    pub const fn is_terminal(self) -> bool {
        self.target().is_none()
    }
}

/// Local constraint solver: only ever reasons about one number at a time, and guesses uniformly
/// at random when no single number decides anything.
#[derive(Clone, Debug)]
pub struct Solver {
    rng: SmallRng,
}

impl Solver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Picks the next move for `board` without touching it.
    pub fn propose_move(&mut self, board: &Board) -> Move {
        self.propose(&Observation::from_board(board))
    }

    pub fn propose(&mut self, obs: &Observation) -> Move {
        if obs.is_over {
            return Move::Lose;
        }
        if obs.is_won() {
            return Move::Win;
        }

        if let Some(coords) = find_safe_cell(obs) {
            log::trace!("Safe reveal at {:?}", coords);
            return Move::SafeReveal(coords);
        }

        if let Some(coords) = find_mine(obs) {
            log::trace!("Flag at {:?}", coords);
            return Move::Flag(coords);
        }

        let hidden = obs.hidden_cells();
        match hidden.choose(&mut self.rng) {
            Some(&coords) => {
                log::trace!("Guessing {:?} out of {} hidden cells", coords, hidden.len());
                Move::Guess(coords)
            }
            None => {
                log::debug!("No hidden cells left to play");
                Move::Stuck
            }
        }
    }
}

/// First hidden neighbor, in scan order, of a number whose flags already match it.
pub fn find_safe_cell(obs: &Observation) -> Option<Coord2> {
    local_clues(obs)
        .find(LocalClue::is_satisfied)
        .and_then(|clue| clue.hidden.first().copied())
}

/// First hidden neighbor, in scan order, of a number that needs every hidden neighbor to be a mine.
pub fn find_mine(obs: &Observation) -> Option<Coord2> {
    local_clues(obs)
        .find(LocalClue::is_saturated)
        .and_then(|clue| clue.hidden.first().copied())
}
