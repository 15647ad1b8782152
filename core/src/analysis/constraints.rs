use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Observation;
use crate::*;

/// The constraint one revealed number puts on its own neighborhood: exactly `value` of the
/// `flagged` plus `hidden` neighbors hold mines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalClue {
    pub clue: Coord2,
    pub value: u8,
    pub flagged: u8,
    /// Hidden neighbors in neighbor order.
    pub hidden: SmallVec<[Coord2; 8]>,
}

impl LocalClue {
    /// Builds the clue for `coords`, `None` unless it shows a number `1..=8`.
    pub fn at(obs: &Observation, coords: Coord2) -> Option<Self> {
        let value = obs.cell_at(coords)?.number()?;
        let mut flagged = 0;
        let mut hidden = SmallVec::new();

        for (neighbor, cell) in obs.cells.iter_neighbor_cells_with_index(coords) {
            match cell {
                CellView::Flagged => flagged += 1,
                CellView::Hidden => hidden.push(neighbor),
                _ => {}
            }
        }

        Some(Self {
            clue: coords,
            value,
            flagged,
            hidden,
        })
    }

    /// All flags accounted for: every hidden neighbor is safe.
    pub fn is_satisfied(&self) -> bool {
        !self.hidden.is_empty() && self.flagged == self.value
    }

    /// Flags plus hidden neighbors add up exactly: every hidden neighbor is a mine.
    pub fn is_saturated(&self) -> bool {
        !self.hidden.is_empty() && usize::from(self.value) == usize::from(self.flagged) + self.hidden.len()
    }

    /// Mines still unaccounted for among the hidden neighbors, negative when over-flagged.
    pub fn remaining_mines(&self) -> i16 {
        i16::from(self.value) - i16::from(self.flagged)
    }

    /// Flags already exceed the number, or too few cells are left to hold the rest.
    pub fn is_contradictory(&self) -> bool {
        let remaining = self.remaining_mines();
        remaining < 0 || remaining as usize > self.hidden.len()
    }
}

/// Every numbered cell's clue, in row-major order.
pub fn local_clues(obs: &Observation) -> impl Iterator<Item = LocalClue> + '_ {
    obs.iter_cells()
        .filter_map(move |(coords, _)| LocalClue::at(obs, coords))
}
