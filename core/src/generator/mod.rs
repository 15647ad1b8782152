use serde::{Deserialize, Serialize};

use crate::*;
pub use rejection::*;

mod rejection;

/// Places mines for a new game once the first revealed cell is known.
pub trait MineGenerator {
    fn generate(self, config: GameConfig, start: Coord2) -> MineLayout;
}

/// Cells around the first revealed cell that must stay free of mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeZone {
    /// The start cell and its whole 3×3 neighborhood.
    Neighborhood,
    /// Only the start cell itself.
    StartCell,
}

impl SafeZone {
    pub const fn contains(self, start: Coord2, coords: Coord2) -> bool {
        match self {
            Self::Neighborhood => is_adjacent_or_same(start, coords),
            Self::StartCell => start.0 == coords.0 && start.1 == coords.1,
        }
    }

    /// How many in-bounds cells the zone covers on a board of `size`.
    pub fn cell_count(self, start: Coord2, size: Coord2) -> CellCount {
        match self {
            // the start cell plus at most 8 neighbors
            Self::Neighborhood => 1 + NeighborIter::new(start, size).count() as CellCount,
            Self::StartCell => 1,
        }
    }
}
