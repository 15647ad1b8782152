use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniform rejection sampling: draw a random cell, keep it unless it already holds a mine or lies in the
/// safe zone, repeat until every mine is placed.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionSampler {
    seed: u64,
    safe_zone: SafeZone,
}

impl RejectionSampler {
    pub fn new(seed: u64) -> Self {
        Self::with_safe_zone(seed, SafeZone::Neighborhood)
    }

    pub fn with_safe_zone(seed: u64, safe_zone: SafeZone) -> Self {
        Self { seed, safe_zone }
    }

    /// Picks the widest zone that still leaves room for every mine, and how many mines actually fit.
    fn effective_zone(&self, config: GameConfig, start: Coord2) -> (SafeZone, CellCount) {
        let total_cells = config.total_cells();

        let safe_zone = match self.safe_zone {
            SafeZone::Neighborhood
                if config.mines + SafeZone::Neighborhood.cell_count(start, config.size)
                    > total_cells =>
            {
                log::warn!(
                    "Cannot keep the 3x3 start area clear with {} mines, fallback to start cell",
                    config.mines
                );
                SafeZone::StartCell
            }
            zone => zone,
        };

        let room = total_cells.saturating_sub(safe_zone.cell_count(start, config.size));
        if config.mines > room {
            log::warn!(
                "Minefield too full, requested {} mines but only {} fit",
                config.mines,
                room
            );
        }
        (safe_zone, config.mines.min(room))
    }
}

impl MineGenerator for RejectionSampler {
    fn generate(self, config: GameConfig, start: Coord2) -> MineLayout {
        let (safe_zone, mines) = self.effective_zone(config, start);
        let (rows, cols) = config.size;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines_placed = 0;
        let mut draws: u64 = 0;

        while mines_placed < mines {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            draws += 1;
            if mine_mask[coords.to_nd_index()] || safe_zone.contains(start, coords) {
                continue;
            }
            mine_mask[coords.to_nd_index()] = true;
            mines_placed += 1;
        }

        log::debug!(
            "Placed {} mines around start {:?} after {} draws",
            mines_placed,
            start,
            draws
        );
        MineLayout::from_mine_mask(mine_mask)
    }
}
