use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything a player can legitimately see of a board: sizes, the mine total and each cell's visible state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub mine_count: CellCount,
    pub is_over: bool,
    pub cells: Array2<CellView>,
}

impl Observation {
    pub fn new(
        size: Coord2,
        mine_count: CellCount,
        is_over: bool,
        cells: Array2<CellView>,
    ) -> Result<Self> {
        let obs = Self {
            size,
            mine_count,
            is_over,
            cells,
        };
        obs.validate()?;
        Ok(obs)
    }

    pub fn from_board(board: &Board) -> Self {
        Self {
            size: board.size(),
            mine_count: board.mine_count(),
            is_over: board.is_over(),
            cells: board.cells().clone(),
        }
    }

    /// Parses the text rendering of a board, one line per row, e.g. `"1@#\n11#\n"`.
    ///
    /// The game counts as over when any mine marker (`!`, `*` or `X`) is present.
    pub fn from_markers(text: &str, mine_count: CellCount) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let rows = Coord::try_from(lines.len()).map_err(|_| GameError::InvalidBoardShape)?;
        let cols = lines.first().map_or(0, |line| line.chars().count());
        let cols = Coord::try_from(cols).map_err(|_| GameError::InvalidBoardShape)?;
        if rows == 0 || cols == 0 {
            return Err(GameError::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(usize::from(rows) * usize::from(cols));
        for line in &lines {
            let row_start = cells.len();
            for marker in line.chars() {
                cells.push(parse_marker(marker)?);
            }
            if cells.len() - row_start != usize::from(cols) {
                return Err(GameError::InvalidBoardShape);
            }
        }

        let is_over = cells.iter().any(|cell| {
            matches!(
                cell,
                CellView::ExplodedMine | CellView::RevealedMine | CellView::MisflaggedMine
            )
        });
        let cells = Array2::from_shape_vec((usize::from(rows), usize::from(cols)), cells)
            .map_err(|_| GameError::InvalidBoardShape)?;

        Self::new((rows, cols), mine_count, is_over, cells)
    }

    pub fn validate(&self) -> Result<()> {
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.cells.dim() != expected {
            return Err(GameError::InvalidBoardShape);
        }

        let cells = mult(self.size.0, self.size.1);
        if self.mine_count >= cells {
            return Err(GameError::TooManyMines {
                mines: self.mine_count,
                cells,
            });
        }

        Ok(())
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    /// Same rule as [`Board::is_won`]: every safe cell is neither hidden nor flagged.
    pub fn is_won(&self) -> bool {
        let uncovered = self.cells.iter().filter(|cell| cell.is_uncovered()).count();
        let safe_cells = mult(self.size.0, self.size.1).saturating_sub(self.mine_count);
        uncovered == usize::from(safe_cells)
    }

    /// Every cell with its coordinates, in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    pub fn hidden_cells(&self) -> Vec<Coord2> {
        self.iter_cells()
            .filter(|(_, cell)| cell.is_hidden())
            .map(|(coords, _)| coords)
            .collect()
    }
}

fn parse_marker(marker: char) -> Result<CellView> {
    use CellView::*;
    Ok(match marker {
        '#' => Hidden,
        '@' => Flagged,
        ' ' => Revealed(0),
        '1'..='8' => Revealed(marker as u8 - b'0'),
        '!' => ExplodedMine,
        '*' => RevealedMine,
        'X' => MisflaggedMine,
        other => return Err(GameError::InvalidMarker(other)),
    })
}
