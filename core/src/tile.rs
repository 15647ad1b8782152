use core::fmt;

use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    /// Opened safe cell with its adjacent mine count in `0..=8`, `0` being blank. The engine only
    /// builds it from a [`Field::Clear`] count.
    Revealed(u8),
    /// The mine that ended the game.
    ExplodedMine,
    /// Any other unflagged mine, shown once the game is lost.
    RevealedMine,
    /// Flag placed on a safe cell, shown once the game is lost.
    MisflaggedMine,
}

impl CellView {
    /// The number shown on a revealed cell, if it is one of `1..=8`.
    pub const fn number(self) -> Option<u8> {
        match self {
            Self::Revealed(count @ 1..=8) => Some(count),
            _ => None,
        }
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    /// Whether this cell counts toward the win condition (neither hidden nor flagged).
    pub const fn is_uncovered(self) -> bool {
        !matches!(self, Self::Hidden | Self::Flagged)
    }

    /// Single-character marker used by the text rendering. A count above 8 cannot come from a board
    /// and renders as `?`.
    pub const fn marker(self) -> char {
        use CellView::*;
        match self {
            Hidden => '#',
            Flagged => '@',
            Revealed(0) => ' ',
            Revealed(count @ 1..=8) => (b'0' + count) as char,
            Revealed(_) => '?',
            ExplodedMine => '!',
            RevealedMine => '*',
            MisflaggedMine => 'X',
        }
    }
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// What actually lies under a cell, fixed once mines are placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Mine,
    /// Safe cell with the number of mines among its neighbors.
    Clear(u8),
}

impl Field {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::Clear(0)
    }
}
