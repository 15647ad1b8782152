use std::collections::VecDeque;
use std::fmt;
use std::num::Saturating;

use chrono::prelude::*;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Ready -> Active
/// - Ready -> Won (a single reveal opened every safe cell)
/// - Ready -> Lost (only possible for boards built from a fixed layout)
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    /// No cell revealed yet, mines may not be placed
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl BoardState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game of mines: owns the hidden layout and everything the player can see.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    seed: u64,
    fields: Array2<Field>,
    cells: Array2<CellView>,
    mines_placed: bool,
    first_move_pending: bool,
    is_over: bool,
    flags_placed: Saturating<CellCount>,
    revealed_count: Saturating<CellCount>,
    triggered_mine: Option<Coord2>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Board {
    /// Allocates an all-hidden board. Mines are placed on the first reveal, using `seed`.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "New {}x{} board with {} mines, seed {}",
            config.rows(),
            config.cols(),
            config.mines,
            seed
        );

        Ok(Self {
            config,
            seed,
            fields: try_grid(config.size, Field::default())?,
            cells: try_grid(config.size, CellView::Hidden)?,
            mines_placed: false,
            first_move_pending: true,
            is_over: false,
            flags_placed: Saturating(0),
            revealed_count: Saturating(0),
            triggered_mine: None,
            started_at: None,
            ended_at: None,
        })
    }

    /// Builds a board whose mines are already known, the first reveal then skips placement.
    pub fn from_layout(layout: &MineLayout) -> Result<Self> {
        let mut board = Self::new(layout.game_config(), 0)?;
        board.fields = layout.fields();
        board.mines_placed = true;
        Ok(board)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn rows(&self) -> Coord {
        self.config.rows()
    }

    pub fn cols(&self) -> Coord {
        self.config.cols()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flags_placed.0
    }

    /// Mines minus flags, negative when the player over-flagged.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flags_placed.0 as isize)
    }

    pub fn first_move_pending(&self) -> bool {
        self.first_move_pending
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn state(&self) -> BoardState {
        if self.is_over {
            BoardState::Lost
        } else if self.all_safe_revealed() {
            BoardState::Won
        } else if self.first_move_pending {
            BoardState::Ready
        } else {
            BoardState::Active
        }
    }

    /// Whether no more moves are accepted, either lost or won.
    pub fn is_finished(&self) -> bool {
        self.is_over || self.all_safe_revealed()
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    /// The hidden contents of a cell, only known once mines are placed.
    pub fn field_at(&self, coords: Coord2) -> Option<Field> {
        if self.mines_placed {
            self.fields.get(coords.to_nd_index()).copied()
        } else {
            None
        }
    }

    /// Read-only view of every cell, indexed `[row, col]`.
    pub fn cells(&self) -> &Array2<CellView> {
        &self.cells
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// How many seconds have passed since the first reveal, frozen once the game ends, 0 if not started.
    pub fn elapsed_secs(&self) -> u32 {
        match self.started_at {
            Some(started_at) => (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .clamp(0, u32::MAX.into()) as u32,
            None => 0,
        }
    }

    /// Counts every cell that is neither hidden nor flagged and compares against the safe cell count.
    pub fn is_won(&self) -> bool {
        let uncovered = self.cells.iter().filter(|cell| cell.is_uncovered()).count();
        uncovered == usize::from(self.config.safe_cells())
    }

    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if self.is_finished() || !self.is_hidden(coords) {
            return RevealOutcome::NoChange;
        }

        if self.first_move_pending {
            self.start_game(coords);
        }

        self.flood_reveal(coords)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        use CellView::*;

        if self.is_finished() {
            return MarkOutcome::NoChange;
        }

        let Some(cell) = self.cells.get_mut(coords.to_nd_index()) else {
            return MarkOutcome::NoChange;
        };

        match *cell {
            Hidden => {
                *cell = Flagged;
                self.flags_placed += 1;
            }
            Flagged => {
                *cell = Hidden;
                self.flags_placed -= 1;
            }
            _ => return MarkOutcome::NoChange,
        }
        log::trace!("Toggled flag at {:?}, {} placed", coords, self.flags_placed);
        MarkOutcome::Changed
    }

    /// Reveals every hidden neighbor of a numbered cell once exactly that many neighbors are flagged.
    pub fn chord(&mut self, coords: Coord2) -> RevealOutcome {
        if self.is_finished() {
            return RevealOutcome::NoChange;
        }

        let Some(count) = self.cell_at(coords).and_then(CellView::number) else {
            return RevealOutcome::NoChange;
        };

        let flagged = self.count_flagged_neighbors(coords);
        if flagged != count {
            log::trace!(
                "Chord at {:?} ignored, shows {} but {} neighbors flagged",
                coords,
                count,
                flagged
            );
            return RevealOutcome::NoChange;
        }

        // a wrong flag may explode a mine part way; the rest still opens, the sweep already
        // turned every other mine into a marker so it is no longer hidden
        let targets: SmallVec<[Coord2; 8]> = self
            .cells
            .iter_neighbors(coords)
            .filter(|&pos| self.is_hidden(pos))
            .collect();

        let mut outcome = RevealOutcome::NoChange;
        for neighbor in targets {
            if self.is_hidden(neighbor) {
                outcome = outcome | self.flood_reveal(neighbor);
            }
        }
        outcome
    }

    fn start_game(&mut self, start: Coord2) {
        if !self.mines_placed {
            let layout = RejectionSampler::new(self.seed).generate(self.config, start);
            self.fields = layout.fields();
            self.mines_placed = true;
        }
        self.first_move_pending = false;

        let now = Utc::now();
        log::debug!("started at {}", now);
        self.started_at = Some(now);
    }

    /// Opens `start`; a blank cell keeps opening its hidden neighbors through a work-list.
    fn flood_reveal(&mut self, start: Coord2) -> RevealOutcome {
        if self.fields[start.to_nd_index()].is_mine() {
            self.explode(start);
            return RevealOutcome::HitMine;
        }

        let mut to_visit = VecDeque::from([start]);
        while let Some(coords) = to_visit.pop_front() {
            // a cell may be queued more than once but only a hidden one is opened
            if !self.is_hidden(coords) {
                continue;
            }

            // blanks have no mine neighbors, so the flood never queues a mine
            let Field::Clear(count) = self.fields[coords.to_nd_index()] else {
                continue;
            };

            self.cells[coords.to_nd_index()] = CellView::Revealed(count);
            self.revealed_count += 1;
            log::trace!("Revealed {:?}, mine count: {}", coords, count);

            if count == 0 {
                to_visit.extend(
                    self.cells
                        .iter_neighbors(coords)
                        .filter(|&pos| self.is_hidden(pos)),
                );
            }
        }

        if self.is_over {
            RevealOutcome::Revealed
        } else if self.all_safe_revealed() {
            self.ended_at = Some(Utc::now());
            log::debug!("Board cleared after {}s", self.elapsed_secs());
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Ends the game and uncovers the whole board in one sweep.
    fn explode(&mut self, coords: Coord2) {
        use CellView::*;

        self.is_over = true;
        self.triggered_mine = Some(coords);
        self.ended_at = Some(Utc::now());

        Zip::from(&mut self.cells)
            .and(&self.fields)
            .for_each(|cell, field| match (*field, *cell) {
                (Field::Mine, Flagged) => {}
                (Field::Mine, _) => *cell = RevealedMine,
                (Field::Clear(_), Flagged) => *cell = MisflaggedMine,
                (Field::Clear(_), _) => {}
            });
        self.cells[coords.to_nd_index()] = ExplodedMine;

        log::debug!("Mine hit at {:?}, game over", coords);
    }

    fn all_safe_revealed(&self) -> bool {
        self.revealed_count.0 == self.config.safe_cells()
    }

    fn is_hidden(&self, coords: Coord2) -> bool {
        matches!(self.cell_at(coords), Some(CellView::Hidden))
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbor_cells(coords)
            .filter(|cell| cell.is_flagged())
            .count() as u8
    }
}

/// One line per row using the classic markers.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{}", cell.marker())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::from_layout(&MineLayout::from_mine_coords(size, mines).unwrap()).unwrap()
    }

    fn count_cells(board: &Board, pred: impl Fn(CellView) -> bool) -> usize {
        board.cells().iter().filter(|&&cell| pred(cell)).count()
    }

    #[test]
    fn new_board_is_hidden_and_unplaced() {
        let board = Board::new(Difficulty::Easy.config(), 1).unwrap();

        assert_eq!(board.state(), BoardState::Ready);
        assert!(board.first_move_pending());
        assert!(!board.is_over());
        assert_eq!(board.field_at((0, 0)), None);
        assert_eq!(count_cells(&board, CellView::is_hidden), 81);
        assert_eq!(board.started_at(), None);
        assert_eq!(board.elapsed_secs(), 0);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert_eq!(
            Board::new(GameConfig::new_unchecked((0, 9), 0), 1),
            Err(GameError::EmptyBoard)
        );
        assert_eq!(
            Board::new(GameConfig::new_unchecked((3, 3), 9), 1),
            Err(GameError::TooManyMines { mines: 9, cells: 9 })
        );
    }

    #[test]
    fn first_reveal_places_mines_away_from_start() {
        let mut board = Board::new(Difficulty::Easy.config(), 42).unwrap();

        let outcome = board.reveal((4, 4));

        assert!(outcome.has_update());
        assert!(!board.is_over());
        assert!(!board.first_move_pending());
        assert!(board.started_at().is_some());
        assert_eq!(board.cell_at((4, 4)), Some(CellView::Revealed(0)));
        let mines = board
            .cells()
            .indexed_iter()
            .filter(|&((row, col), _)| {
                board.field_at((row as Coord, col as Coord)) == Some(Field::Mine)
            })
            .count();
        assert_eq!(mines, 10);
    }

    #[test]
    fn reveal_hits_mine_and_sweeps_board() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.toggle_flag((2, 2));
        board.toggle_flag((1, 1));
        board.reveal((0, 2));

        let outcome = board.reveal((0, 0));

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert!(board.is_over());
        assert_eq!(board.state(), BoardState::Lost);
        assert_eq!(board.triggered_mine(), Some((0, 0)));
        assert_eq!(board.cell_at((0, 0)), Some(CellView::ExplodedMine));
        assert_eq!(board.cell_at((2, 2)), Some(CellView::Flagged));
        assert_eq!(board.cell_at((1, 1)), Some(CellView::MisflaggedMine));
        assert_eq!(board.cell_at((0, 2)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_at((1, 0)), Some(CellView::Hidden));
    }

    #[test]
    fn unflagged_mines_are_revealed_on_loss() {
        let mut board = board((1, 4), &[(0, 0), (0, 3)]);

        board.reveal((0, 3));

        assert_eq!(board.cell_at((0, 3)), Some(CellView::ExplodedMine));
        assert_eq!(board.cell_at((0, 0)), Some(CellView::RevealedMine));
        assert_eq!(count_cells(&board, |c| c == CellView::ExplodedMine), 1);
    }

    #[test]
    fn commands_after_loss_are_ignored() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.reveal((0, 0));
        let snapshot = board.clone();

        assert_eq!(board.reveal((1, 1)), RevealOutcome::NoChange);
        assert_eq!(board.toggle_flag((0, 1)), MarkOutcome::NoChange);
        assert_eq!(board.chord((1, 1)), RevealOutcome::NoChange);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn flood_fill_opens_blank_region_and_stops_at_numbers() {
        let mut board = board((3, 3), &[(2, 2)]);

        let outcome = board.reveal((0, 0));

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.cell_at((0, 0)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_at((1, 1)), Some(CellView::Revealed(1)));
        assert_eq!(board.cell_at((2, 2)), Some(CellView::Hidden));
        assert!(board.is_won());
        assert_eq!(board.state(), BoardState::Won);
    }

    #[test]
    fn flood_fill_skips_flags() {
        let mut board = board((1, 5), &[(0, 4)]);
        board.toggle_flag((0, 1));

        board.reveal((0, 0));

        assert_eq!(board.cell_at((0, 0)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_at((0, 1)), Some(CellView::Flagged));
        assert_eq!(board.cell_at((0, 2)), Some(CellView::Hidden));
    }

    #[test]
    fn flood_fill_handles_large_open_board() {
        let mut board = board((255, 255), &[(254, 254)]);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Won);
        assert_eq!(count_cells(&board, CellView::is_hidden), 1);
    }

    #[test]
    fn reveal_ignores_flags_revealed_cells_and_out_of_range() {
        let mut board = board((2, 3), &[(0, 0)]);
        board.toggle_flag((1, 2));

        assert_eq!(board.reveal((1, 2)), RevealOutcome::NoChange);
        assert_eq!(board.reveal((5, 0)), RevealOutcome::NoChange);
        assert!(board.first_move_pending());

        assert_eq!(board.reveal((0, 1)), RevealOutcome::Revealed);
        let snapshot = board.clone();
        assert_eq!(board.reveal((0, 1)), RevealOutcome::NoChange);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn toggle_flag_twice_restores_state() {
        let mut board = Board::new(Difficulty::Easy.config(), 9).unwrap();
        let snapshot = board.clone();

        assert_eq!(board.toggle_flag((3, 3)), MarkOutcome::Changed);
        assert_eq!(board.cell_at((3, 3)), Some(CellView::Flagged));
        assert_eq!(board.flags_placed(), 1);
        assert_eq!(board.mines_left(), 9);

        assert_eq!(board.toggle_flag((3, 3)), MarkOutcome::Changed);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn toggle_flag_ignores_revealed_and_out_of_range() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.reveal((1, 1));

        assert_eq!(board.toggle_flag((1, 1)), MarkOutcome::NoChange);
        assert_eq!(board.toggle_flag((2, 0)), MarkOutcome::NoChange);
        assert_eq!(board.flags_placed(), 0);
    }

    #[test]
    fn chord_reveals_hidden_neighbors_when_flags_match() {
        let mut board = board((3, 3), &[(1, 0), (1, 2)]);
        board.reveal((1, 1));
        board.toggle_flag((1, 0));
        board.toggle_flag((1, 2));

        let outcome = board.chord((1, 1));

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.cell_at((0, 1)), Some(CellView::Revealed(2)));
        assert_eq!(board.cell_at((2, 1)), Some(CellView::Revealed(2)));
        assert_eq!(board.cell_at((0, 0)), Some(CellView::Revealed(1)));
    }

    #[test]
    fn chord_with_mismatched_flags_changes_nothing() {
        let mut board = board((3, 3), &[(1, 0), (1, 2)]);
        board.reveal((1, 1));
        board.toggle_flag((1, 0));
        let snapshot = board.clone();

        assert_eq!(board.chord((1, 1)), RevealOutcome::NoChange);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn chord_on_blank_or_hidden_cell_is_ignored() {
        let mut board = board((1, 5), &[(0, 2)]);
        board.reveal((0, 0));
        let snapshot = board.clone();

        assert_eq!(board.cell_at((0, 0)), Some(CellView::Revealed(0)));
        assert_eq!(board.chord((0, 0)), RevealOutcome::NoChange);
        assert_eq!(board.chord((0, 4)), RevealOutcome::NoChange);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn chord_with_wrong_flag_explodes_and_keeps_opening() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.reveal((1, 1));
        board.toggle_flag((2, 2));

        let outcome = board.chord((1, 1));

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert!(board.is_over());
        assert_eq!(board.state(), BoardState::Lost);
        assert_eq!(board.cell_at((0, 0)), Some(CellView::ExplodedMine));
        assert_eq!(board.cell_at((2, 2)), Some(CellView::MisflaggedMine));
        // neighbors after the mine in scan order still open
        assert_eq!(board.cell_at((0, 1)), Some(CellView::Revealed(1)));
        assert_eq!(board.to_string(), "!1 \n11 \n  X\n");
        assert_eq!(count_cells(&board, |cell| cell == CellView::ExplodedMine), 1);
    }

    #[test]
    fn chord_after_explosion_leaves_other_mines_as_markers() {
        // two wrong flags: (0, 0) explodes first, (0, 2) is uncovered by the sweep
        let mut board = board((3, 3), &[(0, 0), (0, 2)]);
        board.reveal((1, 1));
        board.toggle_flag((2, 0));
        board.toggle_flag((2, 2));

        assert_eq!(board.chord((1, 1)), RevealOutcome::HitMine);

        assert_eq!(board.triggered_mine(), Some((0, 0)));
        assert_eq!(board.to_string(), "!2*\n121\nX X\n");
    }

    #[test]
    fn chord_floods_from_blank_neighbors() {
        let mut board = board((3, 5), &[(0, 0)]);
        board.reveal((1, 1));
        board.toggle_flag((0, 0));
        assert_eq!(board.cell_at((0, 4)), Some(CellView::Hidden));

        let outcome = board.chord((1, 1));

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.cell_at((0, 2)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_at((0, 4)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_at((2, 4)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_at((1, 0)), Some(CellView::Revealed(1)));
        assert!(board.is_won());
    }

    #[test]
    fn won_board_rejects_further_moves() {
        let mut board = board((1, 2), &[(0, 0)]);

        assert_eq!(board.reveal((0, 1)), RevealOutcome::Won);
        assert_eq!(board.reveal((0, 0)), RevealOutcome::NoChange);
        assert_eq!(board.toggle_flag((0, 0)), MarkOutcome::NoChange);
        assert!(!board.is_over());
        assert!(board.is_won());
    }

    #[test]
    fn display_uses_markers() {
        let mut board = board((2, 3), &[(0, 0)]);
        board.reveal((1, 2));
        board.toggle_flag((0, 0));

        assert_eq!(board.to_string(), "@1 \n#1 \n");
    }

    #[test]
    fn board_round_trips_through_json() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.reveal((2, 2));

        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, board);
    }
}
