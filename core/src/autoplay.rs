use serde::{Deserialize, Serialize};

use crate::*;

/// How an automated game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Won,
    Lost,
    /// The solver had nothing left to do, or its move changed nothing.
    Stuck,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub result: Option<GameResult>,
    pub steps: u32,
    pub safe_reveals: u32,
    pub flags: u32,
    pub guesses: u32,
}

/// The opening the automated player uses: reveal the center while mines are not placed yet.
pub fn opening_move(board: &Board) -> Option<Move> {
    board
        .first_move_pending()
        .then(|| Move::SafeReveal((board.rows() / 2, board.cols() / 2)))
}

/// Forwards `mv` to the matching board command, returns whether anything changed.
pub fn apply_move(board: &mut Board, mv: Move) -> bool {
    match mv {
        Move::SafeReveal(coords) | Move::Guess(coords) => board.reveal(coords).has_update(),
        Move::Flag(coords) => board.toggle_flag(coords).has_update(),
        Move::Stuck | Move::Win | Move::Lose => false,
    }
}

/// Drives a [`Solver`] against a board one step at a time, the way a timer-driven caller would.
#[derive(Clone, Debug)]
pub struct Autoplay {
    solver: Solver,
    report: GameReport,
}

impl Autoplay {
    pub fn new(seed: u64) -> Self {
        Self::with_solver(Solver::new(seed))
    }

    pub fn with_solver(solver: Solver) -> Self {
        Self {
            solver,
            report: GameReport::default(),
        }
    }

    pub fn report(&self) -> GameReport {
        self.report
    }

    /// One full cycle: decide, then mutate. Returns the move taken; a terminal move also settles the report.
    pub fn step(&mut self, board: &mut Board) -> Move {
        let mv = opening_move(board).unwrap_or_else(|| self.solver.propose_move(board));

        let result = match mv {
            Move::Win => Some(GameResult::Won),
            Move::Lose => Some(GameResult::Lost),
            Move::Stuck => Some(GameResult::Stuck),
            _ if !apply_move(board, mv) => {
                log::warn!("Move {:?} had no effect, giving up", mv);
                Some(GameResult::Stuck)
            }
            _ => None,
        };

        match mv {
            Move::SafeReveal(_) => self.report.safe_reveals += 1,
            Move::Flag(_) => self.report.flags += 1,
            Move::Guess(_) => self.report.guesses += 1,
            Move::Stuck | Move::Win | Move::Lose => {}
        }
        if !mv.is_terminal() {
            self.report.steps += 1;
        }
        if result.is_some() {
            self.report.result = result;
        }
        mv
    }

    /// Steps until the game is decided. Each step uncovers or flags at least one hidden cell, so this ends.
    pub fn play(mut self, board: &mut Board) -> GameReport {
        while self.report.result.is_none() {
            self.step(board);
        }
        log::debug!("Autoplay finished: {:?}", self.report);
        self.report
    }
}
