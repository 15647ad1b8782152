use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use sweeper_core::*;
use sweeper_scores::ScoreStore;

/// Plays one game, calling `on_step` after every move and sleeping `interval` between moves.
pub fn play_paced(
    board: &mut Board,
    seed: u64,
    interval: Duration,
    mut on_step: impl FnMut(Move, &Board),
) -> GameReport {
    let mut autoplay = Autoplay::new(seed);
    loop {
        let mv = autoplay.step(board);
        on_step(mv, board);

        if autoplay.report().result.is_some() {
            return autoplay.report();
        }
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
}

/// Saves a won game's time, failures only get logged.
pub fn record_win(store: &ScoreStore, name: &str, time: u32) -> Option<usize> {
    match store.add_score(name, time) {
        Ok(rank) => rank,
        Err(err) => {
            log::error!("Could not save score: {:?}", err);
            None
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub games: u32,
    pub won: u32,
    pub lost: u32,
    pub stuck: u32,
    pub guesses: u32,
}

impl BatchSummary {
    pub fn record(&mut self, report: &GameReport) {
        self.games += 1;
        self.guesses += report.guesses;
        match report.result {
            Some(GameResult::Won) => self.won += 1,
            Some(GameResult::Lost) => self.lost += 1,
            Some(GameResult::Stuck) | None => self.stuck += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            f64::from(self.won) / f64::from(self.games)
        }
    }
}

/// Plays `games` boards headless; game `i` uses `base_seed + i` for both mines and guesses.
pub fn run_batch(config: GameConfig, games: u32, base_seed: u64) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for i in 0..games {
        let seed = base_seed.wrapping_add(i.into());
        let mut board =
            Board::new(config, seed).with_context(|| format!("Could not create board {i}"))?;

        let report = Autoplay::new(seed).play(&mut board);
        log::debug!("Game {} (seed {}): {:?}", i, seed, report.result);
        summary.record(&report);
    }
    Ok(summary)
}
