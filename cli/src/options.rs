use std::path::PathBuf;

use clap::{Args, ValueEnum};
use sweeper_core::*;
use sweeper_scores::DEFAULT_FILE;

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Board preset
    #[arg(short, long, value_enum, default_value_t = DifficultyArg::Easy)]
    pub difficulty: DifficultyArg,

    /// Custom number of rows, needs --cols and --mines too
    #[arg(long, requires_all = ["cols", "mines"], conflicts_with = "difficulty")]
    pub rows: Option<Coord>,

    #[arg(long, requires_all = ["rows", "mines"])]
    pub cols: Option<Coord>,

    #[arg(long, requires_all = ["rows", "cols"])]
    pub mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl BoardArgs {
    pub fn game_config(&self) -> Result<GameConfig> {
        match (self.rows, self.cols, self.mines) {
            (Some(rows), Some(cols), Some(mines)) => GameConfig::new((rows, cols), mines),
            _ => Ok(Difficulty::from(self.difficulty).config()),
        }
    }

    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[derive(Args, Debug)]
pub struct ScoreFileArgs {
    /// Where the best times are kept
    #[arg(long = "scores", default_value = DEFAULT_FILE)]
    pub path: PathBuf,
}
