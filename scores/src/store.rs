use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::*;

/// The score table persisted at one path. Every call reads the file afresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreStore {
    path: PathBuf,
}

impl Default for ScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_FILE)
    }
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the table, a missing file is an empty table.
    pub fn try_load(&self) -> Result<ScoreBoard> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No score file at {:?} yet", self.path);
                return Ok(ScoreBoard::default());
            }
            Err(source) => {
                return Err(ScoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(ScoreBoard::from_records(decode_records(&bytes), MAX_SCORES))
    }

    /// Like [`ScoreStore::try_load`], but an unreadable file is logged and treated as empty.
    pub fn load_board(&self) -> ScoreBoard {
        self.try_load().unwrap_or_else(|err| {
            log::warn!("{err}, starting from an empty score table");
            ScoreBoard::default()
        })
    }

    /// Up to `max` records, fastest first.
    pub fn load(&self, max: usize) -> Vec<ScoreRecord> {
        let mut records = self.load_board().into_records();
        records.truncate(max);
        records
    }

    pub fn save(&self, board: &ScoreBoard) -> Result<()> {
        fs::write(&self.path, encode_records(board.records())).map_err(|source| {
            ScoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Records a won game and rewrites the file with the best [`MAX_SCORES`] times.
    ///
    /// Returns the new record's zero-based rank, `None` when it was too slow to be kept.
    pub fn add_score(&self, name: &str, time: u32) -> Result<Option<usize>> {
        let mut board = self.load_board();
        let rank = board.insert(ScoreRecord::new(name, time));
        self.save(&board)?;

        log::debug!("Stored {}s for {:?} at rank {:?}", time, name, rank);
        Ok(rank)
    }
}
