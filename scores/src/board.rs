use std::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

/// Fastest times first, at most `capacity` entries. Equal times keep the order they were added in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    records: Vec<ScoreRecord>,
    capacity: usize,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new(MAX_SCORES)
    }
}

impl ScoreBoard {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Sorts `records` by time and keeps the best `capacity` of them.
    pub fn from_records(mut records: Vec<ScoreRecord>, capacity: usize) -> Self {
        records.sort_by_key(|record| record.time);
        records.truncate(capacity);
        Self { records, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ScoreRecord> {
        self.records
    }

    pub fn best(&self) -> Option<&ScoreRecord> {
        self.records.first()
    }

    /// Rank a new `time` would get, behind every record with an equal or better time.
    fn rank_of(&self, time: u32) -> usize {
        self.records.partition_point(|record| record.time <= time)
    }

    /// Whether a game finished in `time` seconds would make it onto the board.
    pub fn qualifies(&self, time: u32) -> bool {
        self.rank_of(time) < self.capacity
    }

    /// Adds `record` in order and drops whatever falls past the capacity.
    ///
    /// Returns the zero-based rank of the new record, `None` when it did not make the cut.
    pub fn insert(&mut self, record: ScoreRecord) -> Option<usize> {
        let rank = self.rank_of(record.time);
        if rank >= self.capacity {
            log::debug!(
                "Time {}s by {:?} does not make the top {}",
                record.time,
                record.name,
                self.capacity
            );
            return None;
        }

        self.records.insert(rank, record);
        self.records.truncate(self.capacity);
        Some(rank)
    }
}

impl fmt::Display for ScoreBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return writeln!(f, "No scores yet.");
        }

        writeln!(f, "Rank\tPlayer\t\tTime (s)")?;
        for (rank, record) in self.records.iter().enumerate() {
            writeln!(f, "{}\t{:<15}\t{}", rank + 1, record.name, record.time)?;
        }
        Ok(())
    }
}
