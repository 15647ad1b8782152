use serde::{Deserialize, Serialize};

/// Bytes reserved for the name, including the terminating NUL.
pub const NAME_LEN: usize = 20;

/// Name followed by a little-endian `i32` time.
pub const RECORD_SIZE: usize = NAME_LEN + 4;

/// How many records the table keeps.
pub const MAX_SCORES: usize = 5;

pub const DEFAULT_FILE: &str = "scoreboard.dat";

/// One finished game: who won and how many seconds it took.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub time: u32,
}

impl ScoreRecord {
    /// Cuts `name` down to what fits in a record, so that storing and loading gives back the same value.
    pub fn new(name: &str, time: u32) -> Self {
        Self {
            name: fit_name(name).to_owned(),
            time,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0; RECORD_SIZE];
        let name = fit_name(&self.name).as_bytes();
        bytes[..name.len()].copy_from_slice(name);

        let time = i32::try_from(self.time).unwrap_or(i32::MAX);
        bytes[NAME_LEN..].copy_from_slice(&time.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let (name, time) = bytes.split_at(NAME_LEN);
        let name_end = name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);

        let mut time_bytes = [0; 4];
        time_bytes.copy_from_slice(time);
        let time = i32::from_le_bytes(time_bytes);
        if time < 0 {
            log::warn!("Negative time {} in score record, reading it as 0", time);
        }

        Self {
            name: String::from_utf8_lossy(&name[..name_end]).into_owned(),
            time: u32::try_from(time).unwrap_or(0),
        }
    }
}

/// Longest prefix of `name` that fits in [`NAME_LEN`] bytes with its NUL, ending on a char boundary.
fn fit_name(name: &str) -> &str {
    let name = name.split('\0').next().unwrap_or_default();
    let mut end = name.len().min(NAME_LEN - 1);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

pub fn encode_records(records: &[ScoreRecord]) -> Vec<u8> {
    records.iter().flat_map(ScoreRecord::encode).collect()
}

/// Decodes every complete record in `bytes`; a truncated tail is dropped.
pub fn decode_records(bytes: &[u8]) -> Vec<ScoreRecord> {
    let chunks = bytes.chunks_exact(RECORD_SIZE);
    if !chunks.remainder().is_empty() {
        log::warn!(
            "Ignoring {} trailing bytes after the last score record",
            chunks.remainder().len()
        );
    }

    chunks
        .filter_map(|chunk| <&[u8; RECORD_SIZE]>::try_from(chunk).ok())
        .map(ScoreRecord::decode)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_layout() {
        let bytes = ScoreRecord::new("ada", 42).encode();

        assert_eq!(&bytes[..4], b"ada\0");
        assert!(bytes[3..NAME_LEN].iter().all(|&b| b == 0));
        assert_eq!(&bytes[NAME_LEN..], &42i32.to_le_bytes());
    }

    #[test]
    fn long_names_keep_nineteen_bytes() {
        let record = ScoreRecord::new("abcdefghijklmnopqrstuvwxyz", 1);

        assert_eq!(record.name, "abcdefghijklmnopqrs");
        assert_eq!(record.encode()[NAME_LEN - 1], 0);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // nine two-byte chars fill 18 bytes, the tenth would cross the limit
        let record = ScoreRecord::new("éééééééééé", 7);

        assert_eq!(record.name, "ééééééééé");
        assert_eq!(ScoreRecord::decode(&record.encode()), record);
    }

    #[test]
    fn negative_times_read_as_zero() {
        let mut bytes = ScoreRecord::new("bob", 0).encode();
        bytes[NAME_LEN..].copy_from_slice(&(-5i32).to_le_bytes());

        assert_eq!(ScoreRecord::decode(&bytes).time, 0);
    }

    #[test]
    fn huge_times_saturate() {
        let bytes = ScoreRecord::new("eve", u32::MAX).encode();

        assert_eq!(ScoreRecord::decode(&bytes).time, i32::MAX as u32);
    }

    #[test]
    fn partial_trailing_record_is_dropped() {
        let records = vec![ScoreRecord::new("a", 3), ScoreRecord::new("b", 9)];
        let mut bytes = encode_records(&records);
        bytes.extend_from_slice(&[1, 2, 3]);

        assert_eq!(decode_records(&bytes), records);
        assert_eq!(decode_records(&bytes[..RECORD_SIZE - 1]), vec![]);
    }

    #[test]
    fn records_serialize_to_json() {
        let json = serde_json::to_string(&ScoreRecord::new("ada", 12)).unwrap();

        assert_eq!(json, r#"{"name":"ada","time":12}"#);
    }
}
