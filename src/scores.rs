//! Ranked table of finished games, persisted as pretty JSON.
//!
//! The file layout is `{"scores": [{"score", "date", "highest_tile"}, ...]}`.
//! Older files holding only the bare list are still accepted on load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{GameResult, Score, Tile};

/// Number of results kept in the table.
pub const MAX_ENTRIES: usize = 10;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: Score,
    pub date: String,
    pub highest_tile: Tile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    pub scores: Vec<ScoreEntry>,
}

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed high score file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScores {
    Table(HighScores),
    Legacy(Vec<ScoreEntry>),
}

impl From<StoredScores> for HighScores {
    fn from(stored: StoredScores) -> Self {
        match stored {
            StoredScores::Table(table) => table,
            StoredScores::Legacy(scores) => HighScores { scores },
        }
    }
}

impl HighScores {
    pub fn new() -> Self {
        Self { scores: Vec::new() }
    }

    /// Entries, best first.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.scores
    }

    pub fn best(&self) -> Option<&ScoreEntry> {
        self.scores.first()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// True if `score` would earn a place in the table.
    pub fn is_new_high_score(&self, score: Score) -> bool {
        if self.scores.len() < MAX_ENTRIES {
            return true;
        }
        score > self.scores.last().map_or(0, |entry| entry.score)
    }

    /// 1-based rank `score` would take; equal scores share the better rank.
    pub fn rank_of(&self, score: Score) -> usize {
        self.scores.iter().filter(|entry| entry.score > score).count() + 1
    }

    /// Insert a finished game and trim the table.
    ///
    /// Returns the 1-based rank of the new entry, or `None` if it did not
    /// make the cut. Among equal scores the older entry stays ahead.
    pub fn record(&mut self, result: GameResult, when: NaiveDateTime) -> Option<usize> {
        self.scores.push(ScoreEntry {
            score: result.score,
            date: when.format(DATE_FORMAT).to_string(),
            highest_tile: result.highest_tile,
        });
        let inserted = self.scores.len() - 1;
        // stable: ties keep insertion order
        let mut order: Vec<usize> = (0..self.scores.len()).collect();
        order.sort_by(|&a, &b| self.scores[b].score.cmp(&self.scores[a].score));
        let rank = order.iter().position(|&idx| idx == inserted).map(|pos| pos + 1);

        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.scores.truncate(MAX_ENTRIES);
        rank.filter(|&r| r <= MAX_ENTRIES)
    }

    /// Parse a stored table. Files may be hand-edited or come from an older
    /// version, so entries are re-sorted (stable) and trimmed to the top ten.
    pub fn from_json_str(data: &str) -> Result<Self, ScoreError> {
        let stored: StoredScores = serde_json::from_str(data)?;
        let mut table: HighScores = stored.into();
        table.scores.sort_by(|a, b| b.score.cmp(&a.score));
        table.scores.truncate(MAX_ENTRIES);
        Ok(table)
    }

    pub fn to_json_string(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A high score table backed by one JSON file.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the table. A missing file is an empty table, not an error.
    pub fn load(&self) -> Result<HighScores, ScoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HighScores::new()),
            Err(e) => return Err(e.into()),
        };
        HighScores::from_json_str(&data)
    }

    /// Like `load`, but any failure yields an empty table and a warning.
    pub fn load_or_default(&self) -> HighScores {
        match self.load() {
            Ok(scores) => {
                info!("loaded {} high scores from {}", scores.scores.len(), self.path.display());
                scores
            }
            Err(e) => {
                warn!("ignoring high scores in {}: {e}", self.path.display());
                HighScores::new()
            }
        }
    }

    pub fn save(&self, scores: &HighScores) -> Result<(), ScoreError> {
        let data = scores.to_json_string()?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::{tempdir, NamedTempFile};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap().and_hms_opt(12, 30, 5).unwrap()
    }

    fn result(score: Score, highest_tile: Tile) -> GameResult {
        GameResult { score, highest_tile }
    }

    #[test]
    fn record_keeps_descending_order() {
        let mut table = HighScores::new();
        assert_eq!(table.record(result(300, 32), at(1)), Some(1));
        assert_eq!(table.record(result(900, 64), at(2)), Some(1));
        assert_eq!(table.record(result(500, 32), at(3)), Some(2));

        let scores: Vec<Score> = table.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![900, 500, 300]);
        assert_eq!(table.best().unwrap().highest_tile, 64);
        assert_eq!(table.entries()[0].date, "2024-03-02 12:30:05");
    }

    #[test]
    fn record_truncates_to_ten() {
        let mut table = HighScores::new();
        for i in 1..=10 {
            table.record(result(i * 100, 16), at(1));
        }
        assert_eq!(table.entries().len(), MAX_ENTRIES);
        assert_eq!(table.record(result(50, 4), at(2)), None);
        assert_eq!(table.entries().len(), MAX_ENTRIES);
        assert_eq!(table.entries().last().unwrap().score, 100);

        assert_eq!(table.record(result(550, 64), at(3)), Some(6));
        assert_eq!(table.entries().len(), MAX_ENTRIES);
        assert_eq!(table.entries().last().unwrap().score, 200);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut table = HighScores::new();
        table.record(result(400, 32), at(1));
        assert_eq!(table.record(result(400, 64), at(2)), Some(2));
        assert_eq!(table.entries()[0].highest_tile, 32);
        assert_eq!(table.entries()[1].highest_tile, 64);
    }

    #[test]
    fn new_high_score_threshold() {
        let mut table = HighScores::new();
        assert!(table.is_new_high_score(0));
        for i in 1..=10 {
            table.record(result(i * 10, 8), at(1));
        }
        assert!(!table.is_new_high_score(10));
        assert!(!table.is_new_high_score(5));
        assert!(table.is_new_high_score(11));
    }

    #[test]
    fn rank_of_shares_ties() {
        let mut table = HighScores::new();
        assert_eq!(table.rank_of(123), 1);
        table.record(result(500, 32), at(1));
        table.record(result(300, 32), at(1));
        assert_eq!(table.rank_of(600), 1);
        assert_eq!(table.rank_of(500), 1);
        assert_eq!(table.rank_of(400), 2);
        assert_eq!(table.rank_of(100), 3);
    }

    #[test]
    fn round_trip_file() {
        let mut table = HighScores::new();
        table.record(result(2048, 256), at(4));
        table.record(result(1024, 128), at(5));

        let tmp = NamedTempFile::new().unwrap();
        let store = ScoreStore::new(tmp.path());
        store.save(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);

        let raw = fs::read_to_string(tmp.path()).unwrap();
        assert!(raw.contains("\"highest_tile\": 256"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = ScoreStore::new(dir.path().join("scores.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn legacy_bare_list_loads() {
        let data = r#"[{"score": 12, "date": "2023-01-01 00:00:00", "highest_tile": 8}]"#;
        let table = HighScores::from_json_str(data).unwrap();
        assert_eq!(table.entries().len(), 1);
        assert_eq!(table.entries()[0].score, 12);
    }

    #[test]
    fn unsorted_list_is_ranked_and_trimmed_on_load() {
        let entries: Vec<String> = (1..=11)
            .map(|i| format!(r#"{{"score": {}, "date": "2023-01-{:02} 00:00:00", "highest_tile": 64}}"#, i * 100, i))
            .collect();
        let data = format!("[{}]", entries.join(","));

        let tmp = NamedTempFile::new().unwrap();
        fs::write(tmp.path(), data).unwrap();
        let table = ScoreStore::new(tmp.path()).load().unwrap();

        assert_eq!(table.entries().len(), MAX_ENTRIES);
        assert_eq!(table.best().unwrap().score, 1100);
        assert_eq!(table.entries().last().unwrap().score, 200);
        assert!(!table.is_new_high_score(200));
        assert!(table.is_new_high_score(500));
        assert_eq!(table.rank_of(500), 7);
    }

    #[test]
    fn load_keeps_file_order_among_ties() {
        let data = r#"{"scores": [
            {"score": 10, "date": "2023-01-01 00:00:00", "highest_tile": 4},
            {"score": 40, "date": "2023-01-02 00:00:00", "highest_tile": 16},
            {"score": 40, "date": "2023-01-03 00:00:00", "highest_tile": 32}
        ]}"#;
        let table = HighScores::from_json_str(data).unwrap();
        let tiles: Vec<Tile> = table.entries().iter().map(|e| e.highest_tile).collect();
        assert_eq!(tiles, vec![16, 32, 4]);
    }

    #[test]
    fn corrupt_file_is_error_but_default_recovers() {
        let tmp = NamedTempFile::new().unwrap();
        fs::write(tmp.path(), "{ not json").unwrap();
        let store = ScoreStore::new(tmp.path());
        assert!(matches!(store.load(), Err(ScoreError::Json(_))));
        assert!(store.load_or_default().is_empty());
    }
}
