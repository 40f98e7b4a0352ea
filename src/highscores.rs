//! Leaderboard of best runs
//!
//! Persisted as JSON, keeps the top 5 runs ranked by credits, then score.

use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of entries to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Failure reading or writing the leaderboard file
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("leaderboard io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("leaderboard is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Distance score
    pub score: u64,
    /// Primary credits held at the end of the run
    #[serde(default)]
    pub credits: u32,
    /// Short display date, e.g. "17 Jan"
    pub date: String,
}

impl ScoreEntry {
    pub fn new(score: u64, credits: u32, date: impl Into<String>) -> Self {
        Self {
            score,
            credits,
            date: date.into(),
        }
    }

    /// Entry stamped with today's local date
    pub fn today(score: u64, credits: u32) -> Self {
        Self::new(score, credits, format_date(chrono::Local::now().date_naive()))
    }

    /// Leaderboard order: credits descending, then score descending
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .credits
            .cmp(&self.credits)
            .then_with(|| other.score.cmp(&self.score))
    }
}

/// Format a date the way the leaderboard shows it
pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

/// Top-N leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Leaderboard shown on first launch
    pub fn with_defaults() -> Self {
        Self {
            entries: vec![
                ScoreEntry::new(211, 20, "17 Jan"),
                ScoreEntry::new(180, 12, "16 Jan"),
                ScoreEntry::new(125, 8, "15 Jan"),
            ],
        }
    }

    /// Insert an entry, keeping the board sorted and trimmed.
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn record(&mut self, entry: ScoreEntry) -> Option<usize> {
        // Ties go after existing entries
        let pos = self
            .entries
            .iter()
            .position(|e| entry.rank_cmp(e) == Ordering::Less)
            .unwrap_or(self.entries.len());

        if pos >= MAX_HIGH_SCORES {
            return None;
        }

        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score of the top-ranked entry
    pub fn best_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Restore ordering and size after loading foreign data
    fn normalize(&mut self) {
        self.entries.sort_by(ScoreEntry::rank_cmp);
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path)?;
        // Older files store a bare array of entries
        let mut board = match serde_json::from_str::<Leaderboard>(&json) {
            Ok(board) => board,
            Err(_) => Leaderboard {
                entries: serde_json::from_str(&json)?,
            },
        };
        board.normalize();
        log::info!("Loaded {} leaderboard entries", board.entries.len());
        Ok(board)
    }

    /// Load the leaderboard, seeding defaults when the file is missing or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(board) => board,
            Err(PersistError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No leaderboard found, starting with defaults");
                Self::with_defaults()
            }
            Err(e) => {
                log::warn!("Leaderboard unreadable ({e}), starting with defaults");
                Self::with_defaults()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}
