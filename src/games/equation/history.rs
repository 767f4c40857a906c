//! A player's finished results, keyed by puzzle.

use super::session::GameState;
use super::types::GameStatus;
use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// One finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameResultRecord {
    problem_id: i32,
    problem_date: NaiveDate,
    status: GameStatus,
    attempts: u32,
    duration_ms: i64,
}

impl GameResultRecord {
    /// Builds a record from a finished game.
    ///
    /// Returns `None` while the game is still being played.
    pub fn from_state(
        state: &GameState,
        problem_date: NaiveDate,
        duration_ms: i64,
    ) -> Option<Self> {
        state.status().is_terminal().then(|| Self {
            problem_id: state.problem_id(),
            problem_date,
            status: state.status(),
            attempts: state.attempts(),
            duration_ms,
        })
    }

    /// Fewer attempts wins; equal attempts compare on time.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.attempts < other.attempts
            || (self.attempts == other.attempts && self.duration_ms < other.duration_ms)
    }
}

/// What [`ResultHistory::record`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    /// First result for the puzzle.
    Inserted,
    /// Replaced a worse result.
    Improved,
    /// Existing result was at least as good.
    Kept,
}

/// Results per puzzle id, at most one each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultHistory {
    results: BTreeMap<i32, GameResultRecord>,
}

impl ResultHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a result unless a better one is already recorded.
    #[instrument(skip(self))]
    pub fn record(&mut self, result: GameResultRecord) -> RecordChange {
        match self.results.get(&result.problem_id) {
            None => {
                debug!(problem_id = result.problem_id, "Recording first result");
                self.results.insert(result.problem_id, result);
                RecordChange::Inserted
            }
            Some(existing) if result.is_better_than(existing) => {
                debug!(problem_id = result.problem_id, "Replacing with better result");
                self.results.insert(result.problem_id, result);
                RecordChange::Improved
            }
            Some(_) => RecordChange::Kept,
        }
    }

    /// Result for a puzzle, if played.
    pub fn get(&self, problem_id: i32) -> Option<&GameResultRecord> {
        self.results.get(&problem_id)
    }

    /// All results, ordered by puzzle id.
    pub fn iter(&self) -> impl Iterator<Item = &GameResultRecord> {
        self.results.values()
    }

    /// Number of puzzles played.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
