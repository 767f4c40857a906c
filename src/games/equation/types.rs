//! Core domain types for the daily equation puzzle.

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Number of characters in every equation.
pub const EQUATION_LENGTH: usize = 6;

/// Maximum number of accepted guesses per puzzle.
pub const MAX_ATTEMPTS: u32 = 6;

/// Operator characters allowed in an equation.
pub const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

/// Returns true for one of `+ - * /`.
pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

/// Returns true for a character an equation may contain.
pub fn is_equation_char(c: char) -> bool {
    c.is_ascii_digit() || is_operator(c)
}

/// How a guessed character relates to the secret equation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FeedbackStatus {
    /// Right character, right position.
    Correct,
    /// Character appears elsewhere in the secret.
    WrongPosition,
    /// Character has no unclaimed occurrence in the secret.
    NotUsed,
    /// Placeholder for a board cell that has not been played.
    Empty,
}

/// Feedback for a single guessed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct CellFeedback {
    /// The guessed character.
    #[serde(rename = "char")]
    pub ch: char,
    /// Its status against the secret.
    pub status: FeedbackStatus,
}

impl CellFeedback {
    /// An unfilled board cell.
    pub fn empty() -> Self {
        Self {
            ch: ' ',
            status: FeedbackStatus::Empty,
        }
    }
}

/// A day's puzzle: the secret expression and its published target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct Puzzle {
    id: i32,
    expression: String,
    answer: f64,
    date: NaiveDate,
}

/// Result of a successful generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct GeneratedExpression {
    expression: String,
    answer: f64,
}

/// Status of a single player's game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Guesses are still accepted.
    Playing,
    /// A guess matched the secret exactly.
    Won,
    /// All attempts used without a match.
    Lost,
}

impl GameStatus {
    /// Won and lost accept no further guesses.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Playing)
    }
}
