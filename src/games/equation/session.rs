//! Per-player game state for one puzzle.
//!
//! State is an explicit value: each submission borrows the current state
//! and returns the next one. A rejected guess leaves the caller's state
//! untouched.

use super::rules::{ValidationError, check_equation, get_feedback};
use super::types::{CellFeedback, EQUATION_LENGTH, GameStatus, MAX_ATTEMPTS, Puzzle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// User id reported for players without an identity.
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// Who is playing, as supplied by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user id, or [`ANONYMOUS_USER_ID`].
    pub user_id: String,
    /// Display name.
    pub user_name: String,
}

impl Identity {
    /// Creates an identity for a known user.
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    /// A player with no identity.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER_ID, "Anonymous")
    }

    /// True for the anonymous sentinel or a blank id.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_empty() || self.user_id == ANONYMOUS_USER_ID
    }
}

/// Why a submission was not applied.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::From)]
pub enum GuessError {
    /// The game already ended.
    #[display("Game is already over")]
    GameOver,

    /// The puzzle is not the one this game was started for.
    #[display("Guess is for puzzle {} but this game is puzzle {}", got, expected)]
    WrongPuzzle {
        /// Puzzle id the game belongs to.
        expected: i32,
        /// Puzzle id that was supplied.
        got: i32,
    },

    /// The guess broke a rule; no attempt was consumed.
    #[display("Invalid equation: {}", _0)]
    #[from]
    Invalid(ValidationError),
}

impl std::error::Error for GuessError {}

/// A player's progress on one puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    problem_id: i32,
    target: f64,
    guesses: Vec<String>,
    feedbacks: Vec<Vec<CellFeedback>>,
    attempts: u32,
    status: GameStatus,
    started_at: DateTime<Utc>,
}

/// The result of an accepted guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessOutcome {
    /// State after the guess.
    pub state: GameState,
    /// Feedback row for the guess.
    pub feedback: Vec<CellFeedback>,
    /// The secret, revealed once the game is over.
    pub correct_answer: Option<String>,
    /// Milliseconds from start to the winning guess.
    pub duration_ms: Option<i64>,
}

impl GameState {
    /// Starts a fresh game for a puzzle.
    #[instrument]
    pub fn new(problem_id: i32, target: f64, started_at: DateTime<Utc>) -> Self {
        Self {
            problem_id,
            target,
            guesses: Vec::new(),
            feedbacks: Vec::new(),
            attempts: 0,
            status: GameStatus::Playing,
            started_at,
        }
    }

    /// Starts a fresh game for a puzzle, now.
    pub fn for_puzzle(puzzle: &Puzzle) -> Self {
        Self::new(*puzzle.id(), *puzzle.answer(), Utc::now())
    }

    /// Puzzle this game belongs to.
    pub fn problem_id(&self) -> i32 {
        self.problem_id
    }

    /// Value every guess must evaluate to.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Accepted guesses, oldest first.
    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    /// Feedback rows, index-aligned with [`Self::guesses`].
    pub fn feedbacks(&self) -> &[Vec<CellFeedback>] {
        &self.feedbacks
    }

    /// Accepted guesses so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// When the game started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Attempts still available.
    pub fn remaining_attempts(&self) -> u32 {
        MAX_ATTEMPTS.saturating_sub(self.attempts)
    }

    /// Milliseconds elapsed between the start and `now`.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_milliseconds().max(0)
    }

    /// Submits a guess against the puzzle.
    ///
    /// # Errors
    ///
    /// - [`GuessError::GameOver`] if the game already ended.
    /// - [`GuessError::WrongPuzzle`] if `puzzle` is not this game's puzzle.
    /// - [`GuessError::Invalid`] if the guess fails validation against the
    ///   game's target.
    #[instrument(
        skip(self, puzzle),
        fields(problem_id = self.problem_id, attempts = self.attempts)
    )]
    pub fn submit_guess(
        &self,
        puzzle: &Puzzle,
        guess: &str,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, GuessError> {
        if self.status.is_terminal() {
            warn!(status = %self.status, "Guess submitted after game end");
            return Err(GuessError::GameOver);
        }

        if *puzzle.id() != self.problem_id {
            warn!(got = puzzle.id(), "Guess submitted with another day's puzzle");
            return Err(GuessError::WrongPuzzle {
                expected: self.problem_id,
                got: *puzzle.id(),
            });
        }

        check_equation(guess, Some(self.target))?;

        let feedback = get_feedback(guess, puzzle.expression());

        let mut next = self.clone();
        next.guesses.push(guess.to_string());
        next.feedbacks.push(feedback.clone());
        next.attempts += 1;

        if guess == puzzle.expression() {
            next.status = GameStatus::Won;
        } else if next.attempts >= MAX_ATTEMPTS {
            next.status = GameStatus::Lost;
        }

        let correct_answer = next
            .status
            .is_terminal()
            .then(|| puzzle.expression().clone());
        let duration_ms = (next.status == GameStatus::Won).then(|| next.elapsed_ms(now));

        info!(
            guess,
            attempts = next.attempts,
            status = %next.status,
            "Guess accepted"
        );

        Ok(GuessOutcome {
            state: next,
            feedback,
            correct_answer,
            duration_ms,
        })
    }

    /// Renders all six board rows; unplayed rows are empty cells.
    pub fn board(&self) -> Vec<Vec<CellFeedback>> {
        let mut rows = self.feedbacks.clone();
        rows.resize(MAX_ATTEMPTS as usize, vec![CellFeedback::empty(); EQUATION_LENGTH]);
        rows
    }
}
