//! Strictly Mathle library - the daily equation puzzle
//!
//! Players guess a six-character arithmetic equation that evaluates to the
//! day's target and get Wordle-style feedback per character.
//!
//! # Architecture
//!
//! - **Engine**: evaluation, validation, generation and feedback scoring
//! - **Session**: per-player [`GameState`] and [`ResultHistory`]
//! - **Storage**: [`PuzzleRepository`] over sqlite
//! - **Service**: [`PuzzleService`] for daily problems and leaderboards
//!
//! # Example
//!
//! ```
//! use strictly_mathle::{FeedbackStatus, evaluate, get_feedback, is_valid_equation};
//!
//! assert_eq!(evaluate("12/4+2"), Some(5.0));
//! assert!(is_valid_equation("12/4+2", Some(5.0)));
//!
//! let feedback = get_feedback("12+3*4", "21+3*4");
//! assert_eq!(feedback[0].status, FeedbackStatus::WrongPosition);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod games;
mod puzzle_service;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DATABASE_PATH_ENV};

// Crate-level exports - Database
pub use db::{
    DbError, DbErrorKind, LeaderboardEntry, LeaderboardRow, MIGRATIONS, NewLeaderboardEntry,
    NewProblem, Problem, PublishedProblem, PuzzleRepository, UserStats, compute_score,
};

// Crate-level exports - Service layer
pub use puzzle_service::{PuzzleService, RECENT_PROBLEMS, ServiceError};

// Crate-level exports - Equation engine
pub use games::equation::{
    ANONYMOUS_USER_ID, CellFeedback, EQUATION_LENGTH, EvalError, FeedbackStatus, GameResultRecord,
    GameState, GameStatus, GeneratedExpression, GenerationError, GuessError, GuessOutcome,
    Identity, MAX_ATTEMPTS, MAX_GENERATION_ATTEMPTS, OPERATORS, Puzzle, RecordChange,
    ResultHistory, ValidationError, check_equation, evaluate, generate_expression,
    generate_expression_with, get_feedback, is_equation_char, is_operator, is_valid_equation,
    round_to, try_evaluate,
};
