//! Persistence for daily problems and leaderboard entries.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{
    LeaderboardEntry, LeaderboardRow, NewLeaderboardEntry, NewProblem, Problem, PublishedProblem,
    UserStats, compute_score,
};
pub use repository::{MIGRATIONS, PuzzleRepository};
