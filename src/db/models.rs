//! Database models and leaderboard aggregates.

use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use tracing::instrument;

use crate::db::schema;
use crate::games::equation::Puzzle;

/// A day's problem as stored.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::problems)]
pub struct Problem {
    id: i32,
    expression: String,
    answer: f64,
    date: NaiveDate,
    created_at: NaiveDateTime,
}

impl Problem {
    /// Converts into the engine's read-only puzzle view.
    pub fn to_puzzle(&self) -> Puzzle {
        Puzzle::new(self.id, self.expression.clone(), self.answer, self.date)
    }

    /// Public view as of `today`: the expression is withheld until the
    /// problem's day has passed.
    pub fn published(&self, today: NaiveDate) -> PublishedProblem {
        let expression = (self.date < today).then(|| self.expression.clone());
        PublishedProblem::new(self.id, self.date, self.answer, expression)
    }
}

/// A problem as shown to players, without an unsolved secret.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, new)]
pub struct PublishedProblem {
    id: i32,
    date: NaiveDate,
    answer: f64,
    expression: Option<String>,
}

/// Insertable problem for a date that has none yet.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::problems)]
pub struct NewProblem {
    expression: String,
    answer: f64,
    date: NaiveDate,
}

/// A user's best recorded result for one problem.
#[derive(
    Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::leaderboard_entries)]
#[diesel(belongs_to(Problem))]
pub struct LeaderboardEntry {
    id: i32,
    user_id: String,
    user_name: String,
    problem_id: i32,
    score: i32,
    attempts: i32,
    duration_ms: i64,
    created_at: NaiveDateTime,
}

/// Insertable leaderboard entry.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::leaderboard_entries)]
pub struct NewLeaderboardEntry {
    user_id: String,
    user_name: String,
    problem_id: i32,
    score: i32,
    attempts: i32,
    duration_ms: i64,
}

impl NewLeaderboardEntry {
    /// Builds an entry, deriving the score from attempts and duration.
    #[instrument(skip(user_id, user_name))]
    pub fn scored(
        user_id: String,
        user_name: String,
        problem_id: i32,
        attempts: i32,
        duration_ms: i64,
    ) -> Self {
        Self {
            score: compute_score(attempts, duration_ms),
            user_id,
            user_name,
            problem_id,
            attempts,
            duration_ms,
        }
    }
}

/// `attempts * 100 + whole seconds`; lower is better.
pub fn compute_score(attempts: i32, duration_ms: i64) -> i32 {
    let seconds = duration_ms.max(0) / 1000;
    let score = i64::from(attempts) * 100 + seconds;
    i32::try_from(score).unwrap_or(i32::MAX)
}

/// One user's line on the global leaderboard.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, new)]
pub struct LeaderboardRow {
    user_id: String,
    user_name: String,
    total_score: i64,
    games_played: i32,
    best_score: i32,
    average_score: f64,
}

/// Summary of one user's recorded games.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, new)]
pub struct UserStats {
    games_played: i32,
    average_score: f64,
    best_score: i32,
    average_attempts: f64,
    recent_games: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_formula() {
        assert_eq!(compute_score(2, 5000), 205);
        assert_eq!(compute_score(3, 59_999), 359);
        assert_eq!(compute_score(1, 0), 100);
    }

    #[test]
    fn test_negative_duration_clamped() {
        assert_eq!(compute_score(4, -10_000), 400);
    }

    fn problem_on(day: u32) -> Problem {
        let date = NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        Problem {
            id: 1,
            expression: "2-9+29".to_string(),
            answer: 22.0,
            date,
            created_at: date.and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_published_hides_current_and_future_expressions() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        assert_eq!(problem_on(18).published(today).expression(), &None);
        assert_eq!(problem_on(19).published(today).expression(), &None);
        assert_eq!(
            problem_on(17).published(today).expression().as_deref(),
            Some("2-9+29")
        );
        assert_eq!(*problem_on(18).published(today).answer(), 22.0);
    }

    #[test]
    fn test_scored_entry() {
        let entry = NewLeaderboardEntry::scored("u1".into(), "Ann".into(), 3, 2, 5000);
        assert_eq!(*entry.score(), 205);
        assert_eq!(*entry.problem_id(), 3);
    }
}
