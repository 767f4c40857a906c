//! Daily puzzle and leaderboard business logic.

use chrono::{NaiveDate, Utc};
use derive_more::{Display, Error, From};
use tracing::{debug, info, instrument, warn};

use crate::{
    DbError, GameState, GameStatus, GenerationError, Identity, LeaderboardEntry, LeaderboardRow,
    NewLeaderboardEntry, NewProblem, Problem, PublishedProblem, PuzzleRepository, UserStats,
    generate_expression,
};

/// Number of problems returned by [`PuzzleService::recent_problems`].
pub const RECENT_PROBLEMS: i64 = 30;

/// Failure in a service operation.
#[derive(Debug, Clone, Display, Error, From)]
pub enum ServiceError {
    /// Storage failed.
    #[display("{}", _0)]
    Db(DbError),

    /// No problem could be generated for the day.
    #[display("Failed to generate a valid problem for {}: {}", date, source)]
    #[from(ignore)]
    Generation {
        /// Day being generated.
        date: NaiveDate,
        /// Underlying generator failure.
        source: GenerationError,
    },
}

/// Service layer for daily problems and scores.
///
/// Wraps [`PuzzleRepository`] with get-or-create semantics for the day's
/// problem and best-score bookkeeping.
#[derive(Debug, Clone)]
pub struct PuzzleService {
    repository: PuzzleRepository,
}

impl PuzzleService {
    /// Creates a new service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: PuzzleRepository) -> Self {
        info!("Creating PuzzleService");
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &PuzzleRepository {
        &self.repository
    }

    /// Returns today's problem (UTC), creating it on first request.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails or generation is exhausted.
    #[instrument(skip(self))]
    pub fn todays_problem(&self) -> Result<Problem, ServiceError> {
        self.problem_for_date(Utc::now().date_naive())
    }

    /// Returns the problem for a date, generating one if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails or generation is exhausted.
    #[instrument(skip(self))]
    pub fn problem_for_date(&self, date: NaiveDate) -> Result<Problem, ServiceError> {
        if let Some(problem) = self.repository.find_problem_by_date(date)? {
            debug!(problem_id = problem.id(), "Existing problem found");
            return Ok(problem);
        }

        let generated = generate_expression().map_err(|source| {
            warn!(%date, error = %source, "Problem generation failed");
            ServiceError::Generation { date, source }
        })?;

        let problem = NewProblem::new(generated.expression().clone(), *generated.answer(), date);
        Ok(self.repository.insert_problem_if_absent(problem)?)
    }

    /// Records a score, keeping the user's better result for the problem.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(skip(self))]
    pub fn submit_score(
        &self,
        user_id: &str,
        user_name: &str,
        problem_id: i32,
        attempts: i32,
        duration_ms: i64,
    ) -> Result<LeaderboardEntry, ServiceError> {
        let entry = NewLeaderboardEntry::scored(
            user_id.to_string(),
            user_name.to_string(),
            problem_id,
            attempts,
            duration_ms,
        );
        debug!(score = entry.score(), "Submitting score");
        Ok(self.repository.upsert_best_entry(entry)?)
    }

    /// Submits a finished game to the leaderboard.
    ///
    /// Only wins by identified players are recorded; anything else returns
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(
        skip(self, state),
        fields(problem_id = state.problem_id(), status = %state.status())
    )]
    pub fn record_win(
        &self,
        identity: &Identity,
        state: &GameState,
        duration_ms: i64,
    ) -> Result<Option<LeaderboardEntry>, ServiceError> {
        if state.status() != GameStatus::Won {
            debug!("Game not won, nothing to record");
            return Ok(None);
        }
        if identity.is_anonymous() {
            info!("Anonymous win not recorded");
            return Ok(None);
        }

        let attempts = i32::try_from(state.attempts()).unwrap_or(i32::MAX);
        self.submit_score(
            &identity.user_id,
            &identity.user_name,
            state.problem_id(),
            attempts,
            duration_ms,
        )
        .map(Some)
    }

    /// Users ranked by average score over all of their entries.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(skip(self))]
    pub fn global_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, ServiceError> {
        Ok(self.repository.global_leaderboard(limit)?)
    }

    /// Best entries for one problem.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(skip(self))]
    pub fn todays_leaderboard(
        &self,
        problem_id: i32,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(self.repository.entries_for_problem(problem_id, limit)?)
    }

    /// Summary of a user's games, or `None` if they have not played.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(skip(self))]
    pub fn user_stats(&self, user_id: &str) -> Result<Option<UserStats>, ServiceError> {
        Ok(self.repository.user_stats(user_id)?)
    }

    /// The last thirty problems, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(skip(self))]
    pub fn recent_problems(&self) -> Result<Vec<Problem>, ServiceError> {
        Ok(self.repository.recent_problems(RECENT_PROBLEMS)?)
    }

    /// The last thirty problems as players may see them on `today`.
    ///
    /// Expressions for `today` and later stay hidden.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if storage fails.
    #[instrument(skip(self))]
    pub fn published_problems(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<PublishedProblem>, ServiceError> {
        let problems = self.recent_problems()?;
        Ok(problems.iter().map(|p| p.published(today)).collect())
    }
}
