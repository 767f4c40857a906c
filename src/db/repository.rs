//! Database repository for daily problems and leaderboard entries.

use std::collections::HashMap;

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{
    DbError, DbErrorKind, LeaderboardEntry, LeaderboardRow, NewLeaderboardEntry, NewProblem,
    Problem, UserStats, schema,
};
use crate::games::equation::round_to;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Number of recent games included in [`UserStats`].
const RECENT_GAMES: usize = 5;

/// Database repository for problem and leaderboard operations.
#[derive(Debug, Clone)]
pub struct PuzzleRepository {
    db_path: String,
}

impl PuzzleRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// Every operation opens its own connection, so `":memory:"` gives each
    /// call a fresh, empty database. Use a file for anything stateful.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(DbErrorKind::Setup, "Database path is empty"));
        }
        info!(path = %db_path, "Creating PuzzleRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Gets the problem for a date. Returns `None` if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_problem_by_date(&self, date: NaiveDate) -> Result<Option<Problem>, DbError> {
        debug!(%date, "Looking up problem by date");
        let mut conn = self.connection()?;

        let problem = schema::problems::table
            .filter(schema::problems::date.eq(date))
            .first::<Problem>(&mut conn)
            .optional()?;

        Ok(problem)
    }

    /// Gets a problem by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_problem(&self, problem_id: i32) -> Result<Option<Problem>, DbError> {
        let mut conn = self.connection()?;

        let problem = schema::problems::table
            .find(problem_id)
            .first::<Problem>(&mut conn)
            .optional()?;

        Ok(problem)
    }

    /// Inserts a problem unless its date already has one, then returns the
    /// stored problem for that date.
    ///
    /// Concurrent callers for the same date all get the same row: the
    /// unique date key makes every insert but the first a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(
        skip(self, problem),
        fields(date = %problem.date(), expression = %problem.expression())
    )]
    pub fn insert_problem_if_absent(&self, problem: NewProblem) -> Result<Problem, DbError> {
        let mut conn = self.connection()?;

        let inserted = diesel::insert_or_ignore_into(schema::problems::table)
            .values(&problem)
            .execute(&mut conn)?;

        let stored = schema::problems::table
            .filter(schema::problems::date.eq(problem.date()))
            .first::<Problem>(&mut conn)?;

        if inserted == 0 {
            debug!(problem_id = stored.id(), "Problem already existed for date");
        } else {
            info!(problem_id = stored.id(), date = %stored.date(), "Problem created");
        }
        Ok(stored)
    }

    /// Lists the most recent problems, newest date first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn recent_problems(&self, limit: i64) -> Result<Vec<Problem>, DbError> {
        let mut conn = self.connection()?;

        let problems = schema::problems::table
            .order(schema::problems::date.desc())
            .limit(limit)
            .load::<Problem>(&mut conn)?;

        info!(count = problems.len(), "Recent problems loaded");
        Ok(problems)
    }

    /// Gets a user's entry for a problem. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_entry(
        &self,
        user_id: &str,
        problem_id: i32,
    ) -> Result<Option<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;

        let entry = schema::leaderboard_entries::table
            .filter(schema::leaderboard_entries::user_id.eq(user_id))
            .filter(schema::leaderboard_entries::problem_id.eq(problem_id))
            .first::<LeaderboardEntry>(&mut conn)
            .optional()?;

        Ok(entry)
    }

    /// Records an entry, keeping whichever of the stored and new entries
    /// has the lower score.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(
        skip(self, entry),
        fields(user_id = %entry.user_id(), problem_id = entry.problem_id(), score = entry.score())
    )]
    pub fn upsert_best_entry(
        &self,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, DbError> {
        use schema::leaderboard_entries::dsl;

        let mut conn = self.connection()?;

        conn.transaction::<_, DbError, _>(|conn| {
            let existing = dsl::leaderboard_entries
                .filter(dsl::user_id.eq(entry.user_id()))
                .filter(dsl::problem_id.eq(entry.problem_id()))
                .first::<LeaderboardEntry>(conn)
                .optional()?;

            match existing {
                None => {
                    let created = diesel::insert_into(dsl::leaderboard_entries)
                        .values(&entry)
                        .returning(LeaderboardEntry::as_returning())
                        .get_result(conn)?;
                    info!(entry_id = created.id(), score = created.score(), "Score recorded");
                    Ok(created)
                }
                Some(current) if entry.score() < current.score() => {
                    let updated = diesel::update(dsl::leaderboard_entries.find(*current.id()))
                        .set((
                            dsl::user_name.eq(entry.user_name()),
                            dsl::score.eq(entry.score()),
                            dsl::attempts.eq(entry.attempts()),
                            dsl::duration_ms.eq(entry.duration_ms()),
                        ))
                        .returning(LeaderboardEntry::as_returning())
                        .get_result(conn)?;
                    info!(
                        entry_id = updated.id(),
                        previous = current.score(),
                        score = updated.score(),
                        "Score improved"
                    );
                    Ok(updated)
                }
                Some(current) => {
                    debug!(entry_id = current.id(), best = current.score(), "Existing score kept");
                    Ok(current)
                }
            }
        })
    }

    /// Loads all entries, best score first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries_by_score(&self) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;

        let entries = schema::leaderboard_entries::table
            .order((
                schema::leaderboard_entries::score.asc(),
                schema::leaderboard_entries::id.asc(),
            ))
            .load::<LeaderboardEntry>(&mut conn)?;

        Ok(entries)
    }

    /// Loads the best entries for one problem.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries_for_problem(
        &self,
        problem_id: i32,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;

        let entries = schema::leaderboard_entries::table
            .filter(schema::leaderboard_entries::problem_id.eq(problem_id))
            .order((
                schema::leaderboard_entries::score.asc(),
                schema::leaderboard_entries::id.asc(),
            ))
            .limit(limit)
            .load::<LeaderboardEntry>(&mut conn)?;

        info!(problem_id, count = entries.len(), "Problem leaderboard loaded");
        Ok(entries)
    }

    /// Loads a user's entries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries_for_user(&self, user_id: &str) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;

        let entries = schema::leaderboard_entries::table
            .filter(schema::leaderboard_entries::user_id.eq(user_id))
            .order((
                schema::leaderboard_entries::created_at.desc(),
                schema::leaderboard_entries::id.desc(),
            ))
            .load::<LeaderboardEntry>(&mut conn)?;

        Ok(entries)
    }

    /// Ranks users by average score across all their entries.
    ///
    /// Every stored entry is grouped by user before the ranking is cut to
    /// `limit` users, so an average always covers all of a user's games.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn global_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, DbError> {
        let entries = self.entries_by_score()?;

        // (user_name, total, games, best), in first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, (String, i64, i32, i32)> = HashMap::new();

        for entry in &entries {
            let slot = totals.entry(entry.user_id().clone()).or_insert_with(|| {
                order.push(entry.user_id().clone());
                (entry.user_name().clone(), 0, 0, *entry.score())
            });
            slot.0 = entry.user_name().clone();
            slot.1 += i64::from(*entry.score());
            slot.2 += 1;
            slot.3 = slot.3.min(*entry.score());
        }

        let mut rows: Vec<LeaderboardRow> = order
            .into_iter()
            .filter_map(|user_id| {
                let (user_name, total, games, best) = totals.remove(&user_id)?;
                let average = round_to(total as f64 / f64::from(games), 1);
                Some(LeaderboardRow::new(user_id, user_name, total, games, best, average))
            })
            .collect();

        rows.sort_by(|a, b| a.average_score().total_cmp(b.average_score()));
        rows.truncate(limit);

        info!(
            entries = entries.len(),
            users = rows.len(),
            "Global leaderboard computed"
        );
        Ok(rows)
    }

    /// Summarises a user's games. Returns `None` if they have none.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn user_stats(&self, user_id: &str) -> Result<Option<UserStats>, DbError> {
        let entries = self.entries_for_user(user_id)?;
        if entries.is_empty() {
            debug!("No games recorded for user");
            return Ok(None);
        }

        let games = entries.len() as f64;
        let total_score: i64 = entries.iter().map(|e| i64::from(*e.score())).sum();
        let total_attempts: i64 = entries.iter().map(|e| i64::from(*e.attempts())).sum();
        let best_score = entries.iter().map(|e| *e.score()).min().unwrap_or_default();

        let stats = UserStats::new(
            entries.len() as i32,
            round_to(total_score as f64 / games, 1),
            best_score,
            round_to(total_attempts as f64 / games, 1),
            entries.into_iter().take(RECENT_GAMES).collect(),
        );

        info!(
            games_played = stats.games_played(),
            best_score = stats.best_score(),
            average_score = stats.average_score(),
            "User stats computed"
        );
        Ok(Some(stats))
    }
}
