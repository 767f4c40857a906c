//! Storage error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Which storage step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The repository was given an unusable path.
    #[display("setup")]
    Setup,
    /// Opening the sqlite file failed.
    #[display("connection")]
    Connection,
    /// A statement or transaction failed.
    #[display("query")]
    Query,
    /// Applying embedded migrations failed.
    #[display("migration")]
    Migration,
}

/// Storage error tagged with its kind and the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Database {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failing step.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error of the given kind at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, err.to_string())
    }
}

// MigrationHarness reports failures as boxed errors.
impl From<Box<dyn std::error::Error + Send + Sync>> for DbError {
    #[track_caller]
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(DbErrorKind::Migration, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_kind_and_location() {
        let err = DbError::new(DbErrorKind::Setup, "Database path is empty");
        let text = err.to_string();
        assert!(text.starts_with("Database setup error: Database path is empty at "));
        assert!(text.contains("error.rs"));
    }

    #[test]
    fn test_diesel_errors_are_queries() {
        let err = DbError::from(diesel::result::Error::NotFound);
        assert_eq!(err.kind, DbErrorKind::Query);
    }
}
