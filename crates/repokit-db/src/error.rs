//! Error types for repokit-db.

use miette::Diagnostic;
use thiserror::Error;

/// Database error type for repokit-db operations.
///
/// Failures raised by SQLite itself are carried untouched in
/// [`DbError::Sqlite`]; the remaining variants are raised by repokit before
/// any statement reaches the store.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error(transparent)]
    #[diagnostic(code(repokit_db::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(repokit_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Invalid identifier: `{0}`")]
    #[diagnostic(
        code(repokit_db::invalid_identifier),
        help("Table and column names may only contain ASCII letters, digits and underscores")
    )]
    InvalidIdentifier(String),

    #[error("Invalid sort direction: `{0}`")]
    #[diagnostic(
        code(repokit_db::invalid_sort_direction),
        help("Use `asc` or `desc`")
    )]
    InvalidSortDirection(String),

    #[error("Invalid filter: `{0}`")]
    #[diagnostic(
        code(repokit_db::invalid_filter),
        help("Filters are written as `column=value` or `column=value1,value2`")
    )]
    InvalidFilter(String),

    #[error("No repository registered for model `{0}`")]
    #[diagnostic(
        code(repokit_db::repository_not_found),
        help("Register the repository with `RepositoryRegistry::register` at start-up")
    )]
    RepositoryNotFound(String),

    #[error("Repository registered for model `{model}` is not a `{expected}`")]
    #[diagnostic(code(repokit_db::repository_mismatch))]
    RepositoryMismatch {
        model: String,
        expected: &'static str,
    },
}

/// Result type alias for repokit-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
