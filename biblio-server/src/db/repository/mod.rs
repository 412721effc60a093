//! Repository Module
//!
//! Function-style CRUD over the SQLite pool. Multi-step writes take a
//! `&mut SqliteConnection` so callers can scope them to one transaction.

pub mod account;
pub mod author;
pub mod book;
pub mod borrow;
pub mod category;
pub mod employee;
pub mod member;

use shared::ErrorCode;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{1}")]
    Business(ErrorCode, String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            // SQLITE_CONSTRAINT_UNIQUE surfaces "UNIQUE constraint failed: table.column"
            if db_err.message().contains("UNIQUE constraint failed") {
                return RepoError::Duplicate(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
