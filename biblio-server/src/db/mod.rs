//! Database Module
//!
//! Handles SQLite connection pool and migrations

pub mod repository;

use crate::utils::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database service owning the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Create a new database service with WAL mode
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Build connection options: WAL, foreign keys, normal sync
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        // busy_timeout: wait up to 5s on write contention instead of failing
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        // Run migrations (ignore previously applied but now removed migrations)
        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// In-memory database for tests
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            // A single persistent connection: the in-memory database lives
            // exactly as long as this connection does
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;

        Ok(Self { pool })
    }
}
