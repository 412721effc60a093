use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::circulation::FinePolicy;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/biblio | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | TIMEZONE | UTC | Business timezone (IANA name) |
/// | LOAN_PERIOD_DAYS | 14 | Default loan period |
/// | FINE_PER_DAY | 0.50 | Overdue fine per day |
/// | FINE_GRACE_DAYS | 0 | Grace period before fines accrue |
/// | OVERDUE_SWEEP_HOUR | 3 | Hour of day (business tz) for the overdue sweep |
/// | ADMIN_USERNAME | admin | Bootstrap superuser username |
/// | ADMIN_PASSWORD | (generated) | Bootstrap superuser password |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/biblio HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Circulation policy ===
    /// Business timezone for day-precision circulation dates
    pub timezone: Tz,
    /// Default loan period in days
    pub loan_period_days: i64,
    /// Overdue fine policy
    pub fine_policy: FinePolicy,
    /// Hour of day (business timezone) when the overdue sweep runs
    pub overdue_sweep_hour: u32,

    // === Service tuning ===
    /// Audit channel buffer size
    pub audit_buffer_size: usize,
    /// Bootstrap superuser username (first start only)
    pub admin_username: String,
    /// Bootstrap superuser password; generated and logged when unset
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/biblio".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::UTC),
            loan_period_days: std::env::var("LOAN_PERIOD_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(14),
            fine_policy: FinePolicy {
                per_day: std::env::var("FINE_PER_DAY")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(0.50),
                grace_days: std::env::var("FINE_GRACE_DAYS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(0),
            },
            overdue_sweep_hour: std::env::var("OVERDUE_SWEEP_HOUR")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3),

            audit_buffer_size: std::env::var("AUDIT_BUFFER_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(256),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// Directory for the SQLite database file
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory for rotating log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Ensure the working directory layout exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
