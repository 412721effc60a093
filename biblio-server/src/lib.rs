//! Biblio Server - library circulation service
//!
//! # Architecture overview
//!
//! - **Database** (`db`): embedded SQLite store and repositories
//! - **Circulation** (`circulation`): the borrow ledger state machine,
//!   fine policy and overdue sweep
//! - **Auth** (`auth`): JWT + Argon2 authentication, role middleware
//! - **Audit** (`audit`): append-only trail for sensitive actions
//! - **HTTP API** (`api`): RESTful interface
//!
//! # Module layout
//!
//! ```text
//! biblio-server/src/
//! ├── core/          # configuration, state, server
//! ├── auth/          # JWT authentication, role checks
//! ├── audit/         # audit trail
//! ├── circulation/   # borrow ledger engine
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # database layer
//! └── utils/         # errors, logging, validation, time
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod circulation;
pub mod core;
pub mod db;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use circulation::{CirculationService, FinePolicy};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - structured events on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Prepare the process environment: dotenv, logging.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  _ __    ___
   / __ )(_) /_  / (_)___
  / __  / / __ \/ / / __ \
 / /_/ / / /_/ / / / /_/ /
/_____/_/_.___/_/_/\____/
    "#
    );
}
