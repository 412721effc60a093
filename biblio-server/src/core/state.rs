use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::audit::{self, AuditService};
use crate::auth::{hash_password, JwtService};
use crate::circulation::{CirculationService, OverdueScheduler};
use crate::core::Config;
use crate::db::repository::account;
use crate::db::DbService;

/// Server state: shared handles to every service
///
/// Cloning is shallow (Arc / pool handles), so the state can be handed to
/// axum, middleware and background tasks freely.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT service
    pub jwt_service: Arc<JwtService>,
    /// Audit log service
    pub audit_service: Arc<AuditService>,
    /// Circulation engine (borrow ledger)
    pub circulation: CirculationService,
}

impl ServerState {
    /// Initialize the server state
    ///
    /// Order: working directory layout, database (+migrations), services,
    /// audit worker, bootstrap superuser.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be initialized; the server cannot
    /// run without it.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("biblio.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let pool = db_service.pool;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        let (audit_service, audit_rx) = AuditService::new(pool.clone(), config.audit_buffer_size);
        audit::spawn_worker(pool.clone(), audit_rx);

        let circulation = CirculationService::new(
            pool.clone(),
            config.timezone,
            config.loan_period_days,
            config.fine_policy,
        );

        let state = Self {
            config: config.clone(),
            pool,
            jwt_service,
            audit_service,
            circulation,
        };

        state.bootstrap_superuser().await;

        state
    }

    /// Start background tasks (overdue sweep scheduler)
    pub fn start_background_tasks(&self, shutdown: CancellationToken) {
        let scheduler = OverdueScheduler::new(
            self.circulation.clone(),
            shutdown,
            self.config.overdue_sweep_hour,
            self.config.timezone,
        );
        tokio::spawn(scheduler.run());
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Create the first superuser account when the store is empty.
    ///
    /// Uses ADMIN_USERNAME / ADMIN_PASSWORD; without a configured
    /// password a random one is generated and printed once to the log.
    async fn bootstrap_superuser(&self) {
        let existing = match account::count(&self.pool).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!("Failed to check account table: {}", e);
                return;
            }
        };
        if existing > 0 {
            return;
        }

        let password = self
            .config
            .admin_password
            .clone()
            .unwrap_or_else(generate_password);
        let hash = match hash_password(&password) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!("Failed to hash bootstrap password: {}", e);
                return;
            }
        };

        let mut conn = match self.pool.acquire().await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Failed to acquire connection for bootstrap: {}", e);
                return;
            }
        };

        match account::create(
            &mut conn,
            &self.config.admin_username,
            "Administrator",
            None,
            &hash,
            true,
        )
        .await
        {
            Ok(id) => {
                if self.config.admin_password.is_some() {
                    tracing::info!(
                        account_id = id,
                        username = %self.config.admin_username,
                        "Bootstrap superuser created"
                    );
                } else {
                    tracing::warn!(
                        account_id = id,
                        username = %self.config.admin_username,
                        password = %password,
                        "Bootstrap superuser created with a GENERATED password; change it"
                    );
                }
            }
            Err(e) => tracing::error!("Failed to create bootstrap superuser: {}", e),
        }
    }
}

fn generate_password() -> String {
    use ring::rand::{SecureRandom, SystemRandom};
    let alphabet = "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
    let rng = SystemRandom::new();
    let mut out = String::with_capacity(20);
    for _ in 0..20 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            // SystemRandom failing is effectively fatal; fall back to a
            // fixed marker the operator will notice
            return "CHANGE-ME-NOW".to_string();
        }
        out.push(alphabet.as_bytes()[(byte[0] as usize) % alphabet.len()] as char);
    }
    out
}
