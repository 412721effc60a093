//! Server implementation
//!
//! Router assembly, HTTP listener and graceful shutdown.

use axum::{middleware, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};

/// HTTP request log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::auth::router())
        .merge(crate::api::health::router())
        .merge(crate::api::dashboard::router())
        // Data model APIs
        .merge(crate::api::books::router())
        .merge(crate::api::members::router())
        .merge(crate::api::employees::router())
        .merge(crate::api::borrows::router())
        .merge(crate::api::audit_log::router())
}

/// HTTP server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for tests and embedding)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        let shutdown_token = CancellationToken::new();
        state.start_background_tasks(shutdown_token.clone());

        let app = build_app()
            // JWT auth middleware at router level; require_auth skips the
            // public routes itself
            .layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(log_request));

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Biblio server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        let shutdown = {
            let token = shutdown_token.clone();
            async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                token.cancel();
            }
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
