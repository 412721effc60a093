//! Health check API

use axum::{routing::get, Json, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "biblio-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
