//! Audit log API module
//!
//! Read-only; the trail itself is append-only. Manager access required.

mod handler;

use axum::{middleware, routing::get, Router};

use crate::auth::require_manager;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/audit-log", get(handler::list))
        .layer(middleware::from_fn(require_manager))
}
