//! Employee API module
//!
//! The whole router requires the manager-or-superuser predicate; staff
//! records are not visible to other roles.

mod handler;

use axum::{middleware, routing::get, Router};

use crate::auth::require_manager;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_manager))
}
