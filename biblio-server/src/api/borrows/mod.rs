//! Borrow API module
//!
//! The ledger surface: checkout, return, history. There is no free-form
//! update; state only moves through the circulation transitions.

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/borrows", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/return", post(handler::return_borrow))
}
