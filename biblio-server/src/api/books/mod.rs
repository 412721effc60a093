//! Book API module

mod handler;

use axum::{routing::get, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/books", routes())
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
}
