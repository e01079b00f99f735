//! Inbound Item API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/inbound-items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/", post(handler::create)).route(
        "/{id}",
        get(handler::get_by_id)
            .put(handler::update)
            .delete(handler::delete),
    )
}
