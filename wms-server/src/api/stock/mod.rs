//! Stock API
//!
//! Read-only views of the ledger; stock only changes through order and
//! item mutations.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/stock-balances", get(handler::list_balances))
        .route("/stock-transactions", get(handler::list_transactions))
}
