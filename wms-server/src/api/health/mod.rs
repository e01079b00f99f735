//! Health check
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /health | GET | liveness plus a `SELECT 1` database probe |

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// ok | error
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /health
///
/// Answers 503 when the database does not respond.
pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| tracing::error!(error = %e, "Database health probe failed"))
        .is_ok();

    let (code, status, database) = if database_ok {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "error", "error")
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}
