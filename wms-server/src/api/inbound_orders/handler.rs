//! Inbound Order API Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{
    InboundOrder, InboundOrderCreate, InboundOrderDetail, InboundOrderQuery, InboundOrderUpdate,
    OrderLog,
};
use sqlx::SqlitePool;

use crate::auth::Actor;
use crate::core::ServerState;
use crate::db::repository::{OrderKind, inbound, order_log};
use crate::orders;
use crate::utils::{AppError, AppResponse, AppResult, created, ok, validate_note, validate_payload};

/// GET /inbound-orders - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<InboundOrderQuery>,
) -> AppResult<AppResponse<Vec<InboundOrder>>> {
    let orders = inbound::list_orders(&state.pool, &query).await?;
    Ok(ok(orders))
}

/// GET /inbound-orders/:id - header with live items
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<InboundOrderDetail>> {
    let detail = orders::inbound::get_order(&state.pool, id).await?;
    Ok(ok(detail))
}

/// POST /inbound-orders
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    axum::Json(payload): axum::Json<InboundOrderCreate>,
) -> AppResult<(StatusCode, AppResponse<InboundOrderDetail>)> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;
    for item in &payload.items {
        validate_note(&item.note)?;
    }

    let detail = orders::inbound::create_order(&state.pool, payload, actor.id()).await?;
    Ok(created(detail))
}

/// PUT /inbound-orders/:id - patch; status changes receive or roll back stock
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    axum::Json(payload): axum::Json<InboundOrderUpdate>,
) -> AppResult<AppResponse<InboundOrderDetail>> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;

    let detail = orders::inbound::update_order(&state.pool, id, payload, actor.id()).await?;
    Ok(ok(detail))
}

/// DELETE /inbound-orders/:id
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<bool>> {
    orders::inbound::delete_order(&state.pool, id, actor.id()).await?;
    Ok(ok(true))
}

/// GET /inbound-orders/:id/logs - oldest first
pub async fn list_logs(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<Vec<OrderLog>>> {
    ensure_order_exists(&state.pool, id).await?;
    let logs = order_log::list(&state.pool, OrderKind::Inbound, id).await?;
    Ok(ok(logs))
}

/// Logs stay readable after a soft delete
async fn ensure_order_exists(pool: &SqlitePool, id: i64) -> AppResult<()> {
    if order_log::order_exists(pool, OrderKind::Inbound, id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("Inbound order {id}")))
    }
}
