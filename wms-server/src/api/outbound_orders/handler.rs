//! Outbound Order API Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{
    OrderLog, OutboundOrder, OutboundOrderCreate, OutboundOrderDetail, OutboundOrderQuery,
    OutboundOrderUpdate, ServiceEvent,
};
use sqlx::SqlitePool;

use crate::auth::Actor;
use crate::billing::service_events;
use crate::core::ServerState;
use crate::db::repository::{OrderKind, order_log, outbound};
use crate::orders;
use crate::utils::{AppError, AppResponse, AppResult, created, ok, validate_note, validate_payload};

/// GET /outbound-orders - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OutboundOrderQuery>,
) -> AppResult<AppResponse<Vec<OutboundOrder>>> {
    let orders = outbound::list_orders(&state.pool, &query).await?;
    Ok(ok(orders))
}

/// GET /outbound-orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<OutboundOrderDetail>> {
    let detail = orders::outbound::get_order(&state.pool, id).await?;
    Ok(ok(detail))
}

/// POST /outbound-orders
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    axum::Json(payload): axum::Json<OutboundOrderCreate>,
) -> AppResult<(StatusCode, AppResponse<OutboundOrderDetail>)> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;
    for item in &payload.items {
        validate_note(&item.note)?;
    }

    let detail = orders::outbound::create_order(&state.pool, payload, actor.id()).await?;
    Ok(created(detail))
}

/// PUT /outbound-orders/:id - patch; shipping takes stock out
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    axum::Json(payload): axum::Json<OutboundOrderUpdate>,
) -> AppResult<AppResponse<OutboundOrderDetail>> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;

    let detail = orders::outbound::update_order(&state.pool, id, payload, actor.id()).await?;
    Ok(ok(detail))
}

/// DELETE /outbound-orders/:id
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<bool>> {
    orders::outbound::delete_order(&state.pool, id, actor.id()).await?;
    Ok(ok(true))
}

/// GET /outbound-orders/:id/logs
pub async fn list_logs(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<Vec<OrderLog>>> {
    ensure_order_exists(&state.pool, id).await?;
    let logs = order_log::list(&state.pool, OrderKind::Outbound, id).await?;
    Ok(ok(logs))
}

/// GET /outbound-orders/:id/service-events - including removed ones
pub async fn list_service_events(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<Vec<ServiceEvent>>> {
    ensure_order_exists(&state.pool, id).await?;
    let events = service_events::list_for_order(&state.pool, id).await?;
    Ok(ok(events))
}

/// Logs and service events stay readable after a soft delete
async fn ensure_order_exists(pool: &SqlitePool, id: i64) -> AppResult<()> {
    if order_log::order_exists(pool, OrderKind::Outbound, id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("Outbound order {id}")))
    }
}
