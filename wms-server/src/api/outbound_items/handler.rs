//! Outbound Item API Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{OutboundItem, OutboundItemCreate, OutboundItemUpdate};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::orders::outbound_items;
use crate::utils::{AppResponse, AppResult, created, ok, validate_note, validate_payload};

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<OutboundItem>> {
    let item = outbound_items::get_item(&state.pool, id).await?;
    Ok(ok(item))
}

/// POST /outbound-items - rejected once the order has shipped
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    axum::Json(payload): axum::Json<OutboundItemCreate>,
) -> AppResult<(StatusCode, AppResponse<OutboundItem>)> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;

    let item = outbound_items::create_item(&state.pool, payload, actor.id()).await?;
    Ok(created(item))
}

/// PUT /outbound-items/:id
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    axum::Json(payload): axum::Json<OutboundItemUpdate>,
) -> AppResult<AppResponse<OutboundItem>> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;

    let item = outbound_items::update_item(&state.pool, id, payload, actor.id()).await?;
    Ok(ok(item))
}

/// DELETE /outbound-items/:id
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<bool>> {
    outbound_items::delete_item(&state.pool, id, actor.id()).await?;
    Ok(ok(true))
}
