//! Inbound Item API Handlers
//!
//! Edits of a received order's items move stock immediately.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{InboundItem, InboundItemCreate, InboundItemUpdate};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::orders::inbound_items;
use crate::utils::{AppResponse, AppResult, created, ok, validate_note, validate_payload};

/// GET /inbound-items/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<InboundItem>> {
    let item = inbound_items::get_item(&state.pool, id).await?;
    Ok(ok(item))
}

/// POST /inbound-items
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    axum::Json(payload): axum::Json<InboundItemCreate>,
) -> AppResult<(StatusCode, AppResponse<InboundItem>)> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;

    let item = inbound_items::create_item(&state.pool, payload, actor.id()).await?;
    Ok(created(item))
}

/// PUT /inbound-items/:id - `inbound_order_id` moves the item to another order
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    axum::Json(payload): axum::Json<InboundItemUpdate>,
) -> AppResult<AppResponse<InboundItem>> {
    validate_payload(&payload)?;
    validate_note(&payload.note)?;

    let item = inbound_items::update_item(&state.pool, id, payload, actor.id()).await?;
    Ok(ok(item))
}

/// DELETE /inbound-items/:id
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<AppResponse<bool>> {
    inbound_items::delete_item(&state.pool, id, actor.id()).await?;
    Ok(ok(true))
}
