//! Outbound line items
//!
//! Stock only moves at the order-level ship transition, so items carry no
//! ledger effect of their own. Once an order is shipped or delivered its
//! items are frozen.

use shared::error::{AppError, AppResult};
use shared::models::{
    OrderLogEntry, OutboundItem, OutboundItemCreate, OutboundItemUpdate, OutboundOrder,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::{append_log, item_note};
use crate::billing;
use crate::db::repository::{OrderKind, master, outbound};

pub async fn create_item(
    pool: &SqlitePool,
    data: OutboundItemCreate,
    actor: Option<i64>,
) -> AppResult<OutboundItem> {
    let mut tx = pool.begin().await?;

    let order = lock_unshipped(&mut tx, data.outbound_order_id).await?;
    master::ensure_lot_product(&mut tx, data.lot_id, data.product_id).await?;
    let id = outbound::insert_item(&mut tx, &data).await?;
    billing::sync_outbound_order_billing_event(&mut tx, order.id).await?;

    let item = load_item(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(item_id = id, order_id = order.id, qty = item.qty, "Outbound item created");
    let actor = actor.or(order.created_by);
    append_log(pool, OrderKind::Outbound, item_entry(&order, "item_create", &item, actor)).await;

    Ok(item)
}

/// Patch an item; both the current and the destination order must be unshipped
pub async fn update_item(
    pool: &SqlitePool,
    id: i64,
    patch: OutboundItemUpdate,
    actor: Option<i64>,
) -> AppResult<OutboundItem> {
    let mut tx = pool.begin().await?;

    let current = outbound::lock_item(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound item {id}")))?;
    let source = lock_unshipped(&mut tx, current.outbound_order_id).await?;
    let target = match patch.outbound_order_id {
        Some(order_id) if order_id != source.id => lock_unshipped(&mut tx, order_id).await?,
        _ => source.clone(),
    };
    let moved = target.id != source.id;

    let next = merge_patch(&current, &patch);
    master::ensure_lot_product(&mut tx, next.lot_id, next.product_id).await?;
    outbound::update_item(&mut tx, &next).await?;

    billing::sync_outbound_order_billing_event(&mut tx, source.id).await?;
    if moved {
        billing::sync_outbound_order_billing_event(&mut tx, target.id).await?;
    }

    let item = load_item(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(item_id = id, from_order = source.id, to_order = target.id, qty = item.qty, "Outbound item updated");
    let actor = actor.or(target.created_by);
    if moved {
        append_log(pool, OrderKind::Outbound, item_entry(&source, "item_move_out", &item, actor)).await;
        append_log(pool, OrderKind::Outbound, item_entry(&target, "item_move_in", &item, actor)).await;
    } else {
        append_log(pool, OrderKind::Outbound, item_entry(&source, "item_update", &item, actor)).await;
    }

    Ok(item)
}

pub async fn delete_item(pool: &SqlitePool, id: i64, actor: Option<i64>) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let item = outbound::lock_item(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound item {id}")))?;
    let order = lock_unshipped(&mut tx, item.outbound_order_id).await?;
    outbound::soft_delete_item(&mut tx, id).await?;
    billing::sync_outbound_order_billing_event(&mut tx, order.id).await?;
    tx.commit().await?;

    tracing::info!(item_id = id, order_id = order.id, "Outbound item deleted");
    let actor = actor.or(order.created_by);
    append_log(pool, OrderKind::Outbound, item_entry(&order, "item_delete", &item, actor)).await;

    Ok(())
}

pub async fn get_item(pool: &SqlitePool, id: i64) -> AppResult<OutboundItem> {
    outbound::find_item_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound item {id}")))
}

/// Lock a live order that has not shipped yet
async fn lock_unshipped(conn: &mut SqliteConnection, order_id: i64) -> AppResult<OutboundOrder> {
    let order = outbound::lock_order(conn, order_id)
        .await?
        .ok_or_else(|| AppError::invalid_order(order_id))?;
    if order.status.is_applied() {
        return Err(AppError::order_locked(order_id));
    }
    Ok(order)
}

async fn load_item(conn: &mut SqliteConnection, id: i64) -> AppResult<OutboundItem> {
    outbound::find_item(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound item {id}")))
}

fn merge_patch(current: &OutboundItem, patch: &OutboundItemUpdate) -> OutboundItem {
    let mut next = current.clone();
    if let Some(order_id) = patch.outbound_order_id {
        next.outbound_order_id = order_id;
    }
    if let Some(product_id) = patch.product_id {
        next.product_id = product_id;
    }
    if let Some(lot_id) = patch.lot_id {
        next.lot_id = lot_id;
    }
    if let Some(location_id) = patch.location_id {
        next.location_id = location_id;
    }
    if let Some(qty) = patch.qty {
        next.qty = qty;
    }
    if let Some(box_type) = &patch.box_type {
        next.box_type = Some(box_type.clone());
    }
    if let Some(box_count) = patch.box_count {
        next.box_count = box_count;
    }
    if let Some(note) = &patch.note {
        next.note = Some(note.clone());
    }
    next
}

fn item_entry(
    order: &OutboundOrder,
    action: &str,
    item: &OutboundItem,
    actor: Option<i64>,
) -> OrderLogEntry {
    OrderLogEntry {
        order_id: order.id,
        action: action.into(),
        from_status: Some(order.status.to_string()),
        to_status: Some(order.status.to_string()),
        note: item_note(item.id, item.qty),
        actor_user_id: actor,
    }
}
