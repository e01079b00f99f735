//! Outbound order lifecycle
//!
//! Items of a `shipped` or `delivered` order have left the warehouse.
//! Entering either status takes every item out of stock and records one
//! service event per item; leaving both puts the stock back.

use shared::error::{AppError, AppResult};
use shared::models::{
    OrderLogEntry, OutboundItem, OutboundItemCreate, OutboundOrder, OutboundOrderCreate,
    OutboundOrderDetail, OutboundOrderUpdate, OutboundStatus, RefType, ReferenceType,
    StockTxnPayload, TxnType,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::status::{LedgerTransition, outbound_action};
use super::{append_log, item_key};
use crate::billing;
use crate::db::repository::{OrderKind, master, outbound};
use crate::ledger;

/// Create an order with its optional items
///
/// An order created directly as shipped must find every item in stock.
pub async fn create_order(
    pool: &SqlitePool,
    data: OutboundOrderCreate,
    actor: Option<i64>,
) -> AppResult<OutboundOrderDetail> {
    let mut tx = pool.begin().await?;

    let order_id = outbound::insert_order(&mut tx, &data, actor).await?;
    for input in data.items.iter().cloned() {
        master::ensure_lot_product(&mut tx, input.lot_id, input.product_id).await?;
        outbound::insert_item(&mut tx, &OutboundItemCreate::from_input(order_id, input)).await?;
    }

    let order = load_order(&mut tx, order_id).await?;
    if order.status.is_applied() {
        apply(&mut tx, &order, actor).await?;
    }
    billing::sync_outbound_order_billing_event(&mut tx, order_id).await?;

    let detail = load_detail(&mut tx, order_id).await?;
    tx.commit().await?;

    tracing::info!(order_id, order_no = %detail.order.order_no, status = %detail.order.status, "Outbound order created");
    append_log(
        pool,
        OrderKind::Outbound,
        OrderLogEntry {
            order_id,
            action: "create".into(),
            from_status: None,
            to_status: Some(detail.order.status.to_string()),
            note: data.note,
            actor_user_id: actor,
        },
    )
    .await;

    Ok(detail)
}

/// Patch an order header, shipping or restoring stock on status change
pub async fn update_order(
    pool: &SqlitePool,
    id: i64,
    patch: OutboundOrderUpdate,
    actor: Option<i64>,
) -> AppResult<OutboundOrderDetail> {
    let mut tx = pool.begin().await?;

    let current = outbound::lock_order(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound order {id}")))?;
    let was_applied = current.status.is_applied();

    let moves_client = patch.client_id.is_some_and(|c| c != current.client_id);
    let moves_warehouse = patch.warehouse_id.is_some_and(|w| w != current.warehouse_id);
    if was_applied && (moves_client || moves_warehouse) {
        return Err(AppError::order_locked_fields(id));
    }

    let next = merge_patch(&current, &patch);
    outbound::update_order(&mut tx, &next).await?;

    let created_by = actor.or(current.created_by);
    match LedgerTransition::between(was_applied, next.status.is_applied()) {
        LedgerTransition::Apply => apply(&mut tx, &next, created_by).await?,
        LedgerTransition::Rollback => rollback(&mut tx, &current).await?,
        LedgerTransition::Resync | LedgerTransition::Idle => {}
    }
    billing::sync_outbound_order_billing_event(&mut tx, id).await?;

    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    let action = outbound_action(current.status, next.status);
    tracing::info!(order_id = id, action, from = %current.status, to = %next.status, "Outbound order updated");
    append_log(
        pool,
        OrderKind::Outbound,
        OrderLogEntry {
            order_id: id,
            action: action.into(),
            from_status: Some(current.status.to_string()),
            to_status: Some(next.status.to_string()),
            note: patch.note,
            actor_user_id: created_by,
        },
    )
    .await;

    Ok(detail)
}

/// Soft-delete an order, restoring shipped stock first
pub async fn delete_order(pool: &SqlitePool, id: i64, actor: Option<i64>) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let current = outbound::lock_order(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound order {id}")))?;
    if current.status.is_applied() {
        rollback(&mut tx, &current).await?;
    }
    outbound::soft_delete_order(&mut tx, id).await?;
    billing::remove_billing_event(&mut tx, ReferenceType::Outbound, id).await?;
    tx.commit().await?;

    tracing::info!(order_id = id, "Outbound order deleted");
    append_log(
        pool,
        OrderKind::Outbound,
        OrderLogEntry {
            order_id: id,
            action: "delete".into(),
            from_status: Some(current.status.to_string()),
            to_status: None,
            note: None,
            actor_user_id: actor.or(current.created_by),
        },
    )
    .await;

    Ok(())
}

pub async fn get_order(pool: &SqlitePool, id: i64) -> AppResult<OutboundOrderDetail> {
    let mut conn = pool.acquire().await?;
    load_detail(&mut conn, id).await
}

fn merge_patch(current: &OutboundOrder, patch: &OutboundOrderUpdate) -> OutboundOrder {
    let mut next = current.clone();
    if let Some(order_no) = &patch.order_no {
        next.order_no = order_no.clone();
    }
    if let Some(client_id) = patch.client_id {
        next.client_id = client_id;
    }
    if let Some(warehouse_id) = patch.warehouse_id {
        next.warehouse_id = warehouse_id;
    }
    if let Some(status) = patch.status {
        next.status = status;
    }
    if let Some(order_date) = patch.order_date {
        next.order_date = order_date;
    }
    if let Some(note) = &patch.note {
        next.note = Some(note.clone());
    }

    let now = shared::util::now_millis();
    if next.status == OutboundStatus::Packed && current.status != OutboundStatus::Packed {
        next.packed_at = Some(now);
    }
    if next.status.is_applied() && !current.status.is_applied() {
        next.shipped_at = Some(now);
    }
    next
}

async fn load_order(conn: &mut SqliteConnection, id: i64) -> AppResult<OutboundOrder> {
    outbound::find_order(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbound order {id}")))
}

async fn load_detail(conn: &mut SqliteConnection, id: i64) -> AppResult<OutboundOrderDetail> {
    let order = load_order(conn, id).await?;
    let items = outbound::find_items(conn, id).await?;
    Ok(OutboundOrderDetail { order, items })
}

// ── Ledger effect ───────────────────────────────────────────

/// Ship every live item of the order
pub(crate) async fn apply(
    conn: &mut SqliteConnection,
    order: &OutboundOrder,
    created_by: Option<i64>,
) -> AppResult<()> {
    let items = outbound::find_items(conn, order.id).await?;
    for item in &items {
        apply_item(conn, order, item, created_by).await?;
    }
    tracing::debug!(order_id = order.id, items = items.len(), "Outbound order applied");
    Ok(())
}

/// Put every shipped item of the order back into stock
pub(crate) async fn rollback(conn: &mut SqliteConnection, order: &OutboundOrder) -> AppResult<()> {
    let items = outbound::find_items(conn, order.id).await?;
    for item in &items {
        rollback_item(conn, order, item).await?;
    }
    tracing::debug!(order_id = order.id, items = items.len(), "Outbound order rolled back");
    Ok(())
}

pub(crate) async fn apply_item(
    conn: &mut SqliteConnection,
    order: &OutboundOrder,
    item: &OutboundItem,
    created_by: Option<i64>,
) -> AppResult<i64> {
    let key = item_key(
        order.client_id,
        order.warehouse_id,
        item.product_id,
        item.lot_id,
        item.location_id,
    );
    ledger::adjust_available_qty(conn, &key, -item.qty).await?;
    let txn_id = ledger::upsert_stock_txn(
        conn,
        &StockTxnPayload {
            txn_type: TxnType::OutboundShip,
            ref_type: RefType::OutboundItem,
            ref_id: item.id,
            key,
            qty_in: 0,
            qty_out: item.qty,
            created_by,
            note: item.note.clone(),
        },
    )
    .await?;
    billing::upsert_outbound_service_event(conn, txn_id, order, item).await?;
    Ok(txn_id)
}

/// Reverse one item's shipment; items without a live transaction are skipped
pub(crate) async fn rollback_item(
    conn: &mut SqliteConnection,
    order: &OutboundOrder,
    item: &OutboundItem,
) -> AppResult<()> {
    let Some(txn_id) =
        ledger::get_stock_txn_id(conn, TxnType::OutboundShip, RefType::OutboundItem, item.id)
            .await?
    else {
        return Ok(());
    };
    let key = item_key(
        order.client_id,
        order.warehouse_id,
        item.product_id,
        item.lot_id,
        item.location_id,
    );
    ledger::adjust_available_qty(conn, &key, item.qty).await?;
    billing::soft_delete_outbound_service_event(conn, txn_id).await?;
    ledger::soft_delete_stock_txn(conn, txn_id).await
}
