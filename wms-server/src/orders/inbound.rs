//! Inbound order lifecycle
//!
//! Items of a `received` order are on hand: entering `received` adds every
//! item to stock, leaving it takes them back out.

use shared::error::{AppError, AppResult};
use shared::models::{
    InboundItem, InboundItemCreate, InboundOrder, InboundOrderCreate, InboundOrderDetail,
    InboundOrderUpdate, InboundStatus, OrderLogEntry, RefType, ReferenceType, StockTxnPayload,
    TxnType,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::status::{LedgerTransition, inbound_action};
use super::{append_log, item_key};
use crate::billing;
use crate::db::repository::{OrderKind, inbound, master};
use crate::ledger;

/// Create an order with its optional items
///
/// An order created directly as `received` applies its items immediately.
pub async fn create_order(
    pool: &SqlitePool,
    data: InboundOrderCreate,
    actor: Option<i64>,
) -> AppResult<InboundOrderDetail> {
    let mut tx = pool.begin().await?;

    let order_id = inbound::insert_order(&mut tx, &data, actor).await?;
    for input in data.items.iter().cloned() {
        master::ensure_lot_product(&mut tx, input.lot_id, input.product_id).await?;
        inbound::insert_item(&mut tx, &InboundItemCreate::from_input(order_id, input)).await?;
    }

    let order = load_order(&mut tx, order_id).await?;
    if order.status.is_applied() {
        apply(&mut tx, &order, actor).await?;
    }
    billing::sync_inbound_order_billing_event(&mut tx, order_id).await?;

    let detail = load_detail(&mut tx, order_id).await?;
    tx.commit().await?;

    tracing::info!(order_id, order_no = %detail.order.order_no, status = %detail.order.status, "Inbound order created");
    append_log(
        pool,
        OrderKind::Inbound,
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

/// Patch an order header, applying or rolling back stock on status change
pub async fn update_order(
    pool: &SqlitePool,
    id: i64,
    patch: InboundOrderUpdate,
    actor: Option<i64>,
) -> AppResult<InboundOrderDetail> {
    let mut tx = pool.begin().await?;

    let current = inbound::lock_order(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound order {id}")))?;
    let was_applied = current.status.is_applied();

    let moves_client = patch.client_id.is_some_and(|c| c != current.client_id);
    let moves_warehouse = patch.warehouse_id.is_some_and(|w| w != current.warehouse_id);
    if was_applied && (moves_client || moves_warehouse) {
        return Err(AppError::order_locked_fields(id));
    }

    let next = merge_patch(&current, &patch);
    inbound::update_order(&mut tx, &next).await?;

    let created_by = actor.or(current.created_by);
    match LedgerTransition::between(was_applied, next.status.is_applied()) {
        LedgerTransition::Apply => apply(&mut tx, &next, created_by).await?,
        LedgerTransition::Rollback => rollback(&mut tx, &current).await?,
        LedgerTransition::Resync | LedgerTransition::Idle => {}
    }
    billing::sync_inbound_order_billing_event(&mut tx, id).await?;

    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    let action = inbound_action(current.status, next.status);
    tracing::info!(order_id = id, action, from = %current.status, to = %next.status, "Inbound order updated");
    append_log(
        pool,
        OrderKind::Inbound,
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

/// Soft-delete an order, taking received stock back out first
pub async fn delete_order(pool: &SqlitePool, id: i64, actor: Option<i64>) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let current = inbound::lock_order(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound order {id}")))?;
    if current.status.is_applied() {
        rollback(&mut tx, &current).await?;
    }
    inbound::soft_delete_order(&mut tx, id).await?;
    billing::remove_billing_event(&mut tx, ReferenceType::Inbound, id).await?;
    tx.commit().await?;

    tracing::info!(order_id = id, "Inbound order deleted");
    append_log(
        pool,
        OrderKind::Inbound,
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

/// Order header with its live items
pub async fn get_order(pool: &SqlitePool, id: i64) -> AppResult<InboundOrderDetail> {
    let mut conn = pool.acquire().await?;
    load_detail(&mut conn, id).await
}

fn merge_patch(current: &InboundOrder, patch: &InboundOrderUpdate) -> InboundOrder {
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
    if let Some(inbound_date) = patch.inbound_date {
        next.inbound_date = inbound_date;
    }
    if let Some(note) = &patch.note {
        next.note = Some(note.clone());
    }
    if next.status == InboundStatus::Received && !current.status.is_applied() {
        next.received_at = Some(shared::util::now_millis());
    }
    next
}

async fn load_order(conn: &mut SqliteConnection, id: i64) -> AppResult<InboundOrder> {
    inbound::find_order(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound order {id}")))
}

async fn load_detail(conn: &mut SqliteConnection, id: i64) -> AppResult<InboundOrderDetail> {
    let order = load_order(conn, id).await?;
    let items = inbound::find_items(conn, id).await?;
    Ok(InboundOrderDetail { order, items })
}

// ── Ledger effect ───────────────────────────────────────────

/// Receive every live item of the order into stock
pub(crate) async fn apply(
    conn: &mut SqliteConnection,
    order: &InboundOrder,
    created_by: Option<i64>,
) -> AppResult<()> {
    let items = inbound::find_items(conn, order.id).await?;
    for item in &items {
        apply_item(conn, order, item, created_by).await?;
    }
    tracing::debug!(order_id = order.id, items = items.len(), "Inbound order applied");
    Ok(())
}

/// Take every received item of the order back out of stock
pub(crate) async fn rollback(conn: &mut SqliteConnection, order: &InboundOrder) -> AppResult<()> {
    let items = inbound::find_items(conn, order.id).await?;
    for item in &items {
        rollback_item(conn, order, item).await?;
    }
    tracing::debug!(order_id = order.id, items = items.len(), "Inbound order rolled back");
    Ok(())
}

pub(crate) async fn apply_item(
    conn: &mut SqliteConnection,
    order: &InboundOrder,
    item: &InboundItem,
    created_by: Option<i64>,
) -> AppResult<i64> {
    let key = item_key(
        order.client_id,
        order.warehouse_id,
        item.product_id,
        item.lot_id,
        item.location_id,
    );
    ledger::adjust_available_qty(conn, &key, item.qty).await?;
    record_receipt(conn, order, item, created_by).await
}

/// Upsert the `inbound_receive` transaction of an item without touching stock
pub(crate) async fn record_receipt(
    conn: &mut SqliteConnection,
    order: &InboundOrder,
    item: &InboundItem,
    created_by: Option<i64>,
) -> AppResult<i64> {
    ledger::upsert_stock_txn(
        conn,
        &StockTxnPayload {
            txn_type: TxnType::InboundReceive,
            ref_type: RefType::InboundItem,
            ref_id: item.id,
            key: item_key(
                order.client_id,
                order.warehouse_id,
                item.product_id,
                item.lot_id,
                item.location_id,
            ),
            qty_in: item.qty,
            qty_out: 0,
            created_by,
            note: item.note.clone(),
        },
    )
    .await
}

/// Reverse one item's receipt; items without a live transaction are skipped
pub(crate) async fn rollback_item(
    conn: &mut SqliteConnection,
    order: &InboundOrder,
    item: &InboundItem,
) -> AppResult<()> {
    let Some(txn_id) =
        ledger::get_stock_txn_id(conn, TxnType::InboundReceive, RefType::InboundItem, item.id)
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
    ledger::adjust_available_qty(conn, &key, -item.qty).await?;
    ledger::soft_delete_stock_txn(conn, txn_id).await
}
