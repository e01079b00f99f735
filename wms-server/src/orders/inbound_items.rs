//! Inbound line items
//!
//! Items stay editable after receipt. While the owning order is received,
//! every edit reverses the item's previous stock effect and applies the new
//! one, including moves to another order.

use shared::error::{AppError, AppResult};
use shared::models::{
    InboundItem, InboundItemCreate, InboundItemUpdate, InboundOrder, OrderLogEntry,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::inbound::{apply_item, record_receipt, rollback_item};
use super::{append_log, item_key, item_note};
use crate::billing;
use crate::db::repository::{OrderKind, inbound, master};
use crate::ledger;

pub async fn create_item(
    pool: &SqlitePool,
    data: InboundItemCreate,
    actor: Option<i64>,
) -> AppResult<InboundItem> {
    let mut tx = pool.begin().await?;

    let order = lock_owner(&mut tx, data.inbound_order_id).await?;
    master::ensure_lot_product(&mut tx, data.lot_id, data.product_id).await?;
    let id = inbound::insert_item(&mut tx, &data).await?;
    let item = load_item(&mut tx, id).await?;

    let created_by = actor.or(order.created_by);
    if order.status.is_applied() {
        apply_item(&mut tx, &order, &item, created_by).await?;
    }
    billing::sync_inbound_order_billing_event(&mut tx, order.id).await?;
    tx.commit().await?;

    tracing::info!(item_id = id, order_id = order.id, qty = item.qty, "Inbound item created");
    append_log(pool, OrderKind::Inbound, item_entry(&order, "item_create", &item, created_by)).await;

    Ok(item)
}

/// Patch an item, replaying its stock effect and moving it between orders
pub async fn update_item(
    pool: &SqlitePool,
    id: i64,
    patch: InboundItemUpdate,
    actor: Option<i64>,
) -> AppResult<InboundItem> {
    let mut tx = pool.begin().await?;

    let current = inbound::lock_item(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound item {id}")))?;
    let source = lock_owner(&mut tx, current.inbound_order_id).await?;
    let target = match patch.inbound_order_id {
        Some(order_id) if order_id != source.id => lock_owner(&mut tx, order_id).await?,
        _ => source.clone(),
    };
    let moved = target.id != source.id;

    let next = merge_patch(&current, &patch);
    master::ensure_lot_product(&mut tx, next.lot_id, next.product_id).await?;

    let created_by = actor.or(target.created_by);
    let same_key = !moved
        && current.product_id == next.product_id
        && current.lot_id == next.lot_id
        && current.location_id == next.location_id;

    if same_key && source.status.is_applied() {
        let key = item_key(
            source.client_id,
            source.warehouse_id,
            next.product_id,
            next.lot_id,
            next.location_id,
        );
        let delta = next.qty - current.qty;
        if delta != 0 {
            ledger::adjust_available_qty(&mut tx, &key, delta).await?;
        }
        record_receipt(&mut tx, &source, &next, created_by).await?;
    } else {
        if source.status.is_applied() {
            rollback_item(&mut tx, &source, &current).await?;
        }
        if target.status.is_applied() {
            apply_item(&mut tx, &target, &next, created_by).await?;
        }
    }

    inbound::update_item(&mut tx, &next).await?;
    billing::sync_inbound_order_billing_event(&mut tx, source.id).await?;
    if moved {
        billing::sync_inbound_order_billing_event(&mut tx, target.id).await?;
    }

    let item = load_item(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(item_id = id, from_order = source.id, to_order = target.id, qty = item.qty, "Inbound item updated");
    if moved {
        append_log(pool, OrderKind::Inbound, item_entry(&source, "item_move_out", &item, created_by)).await;
        append_log(pool, OrderKind::Inbound, item_entry(&target, "item_move_in", &item, created_by)).await;
    } else {
        append_log(pool, OrderKind::Inbound, item_entry(&source, "item_update", &item, created_by)).await;
    }

    Ok(item)
}

/// Soft-delete an item, taking its receipt back out of stock first
pub async fn delete_item(pool: &SqlitePool, id: i64, actor: Option<i64>) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let item = inbound::lock_item(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound item {id}")))?;
    let order = lock_owner(&mut tx, item.inbound_order_id).await?;

    if order.status.is_applied() {
        rollback_item(&mut tx, &order, &item).await?;
    }
    inbound::soft_delete_item(&mut tx, id).await?;
    billing::sync_inbound_order_billing_event(&mut tx, order.id).await?;
    tx.commit().await?;

    tracing::info!(item_id = id, order_id = order.id, "Inbound item deleted");
    let created_by = actor.or(order.created_by);
    append_log(pool, OrderKind::Inbound, item_entry(&order, "item_delete", &item, created_by)).await;

    Ok(())
}

pub async fn get_item(pool: &SqlitePool, id: i64) -> AppResult<InboundItem> {
    inbound::find_item_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound item {id}")))
}

async fn lock_owner(conn: &mut SqliteConnection, order_id: i64) -> AppResult<InboundOrder> {
    inbound::lock_order(conn, order_id)
        .await?
        .ok_or_else(|| AppError::invalid_order(order_id))
}

async fn load_item(conn: &mut SqliteConnection, id: i64) -> AppResult<InboundItem> {
    inbound::find_item(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inbound item {id}")))
}

fn merge_patch(current: &InboundItem, patch: &InboundItemUpdate) -> InboundItem {
    let mut next = current.clone();
    if let Some(order_id) = patch.inbound_order_id {
        next.inbound_order_id = order_id;
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
    if patch.invoice_price.is_some() {
        next.invoice_price = patch.invoice_price;
    }
    if let Some(currency) = &patch.currency {
        next.currency = Some(currency.clone());
    }
    if let Some(note) = &patch.note {
        next.note = Some(note.clone());
    }
    next
}

fn item_entry(
    order: &InboundOrder,
    action: &str,
    item: &InboundItem,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order_log;
    use crate::db::testing::test_pool;
    use crate::orders::inbound as orders;
    use shared::error::ErrorCode;
    use shared::models::{InboundOrderCreate, InboundStatus, StockKey};

    fn key(location_id: Option<i64>) -> StockKey {
        item_key(1, 1, 5, 9, location_id)
    }

    async fn order(pool: &SqlitePool, order_no: &str, status: InboundStatus) -> i64 {
        orders::create_order(
            pool,
            InboundOrderCreate {
                order_no: order_no.into(),
                client_id: 1,
                warehouse_id: 1,
                status,
                inbound_date: None,
                note: None,
                items: vec![],
            },
            None,
        )
        .await
        .unwrap()
        .order
        .id
    }

    fn item(order_id: i64, qty: i64) -> InboundItemCreate {
        InboundItemCreate {
            inbound_order_id: order_id,
            product_id: 5,
            lot_id: 9,
            location_id: None,
            qty,
            invoice_price: Some(1.5),
            currency: Some("USD".into()),
            note: None,
        }
    }

    async fn live_txns(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM stock_transactions WHERE deleted_at IS NULL")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_on_received_order_applies() {
        let pool = test_pool().await;
        let order_id = order(&pool, "IN-1", InboundStatus::Received).await;
        let created = create_item(&pool, item(order_id, 6), Some(4)).await.unwrap();

        assert_eq!(ledger::available_qty(&pool, &key(None)).await.unwrap(), 6);
        assert_eq!(live_txns(&pool).await, 1);

        let logs = order_log::list(&pool, OrderKind::Inbound, order_id).await.unwrap();
        let last = logs.last().unwrap();
        assert_eq!(last.action, "item_create");
        assert_eq!(last.note.as_deref(), Some(format!("item {} qty 6", created.id).as_str()));
    }

    #[tokio::test]
    async fn test_create_with_overflowing_qty_writes_nothing() {
        let pool = test_pool().await;
        let order_id = order(&pool, "IN-1", InboundStatus::Received).await;
        create_item(&pool, item(order_id, 5), None).await.unwrap();

        let err = create_item(&pool, item(order_id, i64::MAX), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        assert_eq!(ledger::available_qty(&pool, &key(None)).await.unwrap(), 5);
        assert_eq!(live_txns(&pool).await, 1);
        assert_eq!(orders::get_order(&pool, order_id).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_order_and_foreign_lot() {
        let pool = test_pool().await;
        let err = create_item(&pool, item(404, 1), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOrder);

        let order_id = order(&pool, "IN-1", InboundStatus::Draft).await;
        let mut data = item(order_id, 1);
        data.lot_id = 10;
        let err = create_item(&pool, data, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLotProduct);
    }

    #[tokio::test]
    async fn test_qty_edit_after_receipt_applies_net_delta() {
        let pool = test_pool().await;
        let order_id = order(&pool, "IN-1", InboundStatus::Received).await;
        let id = create_item(&pool, item(order_id, 10), None).await.unwrap().id;

        // drain part of the stock so a full reverse would go negative
        let mut conn = pool.acquire().await.unwrap();
        ledger::adjust_available_qty(&mut conn, &key(None), -7).await.unwrap();
        drop(conn);

        let patch = InboundItemUpdate {
            qty: Some(12),
            ..Default::default()
        };
        update_item(&pool, id, patch, None).await.unwrap();
        assert_eq!(ledger::available_qty(&pool, &key(None)).await.unwrap(), 5);

        let mut conn = pool.acquire().await.unwrap();
        let event = billing::sync_inbound_order_billing_event(&mut conn, order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.qty, 12);
    }

    #[tokio::test]
    async fn test_location_change_moves_stock() {
        let pool = test_pool().await;
        let order_id = order(&pool, "IN-1", InboundStatus::Received).await;
        let id = create_item(&pool, item(order_id, 4), None).await.unwrap().id;

        let patch = InboundItemUpdate {
            location_id: Some(Some(3)),
            ..Default::default()
        };
        update_item(&pool, id, patch, None).await.unwrap();
        assert_eq!(ledger::available_qty(&pool, &key(None)).await.unwrap(), 0);
        assert_eq!(ledger::available_qty(&pool, &key(Some(3))).await.unwrap(), 4);
        assert_eq!(live_txns(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_move_to_draft_order() {
        let pool = test_pool().await;
        let source = order(&pool, "IN-1", InboundStatus::Received).await;
        let target = order(&pool, "IN-3", InboundStatus::Draft).await;
        let id = create_item(&pool, item(source, 10), None).await.unwrap().id;

        let patch = InboundItemUpdate {
            inbound_order_id: Some(target),
            ..Default::default()
        };
        let moved = update_item(&pool, id, patch, Some(2)).await.unwrap();
        assert_eq!(moved.inbound_order_id, target);
        assert_eq!(ledger::available_qty(&pool, &key(None)).await.unwrap(), 0);
        assert_eq!(live_txns(&pool).await, 0);

        let live_events: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM billing_events WHERE deleted_at IS NULL")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(live_events, 0);

        let out = order_log::list(&pool, OrderKind::Inbound, source).await.unwrap();
        assert_eq!(out.last().unwrap().action, "item_move_out");
        let into = order_log::list(&pool, OrderKind::Inbound, target).await.unwrap();
        assert_eq!(into.last().unwrap().action, "item_move_in");
    }

    #[tokio::test]
    async fn test_update_missing_item_and_order() {
        let pool = test_pool().await;
        let err = update_item(&pool, 999, InboundItemUpdate::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let order_id = order(&pool, "IN-1", InboundStatus::Draft).await;
        let id = create_item(&pool, item(order_id, 1), None).await.unwrap().id;
        let patch = InboundItemUpdate {
            inbound_order_id: Some(999),
            ..Default::default()
        };
        let err = update_item(&pool, id, patch, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOrder);
    }

    #[tokio::test]
    async fn test_delete_received_item_reverses_receipt() {
        let pool = test_pool().await;
        let order_id = order(&pool, "IN-1", InboundStatus::Received).await;
        let id = create_item(&pool, item(order_id, 3), None).await.unwrap().id;

        delete_item(&pool, id, None).await.unwrap();
        assert_eq!(ledger::available_qty(&pool, &key(None)).await.unwrap(), 0);
        assert_eq!(live_txns(&pool).await, 0);
        assert_eq!(get_item(&pool, id).await.unwrap_err().code, ErrorCode::NotFound);

        // the order has no quantity left to bill
        let live_events: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM billing_events WHERE deleted_at IS NULL")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(live_events, 0);
    }
}
