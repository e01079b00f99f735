//! Outbound service events
//!
//! One row per shipped outbound item, keyed by the item's stock transaction.

use shared::error::AppResult;
use shared::models::{OUTBOUND_SHIP, OutboundItem, OutboundOrder, ServiceEvent};
use shared::util::millis_to_date;
use sqlx::{SqliteConnection, SqlitePool};

/// Insert or refresh (and resurrect) the service event of a stock transaction
pub async fn upsert_outbound_service_event(
    conn: &mut SqliteConnection,
    stock_txn_id: i64,
    order: &OutboundOrder,
    item: &OutboundItem,
) -> AppResult<i64> {
    let now = shared::util::now_millis();
    let event_date = order
        .shipped_at
        .and_then(millis_to_date)
        .unwrap_or(order.order_date);
    let id = sqlx::query_scalar(
        "INSERT INTO outbound_service_events (stock_txn_id, outbound_order_id, outbound_item_id, client_id, warehouse_id, service_code, qty, box_count, event_date, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) \
         ON CONFLICT (stock_txn_id) DO UPDATE SET \
            outbound_order_id = excluded.outbound_order_id, outbound_item_id = excluded.outbound_item_id, \
            client_id = excluded.client_id, warehouse_id = excluded.warehouse_id, \
            qty = excluded.qty, box_count = excluded.box_count, event_date = excluded.event_date, \
            updated_at = excluded.updated_at, deleted_at = NULL \
         RETURNING id",
    )
    .bind(stock_txn_id)
    .bind(order.id)
    .bind(item.id)
    .bind(order.client_id)
    .bind(order.warehouse_id)
    .bind(OUTBOUND_SHIP)
    .bind(item.qty)
    .bind(item.box_count)
    .bind(event_date)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Soft-delete the service event of a stock transaction (idempotent)
pub async fn soft_delete_outbound_service_event(
    conn: &mut SqliteConnection,
    stock_txn_id: i64,
) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE outbound_service_events SET deleted_at = ?1, updated_at = ?1 WHERE stock_txn_id = ?2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(stock_txn_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Service events of an outbound order, including removed ones
pub async fn list_for_order(pool: &SqlitePool, outbound_order_id: i64) -> AppResult<Vec<ServiceEvent>> {
    let events = sqlx::query_as::<_, ServiceEvent>(
        "SELECT id, stock_txn_id, outbound_order_id, outbound_item_id, client_id, warehouse_id, service_code, qty, box_count, event_date, created_at, updated_at, deleted_at \
         FROM outbound_service_events WHERE outbound_order_id = ? ORDER BY id",
    )
    .bind(outbound_order_id)
    .fetch_all(pool)
    .await?;
    Ok(events)
}
