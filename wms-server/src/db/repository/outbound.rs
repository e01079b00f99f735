//! Outbound Order Repository

use shared::error::AppResult;
use shared::models::{
    OutboundItem, OutboundItemCreate, OutboundOrder, OutboundOrderCreate, OutboundOrderQuery,
    OutboundStatus,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::clamp_limit;

const ORDER_COLUMNS: &str = "id, order_no, client_id, warehouse_id, status, order_date, packed_at, shipped_at, note, created_by, created_at, updated_at, deleted_at";
const ITEM_COLUMNS: &str = "id, outbound_order_id, product_id, lot_id, location_id, qty, box_type, box_count, note, created_at, updated_at, deleted_at";

// ── Orders ──────────────────────────────────────────────────

/// Live (not deleted) order
pub async fn find_order(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<OutboundOrder>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM outbound_orders WHERE id = ? AND deleted_at IS NULL");
    let order = sqlx::query_as::<_, OutboundOrder>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(order)
}

/// Lock the order header for the rest of the transaction, then load it
pub async fn lock_order(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<OutboundOrder>> {
    sqlx::query("UPDATE outbound_orders SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    find_order(conn, id).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<OutboundOrder>> {
    let mut conn = pool.acquire().await?;
    find_order(&mut conn, id).await
}

/// Live orders, newest first
pub async fn list_orders(pool: &SqlitePool, query: &OutboundOrderQuery) -> AppResult<Vec<OutboundOrder>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM outbound_orders \
         WHERE deleted_at IS NULL AND (?1 IS NULL OR client_id = ?1) AND (?2 IS NULL OR status = ?2) \
         ORDER BY id DESC LIMIT ?3"
    );
    let orders = sqlx::query_as::<_, OutboundOrder>(&sql)
        .bind(query.client_id)
        .bind(query.status)
        .bind(clamp_limit(query.limit))
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn insert_order(
    conn: &mut SqliteConnection,
    data: &OutboundOrderCreate,
    created_by: Option<i64>,
) -> AppResult<i64> {
    let now = shared::util::now_millis();
    let order_date = data.order_date.unwrap_or_else(shared::util::today);
    let packed_at = (data.status == OutboundStatus::Packed).then_some(now);
    let shipped_at = data.status.is_applied().then_some(now);
    let id = sqlx::query_scalar(
        "INSERT INTO outbound_orders (order_no, client_id, warehouse_id, status, order_date, packed_at, shipped_at, note, created_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) RETURNING id",
    )
    .bind(&data.order_no)
    .bind(data.client_id)
    .bind(data.warehouse_id)
    .bind(data.status)
    .bind(order_date)
    .bind(packed_at)
    .bind(shipped_at)
    .bind(&data.note)
    .bind(created_by)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Persist every mutable header field of `order`
pub async fn update_order(conn: &mut SqliteConnection, order: &OutboundOrder) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE outbound_orders SET order_no = ?1, client_id = ?2, warehouse_id = ?3, status = ?4, order_date = ?5, packed_at = ?6, shipped_at = ?7, note = ?8, updated_at = ?9 WHERE id = ?10",
    )
    .bind(&order.order_no)
    .bind(order.client_id)
    .bind(order.warehouse_id)
    .bind(order.status)
    .bind(order.order_date)
    .bind(order.packed_at)
    .bind(order.shipped_at)
    .bind(&order.note)
    .bind(now)
    .bind(order.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn soft_delete_order(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE outbound_orders SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ── Items ───────────────────────────────────────────────────

/// Live items of an order
pub async fn find_items(conn: &mut SqliteConnection, order_id: i64) -> AppResult<Vec<OutboundItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM outbound_items WHERE outbound_order_id = ? AND deleted_at IS NULL ORDER BY id"
    );
    let items = sqlx::query_as::<_, OutboundItem>(&sql)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(items)
}

pub async fn find_items_by_order(pool: &SqlitePool, order_id: i64) -> AppResult<Vec<OutboundItem>> {
    let mut conn = pool.acquire().await?;
    find_items(&mut conn, order_id).await
}

/// Sum of live item quantities
pub async fn sum_item_qty(conn: &mut SqliteConnection, order_id: i64) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(qty), 0) FROM outbound_items WHERE outbound_order_id = ? AND deleted_at IS NULL",
    )
    .bind(order_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(total)
}

/// Live item
pub async fn find_item(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<OutboundItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM outbound_items WHERE id = ? AND deleted_at IS NULL");
    let item = sqlx::query_as::<_, OutboundItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

/// Lock an item for the rest of the transaction, then load it
pub async fn lock_item(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<OutboundItem>> {
    sqlx::query("UPDATE outbound_items SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    find_item(conn, id).await
}

pub async fn find_item_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<OutboundItem>> {
    let mut conn = pool.acquire().await?;
    find_item(&mut conn, id).await
}

pub async fn insert_item(conn: &mut SqliteConnection, data: &OutboundItemCreate) -> AppResult<i64> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar(
        "INSERT INTO outbound_items (outbound_order_id, product_id, lot_id, location_id, qty, box_type, box_count, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id",
    )
    .bind(data.outbound_order_id)
    .bind(data.product_id)
    .bind(data.lot_id)
    .bind(data.location_id)
    .bind(data.qty)
    .bind(&data.box_type)
    .bind(data.box_count)
    .bind(&data.note)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Persist every mutable field of `item`
pub async fn update_item(conn: &mut SqliteConnection, item: &OutboundItem) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE outbound_items SET outbound_order_id = ?1, product_id = ?2, lot_id = ?3, location_id = ?4, qty = ?5, box_type = ?6, box_count = ?7, note = ?8, updated_at = ?9 WHERE id = ?10",
    )
    .bind(item.outbound_order_id)
    .bind(item.product_id)
    .bind(item.lot_id)
    .bind(item.location_id)
    .bind(item.qty)
    .bind(&item.box_type)
    .bind(item.box_count)
    .bind(&item.note)
    .bind(now)
    .bind(item.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn soft_delete_item(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE outbound_items SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
