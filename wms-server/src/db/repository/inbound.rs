//! Inbound Order Repository

use shared::error::AppResult;
use shared::models::{
    InboundItem, InboundItemCreate, InboundOrder, InboundOrderCreate, InboundOrderQuery,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::clamp_limit;

const ORDER_COLUMNS: &str = "id, order_no, client_id, warehouse_id, status, inbound_date, received_at, note, created_by, created_at, updated_at, deleted_at";
const ITEM_COLUMNS: &str = "id, inbound_order_id, product_id, lot_id, location_id, qty, invoice_price, currency, note, created_at, updated_at, deleted_at";

// ── Orders ──────────────────────────────────────────────────

/// Live (not deleted) order
pub async fn find_order(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<InboundOrder>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM inbound_orders WHERE id = ? AND deleted_at IS NULL");
    let order = sqlx::query_as::<_, InboundOrder>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(order)
}

/// Lock the order header for the rest of the transaction, then load it
pub async fn lock_order(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<InboundOrder>> {
    sqlx::query("UPDATE inbound_orders SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    find_order(conn, id).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<InboundOrder>> {
    let mut conn = pool.acquire().await?;
    find_order(&mut conn, id).await
}

/// Live orders, newest first
pub async fn list_orders(pool: &SqlitePool, query: &InboundOrderQuery) -> AppResult<Vec<InboundOrder>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM inbound_orders \
         WHERE deleted_at IS NULL AND (?1 IS NULL OR client_id = ?1) AND (?2 IS NULL OR status = ?2) \
         ORDER BY id DESC LIMIT ?3"
    );
    let orders = sqlx::query_as::<_, InboundOrder>(&sql)
        .bind(query.client_id)
        .bind(query.status)
        .bind(clamp_limit(query.limit))
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn insert_order(
    conn: &mut SqliteConnection,
    data: &InboundOrderCreate,
    created_by: Option<i64>,
) -> AppResult<i64> {
    let now = shared::util::now_millis();
    let inbound_date = data.inbound_date.unwrap_or_else(shared::util::today);
    let received_at = data.status.is_applied().then_some(now);
    let id = sqlx::query_scalar(
        "INSERT INTO inbound_orders (order_no, client_id, warehouse_id, status, inbound_date, received_at, note, created_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id",
    )
    .bind(&data.order_no)
    .bind(data.client_id)
    .bind(data.warehouse_id)
    .bind(data.status)
    .bind(inbound_date)
    .bind(received_at)
    .bind(&data.note)
    .bind(created_by)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Persist every mutable header field of `order`
pub async fn update_order(conn: &mut SqliteConnection, order: &InboundOrder) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE inbound_orders SET order_no = ?1, client_id = ?2, warehouse_id = ?3, status = ?4, inbound_date = ?5, received_at = ?6, note = ?7, updated_at = ?8 WHERE id = ?9",
    )
    .bind(&order.order_no)
    .bind(order.client_id)
    .bind(order.warehouse_id)
    .bind(order.status)
    .bind(order.inbound_date)
    .bind(order.received_at)
    .bind(&order.note)
    .bind(now)
    .bind(order.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn soft_delete_order(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE inbound_orders SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ── Items ───────────────────────────────────────────────────

/// Live items of an order
pub async fn find_items(conn: &mut SqliteConnection, order_id: i64) -> AppResult<Vec<InboundItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM inbound_items WHERE inbound_order_id = ? AND deleted_at IS NULL ORDER BY id"
    );
    let items = sqlx::query_as::<_, InboundItem>(&sql)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(items)
}

pub async fn find_items_by_order(pool: &SqlitePool, order_id: i64) -> AppResult<Vec<InboundItem>> {
    let mut conn = pool.acquire().await?;
    find_items(&mut conn, order_id).await
}

/// Sum of live item quantities
pub async fn sum_item_qty(conn: &mut SqliteConnection, order_id: i64) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(qty), 0) FROM inbound_items WHERE inbound_order_id = ? AND deleted_at IS NULL",
    )
    .bind(order_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(total)
}

/// Live item
pub async fn find_item(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<InboundItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM inbound_items WHERE id = ? AND deleted_at IS NULL");
    let item = sqlx::query_as::<_, InboundItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

/// Lock an item for the rest of the transaction, then load it
pub async fn lock_item(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<InboundItem>> {
    sqlx::query("UPDATE inbound_items SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    find_item(conn, id).await
}

pub async fn find_item_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<InboundItem>> {
    let mut conn = pool.acquire().await?;
    find_item(&mut conn, id).await
}

pub async fn insert_item(conn: &mut SqliteConnection, data: &InboundItemCreate) -> AppResult<i64> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar(
        "INSERT INTO inbound_items (inbound_order_id, product_id, lot_id, location_id, qty, invoice_price, currency, note, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id",
    )
    .bind(data.inbound_order_id)
    .bind(data.product_id)
    .bind(data.lot_id)
    .bind(data.location_id)
    .bind(data.qty)
    .bind(data.invoice_price)
    .bind(&data.currency)
    .bind(&data.note)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Persist every mutable field of `item`
pub async fn update_item(conn: &mut SqliteConnection, item: &InboundItem) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE inbound_items SET inbound_order_id = ?1, product_id = ?2, lot_id = ?3, location_id = ?4, qty = ?5, invoice_price = ?6, currency = ?7, note = ?8, updated_at = ?9 WHERE id = ?10",
    )
    .bind(item.inbound_order_id)
    .bind(item.product_id)
    .bind(item.lot_id)
    .bind(item.location_id)
    .bind(item.qty)
    .bind(item.invoice_price)
    .bind(&item.currency)
    .bind(&item.note)
    .bind(now)
    .bind(item.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn soft_delete_item(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE inbound_items SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;
    use shared::error::ErrorCode;
    use shared::models::InboundStatus;

    fn order(order_no: &str, status: InboundStatus) -> InboundOrderCreate {
        InboundOrderCreate {
            order_no: order_no.into(),
            client_id: 1,
            warehouse_id: 1,
            status,
            inbound_date: None,
            note: None,
            items: vec![],
        }
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

    #[tokio::test]
    async fn test_insert_and_find_order() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = insert_order(&mut conn, &order("IN-1", InboundStatus::Draft), Some(3))
            .await
            .unwrap();

        let found = find_order(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(found.order_no, "IN-1");
        assert_eq!(found.status, InboundStatus::Draft);
        assert_eq!(found.created_by, Some(3));
        assert!(found.received_at.is_none());
        assert_eq!(found.inbound_date, shared::util::today());
    }

    #[tokio::test]
    async fn test_insert_received_sets_received_at() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = insert_order(&mut conn, &order("IN-1", InboundStatus::Received), None)
            .await
            .unwrap();
        assert!(find_order(&mut conn, id).await.unwrap().unwrap().received_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_order_no() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        insert_order(&mut conn, &order("IN-1", InboundStatus::Draft), None)
            .await
            .unwrap();
        let err = insert_order(&mut conn, &order("IN-1", InboundStatus::Draft), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }

    #[tokio::test]
    async fn test_unknown_client_is_invalid_reference() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut data = order("IN-1", InboundStatus::Draft);
        data.client_id = 99;
        let err = insert_order(&mut conn, &data, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidReference);
    }

    #[tokio::test]
    async fn test_items_and_sum() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = insert_order(&mut conn, &order("IN-1", InboundStatus::Draft), None)
            .await
            .unwrap();
        let a = insert_item(&mut conn, &item(order_id, 4)).await.unwrap();
        insert_item(&mut conn, &item(order_id, 6)).await.unwrap();
        assert_eq!(sum_item_qty(&mut conn, order_id).await.unwrap(), 10);

        soft_delete_item(&mut conn, a).await.unwrap();
        assert_eq!(sum_item_qty(&mut conn, order_id).await.unwrap(), 6);
        assert_eq!(find_items(&mut conn, order_id).await.unwrap().len(), 1);
        assert!(find_item(&mut conn, a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_deleted_order_is_hidden() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = insert_order(&mut conn, &order("IN-1", InboundStatus::Draft), None)
            .await
            .unwrap();
        soft_delete_order(&mut conn, id).await.unwrap();
        assert!(lock_order(&mut conn, id).await.unwrap().is_none());
        drop(conn);

        let listed = list_orders(&pool, &InboundOrderQuery::default()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        insert_order(&mut conn, &order("IN-1", InboundStatus::Draft), None)
            .await
            .unwrap();
        insert_order(&mut conn, &order("IN-2", InboundStatus::Received), None)
            .await
            .unwrap();
        drop(conn);

        let query = InboundOrderQuery {
            status: Some(InboundStatus::Received),
            ..Default::default()
        };
        let listed = list_orders(&pool, &query).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order_no, "IN-2");
    }
}
