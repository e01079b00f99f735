//! Billing Event Synchronizer
//!
//! Recomputes the single billing fact of an order from its current state.
//! Safe to call any number of times; it always converges to one live row
//! for a billable order with items, and none otherwise.

use chrono::NaiveDate;
use shared::error::{AppError, AppResult};
use shared::models::{BillingEvent, BillingEventQuery, KRW_FIXED, ReferenceType};
use shared::util::millis_to_date;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{inbound, outbound};

const EVENT_COLUMNS: &str = "id, client_id, warehouse_id, reference_type, reference_id, service_code, qty, event_date, pricing_policy, unit_price_krw, amount_krw, created_at, updated_at, deleted_at";

/// Order facts the billing event is derived from
#[derive(Debug, Clone)]
struct BillingSource {
    reference_type: ReferenceType,
    reference_id: i64,
    client_id: i64,
    warehouse_id: i64,
    billable: bool,
    event_date: NaiveDate,
}

/// Resync the `INBOUND_FEE` event of an inbound order
///
/// Returns the live event, or `None` when the order is missing, not
/// received, or has no quantity.
pub async fn sync_inbound_order_billing_event(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> AppResult<Option<BillingEvent>> {
    let Some(order) = inbound::find_order(conn, order_id).await? else {
        return Ok(None);
    };
    let source = BillingSource {
        reference_type: ReferenceType::Inbound,
        reference_id: order.id,
        client_id: order.client_id,
        warehouse_id: order.warehouse_id,
        billable: order.status.is_applied(),
        event_date: order
            .received_at
            .and_then(millis_to_date)
            .unwrap_or(order.inbound_date),
    };
    let total_qty = if source.billable {
        inbound::sum_item_qty(conn, order.id).await?
    } else {
        0
    };
    converge(conn, &source, total_qty).await
}

/// Resync the `OUTBOUND_FEE` event of an outbound order
pub async fn sync_outbound_order_billing_event(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> AppResult<Option<BillingEvent>> {
    let Some(order) = outbound::find_order(conn, order_id).await? else {
        return Ok(None);
    };
    let source = BillingSource {
        reference_type: ReferenceType::Outbound,
        reference_id: order.id,
        client_id: order.client_id,
        warehouse_id: order.warehouse_id,
        billable: order.status.is_applied(),
        event_date: order
            .shipped_at
            .and_then(millis_to_date)
            .unwrap_or(order.order_date),
    };
    let total_qty = if source.billable {
        outbound::sum_item_qty(conn, order.id).await?
    } else {
        0
    };
    converge(conn, &source, total_qty).await
}

async fn converge(
    conn: &mut SqliteConnection,
    source: &BillingSource,
    total_qty: i64,
) -> AppResult<Option<BillingEvent>> {
    if !source.billable || total_qty <= 0 {
        remove_billing_event(conn, source.reference_type, source.reference_id).await?;
        return Ok(None);
    }

    let service_code = source.reference_type.service_code();
    let now = shared::util::now_millis();

    // Prefer the live row; otherwise bring back the most recent removed one
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM billing_events WHERE reference_type = ? AND reference_id = ? AND service_code = ? \
         ORDER BY deleted_at IS NULL DESC, id DESC LIMIT 1",
    )
    .bind(source.reference_type)
    .bind(source.reference_id)
    .bind(service_code)
    .fetch_optional(&mut *conn)
    .await?;

    let id = match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE billing_events SET client_id = ?1, warehouse_id = ?2, qty = ?3, event_date = ?4, updated_at = ?5, deleted_at = NULL WHERE id = ?6",
            )
            .bind(source.client_id)
            .bind(source.warehouse_id)
            .bind(total_qty)
            .bind(source.event_date)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            id
        }
        None => {
            sqlx::query_scalar(
                "INSERT INTO billing_events (client_id, warehouse_id, reference_type, reference_id, service_code, qty, event_date, pricing_policy, unit_price_krw, amount_krw, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 0, ?9, ?9) RETURNING id",
            )
            .bind(source.client_id)
            .bind(source.warehouse_id)
            .bind(source.reference_type)
            .bind(source.reference_id)
            .bind(service_code)
            .bind(total_qty)
            .bind(source.event_date)
            .bind(KRW_FIXED)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    tracing::debug!(
        reference_type = source.reference_type.as_str(),
        order_id = source.reference_id,
        qty = total_qty,
        "Billing event synced"
    );

    let sql = format!("SELECT {EVENT_COLUMNS} FROM billing_events WHERE id = ?");
    let event = sqlx::query_as::<_, BillingEvent>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(Some(event))
}

/// Soft-delete the live fee event of an order, returning whether one existed
pub async fn remove_billing_event(
    conn: &mut SqliteConnection,
    reference_type: ReferenceType,
    reference_id: i64,
) -> AppResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE billing_events SET deleted_at = ?1, updated_at = ?1 \
         WHERE reference_type = ?2 AND reference_id = ?3 AND service_code = ?4 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(reference_type)
    .bind(reference_id)
    .bind(reference_type.service_code())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Live billing events for invoicing, oldest event first
///
/// `month` is `YYYY-MM` and selects events whose `event_date` falls in it.
pub async fn list_billing_events(
    pool: &SqlitePool,
    query: &BillingEventQuery,
) -> AppResult<Vec<BillingEvent>> {
    let range = query.month.as_deref().map(month_range).transpose()?;
    let (from, until) = match range {
        Some((from, until)) => (Some(from), Some(until)),
        None => (None, None),
    };

    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM billing_events \
         WHERE deleted_at IS NULL AND (?1 IS NULL OR client_id = ?1) AND (?2 IS NULL OR service_code = ?2) \
         AND (?3 IS NULL OR event_date >= ?3) AND (?4 IS NULL OR event_date < ?4) \
         ORDER BY event_date, id"
    );
    let events = sqlx::query_as::<_, BillingEvent>(&sql)
        .bind(query.client_id)
        .bind(&query.service_code)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?;
    Ok(events)
}

/// `[first day, first day of next month)` of a `YYYY-MM` string
fn month_range(month: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::validation(format!("month must be YYYY-MM, got {month}"));
    let (year, mon) = month.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let mon: u32 = mon.parse().map_err(|_| invalid())?;
    let from = NaiveDate::from_ymd_opt(year, mon, 1).ok_or_else(invalid)?;
    let until = if mon == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, mon + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((from, until))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;
    use shared::error::ErrorCode;
    use shared::models::{
        INBOUND_FEE, InboundItemCreate, InboundOrderCreate, InboundStatus,
    };

    async fn seed_order(conn: &mut SqliteConnection, status: InboundStatus, qty: &[i64]) -> i64 {
        let order_id = inbound::insert_order(
            conn,
            &InboundOrderCreate {
                order_no: "IN-1".into(),
                client_id: 1,
                warehouse_id: 1,
                status,
                inbound_date: NaiveDate::from_ymd_opt(2024, 3, 10),
                note: None,
                items: vec![],
            },
            None,
        )
        .await
        .unwrap();
        for q in qty {
            inbound::insert_item(
                conn,
                &InboundItemCreate {
                    inbound_order_id: order_id,
                    product_id: 5,
                    lot_id: 9,
                    location_id: None,
                    qty: *q,
                    invoice_price: None,
                    currency: None,
                    note: None,
                },
            )
            .await
            .unwrap();
        }
        order_id
    }

    async fn count_events(conn: &mut SqliteConnection, live_only: bool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM billing_events WHERE (? = 0 OR deleted_at IS NULL)")
            .bind(live_only)
            .fetch_one(&mut *conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sync_creates_single_event() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = seed_order(&mut conn, InboundStatus::Received, &[4, 6]).await;

        let event = sync_inbound_order_billing_event(&mut conn, order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.service_code, INBOUND_FEE);
        assert_eq!(event.qty, 10);
        assert_eq!(event.pricing_policy, KRW_FIXED);
        assert_eq!(event.amount_krw, 0);

        // redundant calls converge on the same row
        let again = sync_inbound_order_billing_event(&mut conn, order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.id, event.id);
        assert_eq!(count_events(&mut conn, false).await, 1);
    }

    #[tokio::test]
    async fn test_not_billable_removes_event() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = seed_order(&mut conn, InboundStatus::Received, &[5]).await;
        sync_inbound_order_billing_event(&mut conn, order_id).await.unwrap();

        sqlx::query("UPDATE inbound_orders SET status = 'cancelled' WHERE id = ?")
            .bind(order_id)
            .execute(&mut *conn)
            .await
            .unwrap();
        let synced = sync_inbound_order_billing_event(&mut conn, order_id).await.unwrap();
        assert!(synced.is_none());
        assert_eq!(count_events(&mut conn, true).await, 0);

        // back to received: the removed row is reused, not duplicated
        sqlx::query("UPDATE inbound_orders SET status = 'received' WHERE id = ?")
            .bind(order_id)
            .execute(&mut *conn)
            .await
            .unwrap();
        sync_inbound_order_billing_event(&mut conn, order_id).await.unwrap();
        assert_eq!(count_events(&mut conn, true).await, 1);
        assert_eq!(count_events(&mut conn, false).await, 1);
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_event() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = seed_order(&mut conn, InboundStatus::Received, &[]).await;
        let synced = sync_inbound_order_billing_event(&mut conn, order_id).await.unwrap();
        assert!(synced.is_none());
        assert_eq!(count_events(&mut conn, false).await, 0);
    }

    #[tokio::test]
    async fn test_missing_order_is_noop() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        assert!(sync_outbound_order_billing_event(&mut conn, 404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_month() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = seed_order(&mut conn, InboundStatus::Received, &[3]).await;
        // received_at drives the event date; pin it to March 2024
        sqlx::query("UPDATE inbound_orders SET received_at = 1710504000000 WHERE id = ?")
            .bind(order_id)
            .execute(&mut *conn)
            .await
            .unwrap();
        sync_inbound_order_billing_event(&mut conn, order_id).await.unwrap();
        drop(conn);

        let march = BillingEventQuery {
            client_id: Some(1),
            month: Some("2024-03".into()),
            service_code: None,
        };
        assert_eq!(list_billing_events(&pool, &march).await.unwrap().len(), 1);

        let april = BillingEventQuery {
            month: Some("2024-04".into()),
            ..march.clone()
        };
        assert!(list_billing_events(&pool, &april).await.unwrap().is_empty());
    }

    #[test]
    fn test_month_range() {
        let (from, until) = month_range("2024-12").unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(until, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let err = month_range("2024-13").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(month_range("March").is_err());
    }
}
