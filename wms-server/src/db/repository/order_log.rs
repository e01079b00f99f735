//! Order Audit Log Repository
//!
//! Append-only; entries are never updated or deleted.

use shared::error::AppResult;
use shared::models::{OrderLog, OrderLogEntry};
use sqlx::SqlitePool;

/// Which order family a log belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Inbound,
    Outbound,
}

impl OrderKind {
    fn table(&self) -> &'static str {
        match self {
            OrderKind::Inbound => "inbound_order_logs",
            OrderKind::Outbound => "outbound_order_logs",
        }
    }

    fn order_table(&self) -> &'static str {
        match self {
            OrderKind::Inbound => "inbound_orders",
            OrderKind::Outbound => "outbound_orders",
        }
    }
}

/// Whether the order was ever created
///
/// Soft-deleted orders still count: their trail stays readable.
pub async fn order_exists(pool: &SqlitePool, kind: OrderKind, order_id: i64) -> AppResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", kind.order_table());
    let exists: bool = sqlx::query_scalar(&sql).bind(order_id).fetch_one(pool).await?;
    Ok(exists)
}

pub async fn append(pool: &SqlitePool, kind: OrderKind, entry: &OrderLogEntry) -> AppResult<i64> {
    let sql = format!(
        "INSERT INTO {} (order_id, action, from_status, to_status, note, actor_user_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        kind.table()
    );
    let id = sqlx::query_scalar(&sql)
        .bind(entry.order_id)
        .bind(&entry.action)
        .bind(&entry.from_status)
        .bind(&entry.to_status)
        .bind(&entry.note)
        .bind(entry.actor_user_id)
        .bind(shared::util::now_millis())
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Entries of an order, oldest first
pub async fn list(pool: &SqlitePool, kind: OrderKind, order_id: i64) -> AppResult<Vec<OrderLog>> {
    let sql = format!(
        "SELECT id, order_id, action, from_status, to_status, note, actor_user_id, created_at FROM {} WHERE order_id = ? ORDER BY id",
        kind.table()
    );
    let logs = sqlx::query_as::<_, OrderLog>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(logs)
}
