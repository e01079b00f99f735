//! Order state machines and line item operations
//!
//! Each public operation runs in one database transaction: lock, mutate,
//! apply or roll back the ledger effect, resync billing, commit. The audit
//! log entry is appended after the commit and never fails the operation.
//!
//! - [`inbound`] / [`outbound`] - order headers
//! - [`inbound_items`] / [`outbound_items`] - line items
//! - [`status`] - applied-status transitions and audit action names

pub mod inbound;
pub mod inbound_items;
pub mod outbound;
pub mod outbound_items;
pub mod status;

use shared::models::{OrderLogEntry, StockKey};
use sqlx::SqlitePool;

use crate::db::repository::{OrderKind, order_log};

pub use status::LedgerTransition;

/// Stock key of a line item on an order
pub(crate) fn item_key(
    client_id: i64,
    warehouse_id: i64,
    product_id: i64,
    lot_id: i64,
    location_id: Option<i64>,
) -> StockKey {
    StockKey {
        client_id,
        product_id,
        lot_id,
        warehouse_id,
        location_id,
    }
}

/// Append an audit entry after commit; failures are logged, not returned
pub(crate) async fn append_log(pool: &SqlitePool, kind: OrderKind, entry: OrderLogEntry) {
    if let Err(e) = order_log::append(pool, kind, &entry).await {
        tracing::warn!(
            order_id = entry.order_id,
            action = %entry.action,
            error = %e,
            "Failed to append order log"
        );
    }
}

/// Audit note naming an item and its quantity
pub(crate) fn item_note(item_id: i64, qty: i64) -> Option<String> {
    Some(format!("item {item_id} qty {qty}"))
}
