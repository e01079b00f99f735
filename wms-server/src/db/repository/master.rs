//! Master Data Lookups
//!
//! Clients, products, lots, warehouses and locations are maintained
//! elsewhere; orders only need to check that references line up.

use shared::error::{AppError, AppResult};
use sqlx::SqliteConnection;

/// Whether `lot_id` exists and belongs to `product_id`
pub async fn lot_belongs_to_product(
    conn: &mut SqliteConnection,
    lot_id: i64,
    product_id: i64,
) -> AppResult<bool> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT product_id FROM lots WHERE id = ?")
        .bind(lot_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(owner == Some(product_id))
}

/// Fail with `INVALID_LOT_PRODUCT` unless the lot belongs to the product
pub async fn ensure_lot_product(
    conn: &mut SqliteConnection,
    lot_id: i64,
    product_id: i64,
) -> AppResult<()> {
    if lot_belongs_to_product(conn, lot_id, product_id).await? {
        Ok(())
    } else {
        Err(AppError::invalid_lot_product(lot_id, product_id))
    }
}
