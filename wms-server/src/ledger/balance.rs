//! Stock balance adjustment
//!
//! The only code path that mutates `stock_balances.available_qty`.

use shared::error::{AppError, AppResult};
use shared::models::{StockBalance, StockBalanceQuery, StockKey};
use sqlx::{SqliteConnection, SqlitePool};

const BALANCE_COLUMNS: &str = "id, client_id, product_id, lot_id, warehouse_id, location_id, available_qty, reserved_qty, updated_at";

/// Apply a signed delta to the balance of `key`, returning the new quantity
///
/// Runs on the caller's transaction. The balance row is locked before it is
/// read so concurrent adjustments of the same key serialize. A result below
/// zero fails with `INSUFFICIENT_STOCK` and writes nothing; one that overflows
/// fails with `VALIDATION_FAILED`. A missing row counts as zero and is
/// created on the first non-negative adjustment.
pub async fn adjust_available_qty(
    conn: &mut SqliteConnection,
    key: &StockKey,
    delta: i64,
) -> AppResult<i64> {
    lock_balance(conn, key).await?;

    let current: Option<(i64, i64)> = sqlx::query_as(
        "SELECT id, available_qty FROM stock_balances WHERE client_id = ? AND product_id = ? AND lot_id = ? AND warehouse_id = ? AND location_id IS ?",
    )
    .bind(key.client_id)
    .bind(key.product_id)
    .bind(key.lot_id)
    .bind(key.warehouse_id)
    .bind(key.location_id)
    .fetch_optional(&mut *conn)
    .await?;

    let available = current.map(|(_, qty)| qty).unwrap_or(0);
    let Some(next_qty) = available.checked_add(delta) else {
        tracing::warn!(?key, available, delta, "Adjustment rejected: quantity out of range");
        return Err(AppError::qty_out_of_range(available, delta));
    };
    if next_qty < 0 {
        tracing::debug!(?key, available, delta, "Adjustment rejected: insufficient stock");
        return Err(AppError::insufficient_stock(available, delta));
    }

    let now = shared::util::now_millis();
    match current {
        Some((id, _)) => {
            sqlx::query("UPDATE stock_balances SET available_qty = ?, updated_at = ? WHERE id = ?")
                .bind(next_qty)
                .bind(now)
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO stock_balances (client_id, product_id, lot_id, warehouse_id, location_id, available_qty, reserved_qty, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            )
            .bind(key.client_id)
            .bind(key.product_id)
            .bind(key.lot_id)
            .bind(key.warehouse_id)
            .bind(key.location_id)
            .bind(next_qty)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }
    }

    tracing::debug!(?key, delta, available_qty = next_qty, "Stock balance adjusted");
    Ok(next_qty)
}

/// Take the write lock on the balance row (SQLite has no `SELECT ... FOR UPDATE`)
///
/// The no-op update acquires the database write lock even when no row
/// matches yet, so a concurrent first insert for the same key waits too.
async fn lock_balance(conn: &mut SqliteConnection, key: &StockKey) -> AppResult<()> {
    sqlx::query(
        "UPDATE stock_balances SET available_qty = available_qty WHERE client_id = ? AND product_id = ? AND lot_id = ? AND warehouse_id = ? AND location_id IS ?",
    )
    .bind(key.client_id)
    .bind(key.product_id)
    .bind(key.lot_id)
    .bind(key.warehouse_id)
    .bind(key.location_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Balance row of one key, if it was ever created
pub async fn find_balance(
    conn: &mut SqliteConnection,
    key: &StockKey,
) -> AppResult<Option<StockBalance>> {
    let sql = format!(
        "SELECT {BALANCE_COLUMNS} FROM stock_balances WHERE client_id = ? AND product_id = ? AND lot_id = ? AND warehouse_id = ? AND location_id IS ?"
    );
    let balance = sqlx::query_as::<_, StockBalance>(&sql)
        .bind(key.client_id)
        .bind(key.product_id)
        .bind(key.lot_id)
        .bind(key.warehouse_id)
        .bind(key.location_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(balance)
}

/// Available quantity of one key (zero when no row exists)
pub async fn available_qty(pool: &SqlitePool, key: &StockKey) -> AppResult<i64> {
    let mut conn = pool.acquire().await?;
    Ok(find_balance(&mut conn, key)
        .await?
        .map(|b| b.available_qty)
        .unwrap_or(0))
}

/// Balances matching the optional filters
pub async fn list_balances(
    pool: &SqlitePool,
    query: &StockBalanceQuery,
) -> AppResult<Vec<StockBalance>> {
    let sql = format!(
        "SELECT {BALANCE_COLUMNS} FROM stock_balances \
         WHERE (?1 IS NULL OR client_id = ?1) AND (?2 IS NULL OR product_id = ?2) \
         AND (?3 IS NULL OR warehouse_id = ?3) AND (?4 IS NULL OR lot_id = ?4) \
         ORDER BY client_id, product_id, lot_id, warehouse_id, location_id"
    );
    let balances = sqlx::query_as::<_, StockBalance>(&sql)
        .bind(query.client_id)
        .bind(query.product_id)
        .bind(query.warehouse_id)
        .bind(query.lot_id)
        .fetch_all(pool)
        .await?;
    Ok(balances)
}
