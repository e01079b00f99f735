//! Stock transaction log
//!
//! One row per `(txn_type, ref_type, ref_id)` for the lifetime of the
//! reference; rollback soft-deletes it and a later re-apply resurrects it.

use shared::error::AppResult;
use shared::models::{RefType, StockTransaction, StockTransactionQuery, StockTxnPayload, TxnType};
use sqlx::{SqliteConnection, SqlitePool};

const TXN_COLUMNS: &str = "id, txn_type, ref_type, ref_id, client_id, product_id, lot_id, warehouse_id, location_id, qty_in, qty_out, created_by, note, txn_date, created_at, updated_at, deleted_at";

/// Insert or refresh the transaction for a reference, returning its id
///
/// An existing row (live or soft-deleted) is updated in place and
/// `deleted_at` cleared. `txn_date` is kept for a live row and reset when a
/// deleted one is brought back.
pub async fn upsert_stock_txn(
    conn: &mut SqliteConnection,
    payload: &StockTxnPayload,
) -> AppResult<i64> {
    let now = shared::util::now_millis();
    let key = &payload.key;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_transactions (txn_type, ref_type, ref_id, client_id, product_id, lot_id, warehouse_id, location_id, qty_in, qty_out, created_by, note, txn_date, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13, ?13) \
         ON CONFLICT (txn_type, ref_type, ref_id) DO UPDATE SET \
            client_id = excluded.client_id, product_id = excluded.product_id, lot_id = excluded.lot_id, \
            warehouse_id = excluded.warehouse_id, location_id = excluded.location_id, \
            qty_in = excluded.qty_in, qty_out = excluded.qty_out, \
            created_by = COALESCE(excluded.created_by, stock_transactions.created_by), \
            note = excluded.note, \
            txn_date = CASE WHEN stock_transactions.deleted_at IS NULL THEN stock_transactions.txn_date ELSE excluded.txn_date END, \
            updated_at = excluded.updated_at, deleted_at = NULL \
         RETURNING id",
    )
    .bind(payload.txn_type)
    .bind(payload.ref_type)
    .bind(payload.ref_id)
    .bind(key.client_id)
    .bind(key.product_id)
    .bind(key.lot_id)
    .bind(key.warehouse_id)
    .bind(key.location_id)
    .bind(payload.qty_in)
    .bind(payload.qty_out)
    .bind(payload.created_by)
    .bind(&payload.note)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(
        txn_id = id,
        txn_type = %payload.txn_type,
        ref_type = %payload.ref_type,
        ref_id = payload.ref_id,
        "Stock transaction upserted"
    );
    Ok(id)
}

/// Id of the live transaction for a reference
pub async fn get_stock_txn_id(
    conn: &mut SqliteConnection,
    txn_type: TxnType,
    ref_type: RefType,
    ref_id: i64,
) -> AppResult<Option<i64>> {
    let id = sqlx::query_scalar(
        "SELECT id FROM stock_transactions WHERE txn_type = ? AND ref_type = ? AND ref_id = ? AND deleted_at IS NULL",
    )
    .bind(txn_type)
    .bind(ref_type)
    .bind(ref_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(id)
}

/// Soft-delete a transaction (no-op when already deleted)
pub async fn soft_delete_stock_txn(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE stock_transactions SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Transactions matching the filters, newest first
pub async fn list_stock_txns(
    pool: &SqlitePool,
    query: &StockTransactionQuery,
) -> AppResult<Vec<StockTransaction>> {
    let sql = format!(
        "SELECT {TXN_COLUMNS} FROM stock_transactions \
         WHERE (?1 IS NULL OR ref_type = ?1) AND (?2 IS NULL OR ref_id = ?2) \
         AND (?3 IS NULL OR client_id = ?3) AND (?4 OR deleted_at IS NULL) \
         ORDER BY txn_date DESC, id DESC"
    );
    let txns = sqlx::query_as::<_, StockTransaction>(&sql)
        .bind(query.ref_type)
        .bind(query.ref_id)
        .bind(query.client_id)
        .bind(query.include_deleted)
        .fetch_all(pool)
        .await?;
    Ok(txns)
}
