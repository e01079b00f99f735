//! Shared fixtures for integration tests
#![allow(dead_code)]

use shared::models::StockKey;
use sqlx::SqlitePool;
use wms_server::DbService;

const MASTER_DATA: &[&str] = &[
    "INSERT INTO clients (id, name) VALUES (1, 'Acme'), (2, 'Globex')",
    "INSERT INTO warehouses (id, name) VALUES (1, 'Icheon'), (2, 'Busan')",
    "INSERT INTO locations (id, warehouse_id, code) VALUES (3, 1, 'A-01-01')",
    "INSERT INTO products (id, client_id, sku, name) VALUES (5, 1, 'SKU-5', 'Serum'), (6, 1, 'SKU-6', 'Toner')",
    "INSERT INTO lots (id, product_id, lot_no) VALUES (9, 5, 'L9'), (10, 6, 'L10')",
];

async fn seed(pool: &SqlitePool) {
    for sql in MASTER_DATA {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

/// In-memory database with master data
pub async fn memory_pool() -> SqlitePool {
    let pool = DbService::in_memory().await.unwrap().pool;
    seed(&pool).await;
    pool
}

/// File database with several connections, for contention tests
pub async fn file_pool(dir: &std::path::Path) -> SqlitePool {
    let url = format!("sqlite:{}", dir.join("wms.db").display());
    let pool = DbService::new(&url, 4, 5_000).await.unwrap().pool;
    seed(&pool).await;
    pool
}

/// Client 1, product 5, lot 9, warehouse 1, no location
pub fn serum_key() -> StockKey {
    StockKey {
        client_id: 1,
        product_id: 5,
        lot_id: 9,
        warehouse_id: 1,
        location_id: None,
    }
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}
