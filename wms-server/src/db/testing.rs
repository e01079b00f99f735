//! In-memory database fixtures for unit tests

use sqlx::SqlitePool;

use crate::db::DbService;

/// Migrated in-memory pool seeded with master data:
///
/// - clients 1, 2 / warehouses 1, 2 / locations 3, 4 (warehouse 1)
/// - product 5 with lot 9, product 6 with lot 10 (client 1)
pub async fn test_pool() -> SqlitePool {
    let pool = DbService::in_memory().await.unwrap().pool;
    for sql in [
        "INSERT INTO clients (id, name) VALUES (1, 'Acme'), (2, 'Globex')",
        "INSERT INTO warehouses (id, name) VALUES (1, 'Icheon'), (2, 'Busan')",
        "INSERT INTO locations (id, warehouse_id, code) VALUES (3, 1, 'A-01-01'), (4, 1, 'A-01-02')",
        "INSERT INTO products (id, client_id, sku, name) VALUES (5, 1, 'SKU-5', 'Serum'), (6, 1, 'SKU-6', 'Toner')",
        "INSERT INTO lots (id, product_id, lot_no) VALUES (9, 5, 'L9'), (10, 6, 'L10')",
    ] {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }
    pool
}
