//! Repository Module
//!
//! Free functions over SQLite. Writes and in-transaction reads take a
//! `&mut SqliteConnection` (pass `&mut tx`); standalone reads take the pool.

pub mod inbound;
pub mod master;
pub mod order_log;
pub mod outbound;

pub use order_log::OrderKind;

/// Default page size of list endpoints
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest accepted page size
pub const MAX_LIMIT: i64 = 200;

pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
