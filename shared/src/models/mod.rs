//! Data models
//!
//! Shared between wms-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod billing;
pub mod inbound;
pub mod order_log;
pub mod outbound;
pub mod stock;

// Re-exports
pub use billing::*;
pub use inbound::*;
pub use order_log::*;
pub use outbound::*;
pub use stock::*;
