//! WMS Server - 3PL warehouse stock ledger and billing sync
//!
//! # Architecture
//!
//! - **Ledger** (`ledger`): locked, non-negative stock balances plus an
//!   idempotent per-reference transaction log
//! - **Billing** (`billing`): per-order fee events and per-item outbound
//!   service events, recomputed after every mutation
//! - **Orders** (`orders`): inbound/outbound state machines and line items;
//!   each mutation is one database transaction
//! - **HTTP API** (`api`): axum routes with `{ ok, data }` envelopes
//!
//! # Module layout
//!
//! ```text
//! wms-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT validation, actor extractor
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── ledger/        # stock balances and transactions
//! ├── billing/       # billing and service events
//! ├── orders/        # order and item services
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, validation, responses
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod ledger;
pub mod orders;
pub mod utils;

// Re-export common types
pub use auth::{Actor, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use db::DbService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
