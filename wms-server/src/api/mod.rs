//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and database probe
//! - [`inbound_orders`] - inbound order headers and audit logs
//! - [`outbound_orders`] - outbound order headers, audit logs and service events
//! - [`inbound_items`] - inbound line items
//! - [`outbound_items`] - outbound line items
//! - [`stock`] - stock balances and ledger transactions
//! - [`billing`] - billing events for invoicing

pub mod billing;
pub mod health;
pub mod inbound_items;
pub mod inbound_orders;
pub mod outbound_items;
pub mod outbound_orders;
pub mod stock;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Every route of the service
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(inbound_orders::router())
        .merge(outbound_orders::router())
        .merge(inbound_items::router())
        .merge(outbound_items::router())
        .merge(stock::router())
        .merge(billing::router())
}
