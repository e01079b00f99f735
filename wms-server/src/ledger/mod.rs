//! Stock Ledger Core
//!
//! - [`balance`] - locked, non-negative balance adjustment
//! - [`transaction`] - idempotent per-reference transaction log
//!
//! Every function here runs on the caller's open transaction; none of them
//! commits.

pub mod balance;
pub mod transaction;

pub use balance::{adjust_available_qty, available_qty, find_balance, list_balances};
pub use transaction::{get_stock_txn_id, list_stock_txns, soft_delete_stock_txn, upsert_stock_txn};
