//! Stock Ledger Models

use serde::{Deserialize, Serialize};

/// Largest quantity a single item may carry (mirrors the payload validators)
pub const MAX_ITEM_QTY: i64 = 1_000_000_000;

/// Kind of stock movement recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TxnType {
    InboundReceive,
    OutboundShip,
    ReturnReceive,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::InboundReceive => "inbound_receive",
            TxnType::OutboundShip => "outbound_ship",
            TxnType::ReturnReceive => "return_receive",
        }
    }
}

impl std::fmt::Display for TxnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source document a stock transaction points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RefType {
    InboundItem,
    OutboundItem,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::InboundItem => "inbound_item",
            RefType::OutboundItem => "outbound_item",
        }
    }
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composite key of a stock balance row
///
/// `location_id = None` is a real key value ("no location"), not a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub client_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub location_id: Option<i64>,
}

/// Current on-hand quantity for one stock key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockBalance {
    pub id: i64,
    pub client_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub location_id: Option<i64>,
    pub available_qty: i64,
    /// Persisted for a future allocation feature; never mutated by the ledger
    pub reserved_qty: i64,
    pub updated_at: i64,
}

/// Ledger audit row, one per `(txn_type, ref_type, ref_id)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockTransaction {
    pub id: i64,
    pub txn_type: TxnType,
    pub ref_type: RefType,
    pub ref_id: i64,
    pub client_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub location_id: Option<i64>,
    pub qty_in: i64,
    pub qty_out: i64,
    pub created_by: Option<i64>,
    pub note: Option<String>,
    pub txn_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Write payload for the idempotent transaction upsert
#[derive(Debug, Clone)]
pub struct StockTxnPayload {
    pub txn_type: TxnType,
    pub ref_type: RefType,
    pub ref_id: i64,
    pub key: StockKey,
    pub qty_in: i64,
    pub qty_out: i64,
    pub created_by: Option<i64>,
    pub note: Option<String>,
}

/// GET /stock-balances filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockBalanceQuery {
    pub client_id: Option<i64>,
    pub product_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub lot_id: Option<i64>,
}

/// GET /stock-transactions filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockTransactionQuery {
    pub ref_type: Option<RefType>,
    pub ref_id: Option<i64>,
    pub client_id: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}
