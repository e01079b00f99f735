//! Billing Event Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Service code of the inbound handling fee
pub const INBOUND_FEE: &str = "INBOUND_FEE";
/// Service code of the outbound handling fee
pub const OUTBOUND_FEE: &str = "OUTBOUND_FEE";
/// Service code carried by per-item outbound service events
pub const OUTBOUND_SHIP: &str = "OUTBOUND_SHIP";
/// Placeholder policy; rates are applied at invoice time
pub const KRW_FIXED: &str = "KRW_FIXED";

/// Owning order kind of a billing event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReferenceType {
    Inbound,
    Outbound,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Inbound => "INBOUND",
            ReferenceType::Outbound => "OUTBOUND",
        }
    }

    /// Fee service code billed for this kind of order
    pub fn service_code(&self) -> &'static str {
        match self {
            ReferenceType::Inbound => INBOUND_FEE,
            ReferenceType::Outbound => OUTBOUND_FEE,
        }
    }
}

/// Billable fact derived from an order (one live row per reference + service code)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BillingEvent {
    pub id: i64,
    pub client_id: i64,
    pub warehouse_id: i64,
    pub reference_type: ReferenceType,
    pub reference_id: i64,
    pub service_code: String,
    pub qty: i64,
    pub event_date: NaiveDate,
    pub pricing_policy: String,
    /// Integer won (KRW has no minor unit)
    pub unit_price_krw: i64,
    pub amount_krw: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Per-item outbound service event, keyed by its stock transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ServiceEvent {
    pub id: i64,
    pub stock_txn_id: i64,
    pub outbound_order_id: i64,
    pub outbound_item_id: i64,
    pub client_id: i64,
    pub warehouse_id: i64,
    pub service_code: String,
    pub qty: i64,
    pub box_count: i64,
    pub event_date: NaiveDate,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// GET /billing-events filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingEventQuery {
    pub client_id: Option<i64>,
    /// `YYYY-MM`
    pub month: Option<String>,
    pub service_code: Option<String>,
}
