//! Inbound Order Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inbound order lifecycle
///
/// Only `Received` is applied: items of a received order are on hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InboundStatus {
    #[default]
    Draft,
    Submitted,
    Arrived,
    QcHold,
    Received,
    Cancelled,
}

impl InboundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InboundStatus::Draft => "draft",
            InboundStatus::Submitted => "submitted",
            InboundStatus::Arrived => "arrived",
            InboundStatus::QcHold => "qc_hold",
            InboundStatus::Received => "received",
            InboundStatus::Cancelled => "cancelled",
        }
    }

    /// Whether items of an order in this status affect stock
    pub fn is_applied(&self) -> bool {
        matches!(self, InboundStatus::Received)
    }
}

impl std::fmt::Display for InboundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inbound order header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InboundOrder {
    pub id: i64,
    pub order_no: String,
    pub client_id: i64,
    pub warehouse_id: i64,
    pub status: InboundStatus,
    pub inbound_date: NaiveDate,
    pub received_at: Option<i64>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Inbound line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InboundItem {
    pub id: i64,
    pub inbound_order_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub location_id: Option<i64>,
    pub qty: i64,
    /// Declared unit price on the supplier invoice
    pub invoice_price: Option<f64>,
    pub currency: Option<String>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Order header with its live items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundOrderDetail {
    #[serde(flatten)]
    pub order: InboundOrder,
    pub items: Vec<InboundItem>,
}

/// Item fields supplied when creating an order together with its items
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InboundItemInput {
    pub product_id: i64,
    pub lot_id: i64,
    pub location_id: Option<i64>,
    #[validate(range(min = 1, max = 1000000000, message = "qty must be between 1 and 1000000000"))]
    pub qty: i64,
    pub invoice_price: Option<f64>,
    #[validate(length(max = 8))]
    pub currency: Option<String>,
    pub note: Option<String>,
}

/// Create inbound order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InboundOrderCreate {
    #[validate(length(min = 1, max = 64, message = "order_no must be 1-64 characters"))]
    pub order_no: String,
    pub client_id: i64,
    pub warehouse_id: i64,
    #[serde(default)]
    pub status: InboundStatus,
    pub inbound_date: Option<NaiveDate>,
    pub note: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<InboundItemInput>,
}

/// Update inbound order payload (absent field = unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InboundOrderUpdate {
    #[validate(length(min = 1, max = 64, message = "order_no must be 1-64 characters"))]
    pub order_no: Option<String>,
    pub client_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub status: Option<InboundStatus>,
    pub inbound_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Create inbound item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InboundItemCreate {
    pub inbound_order_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub location_id: Option<i64>,
    #[validate(range(min = 1, max = 1000000000, message = "qty must be between 1 and 1000000000"))]
    pub qty: i64,
    pub invoice_price: Option<f64>,
    #[validate(length(max = 8))]
    pub currency: Option<String>,
    pub note: Option<String>,
}

impl InboundItemCreate {
    pub fn from_input(inbound_order_id: i64, input: InboundItemInput) -> Self {
        Self {
            inbound_order_id,
            product_id: input.product_id,
            lot_id: input.lot_id,
            location_id: input.location_id,
            qty: input.qty,
            invoice_price: input.invoice_price,
            currency: input.currency,
            note: input.note,
        }
    }
}

/// Update inbound item payload (absent field = unchanged)
///
/// `location_id: null` clears the location; an absent `location_id` keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InboundItemUpdate {
    pub inbound_order_id: Option<i64>,
    pub product_id: Option<i64>,
    pub lot_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub location_id: Option<Option<i64>>,
    #[validate(range(min = 1, max = 1000000000, message = "qty must be between 1 and 1000000000"))]
    pub qty: Option<i64>,
    pub invoice_price: Option<f64>,
    #[validate(length(max = 8))]
    pub currency: Option<String>,
    pub note: Option<String>,
}

/// GET /inbound-orders filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundOrderQuery {
    pub client_id: Option<i64>,
    pub status: Option<InboundStatus>,
    /// Capped at 200, default 50
    pub limit: Option<i64>,
}
