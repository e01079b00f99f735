//! Outbound Order Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outbound order lifecycle
///
/// `Shipped` and `Delivered` are applied: the goods have left the warehouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OutboundStatus {
    #[default]
    Draft,
    Confirmed,
    Allocated,
    Picking,
    Packing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OutboundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboundStatus::Draft => "draft",
            OutboundStatus::Confirmed => "confirmed",
            OutboundStatus::Allocated => "allocated",
            OutboundStatus::Picking => "picking",
            OutboundStatus::Packing => "packing",
            OutboundStatus::Packed => "packed",
            OutboundStatus::Shipped => "shipped",
            OutboundStatus::Delivered => "delivered",
            OutboundStatus::Cancelled => "cancelled",
        }
    }

    /// Whether items of an order in this status affect stock
    ///
    /// Applied outbound orders are also frozen for item mutation.
    pub fn is_applied(&self) -> bool {
        matches!(self, OutboundStatus::Shipped | OutboundStatus::Delivered)
    }
}

impl std::fmt::Display for OutboundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outbound order header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OutboundOrder {
    pub id: i64,
    pub order_no: String,
    pub client_id: i64,
    pub warehouse_id: i64,
    pub status: OutboundStatus,
    pub order_date: NaiveDate,
    pub packed_at: Option<i64>,
    pub shipped_at: Option<i64>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Outbound line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OutboundItem {
    pub id: i64,
    pub outbound_order_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub location_id: Option<i64>,
    pub qty: i64,
    pub box_type: Option<String>,
    pub box_count: i64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Order header with its live items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundOrderDetail {
    #[serde(flatten)]
    pub order: OutboundOrder,
    pub items: Vec<OutboundItem>,
}

/// Item fields supplied when creating an order together with its items
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OutboundItemInput {
    pub product_id: i64,
    pub lot_id: i64,
    pub location_id: Option<i64>,
    #[validate(range(min = 1, max = 1000000000, message = "qty must be between 1 and 1000000000"))]
    pub qty: i64,
    #[validate(length(max = 32))]
    pub box_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "box_count must not be negative"))]
    pub box_count: i64,
    pub note: Option<String>,
}

/// Create outbound order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OutboundOrderCreate {
    #[validate(length(min = 1, max = 64, message = "order_no must be 1-64 characters"))]
    pub order_no: String,
    pub client_id: i64,
    pub warehouse_id: i64,
    #[serde(default)]
    pub status: OutboundStatus,
    pub order_date: Option<NaiveDate>,
    pub note: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OutboundItemInput>,
}

/// Update outbound order payload (absent field = unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OutboundOrderUpdate {
    #[validate(length(min = 1, max = 64, message = "order_no must be 1-64 characters"))]
    pub order_no: Option<String>,
    pub client_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub status: Option<OutboundStatus>,
    pub order_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Create outbound item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OutboundItemCreate {
    pub outbound_order_id: i64,
    pub product_id: i64,
    pub lot_id: i64,
    pub location_id: Option<i64>,
    #[validate(range(min = 1, max = 1000000000, message = "qty must be between 1 and 1000000000"))]
    pub qty: i64,
    #[validate(length(max = 32))]
    pub box_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "box_count must not be negative"))]
    pub box_count: i64,
    pub note: Option<String>,
}

impl OutboundItemCreate {
    pub fn from_input(outbound_order_id: i64, input: OutboundItemInput) -> Self {
        Self {
            outbound_order_id,
            product_id: input.product_id,
            lot_id: input.lot_id,
            location_id: input.location_id,
            qty: input.qty,
            box_type: input.box_type,
            box_count: input.box_count,
            note: input.note,
        }
    }
}

/// Update outbound item payload (absent field = unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OutboundItemUpdate {
    pub outbound_order_id: Option<i64>,
    pub product_id: Option<i64>,
    pub lot_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub location_id: Option<Option<i64>>,
    #[validate(range(min = 1, max = 1000000000, message = "qty must be between 1 and 1000000000"))]
    pub qty: Option<i64>,
    #[validate(length(max = 32))]
    pub box_type: Option<String>,
    #[validate(range(min = 0, message = "box_count must not be negative"))]
    pub box_count: Option<i64>,
    pub note: Option<String>,
}

/// GET /outbound-orders filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutboundOrderQuery {
    pub client_id: Option<i64>,
    pub status: Option<OutboundStatus>,
    /// Capped at 200, default 50
    pub limit: Option<i64>,
}
