//! Order Audit Log Model

use serde::{Deserialize, Serialize};

/// Append-only audit entry of an inbound or outbound order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLog {
    pub id: i64,
    pub order_id: i64,
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub note: Option<String>,
    pub actor_user_id: Option<i64>,
    pub created_at: i64,
}

/// Entry to append (id and timestamp are assigned on write)
#[derive(Debug, Clone, Default)]
pub struct OrderLogEntry {
    pub order_id: i64,
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub note: Option<String>,
    pub actor_user_id: Option<i64>,
}
