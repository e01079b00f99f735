//! Unified error codes for the warehouse back-office
//!
//! Codes are serialized as SCREAMING_SNAKE_CASE strings (`"INSUFFICIENT_STOCK"`),
//! which is the `code` field clients see in a failed `ApiResponse`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ==================== General ====================
    /// Request payload failed validation
    ValidationFailed,
    /// Entity missing for read/update/delete
    NotFound,
    /// Foreign key points at a missing row
    InvalidReference,
    /// Unique key collision (e.g. duplicate order number)
    Duplicate,

    // ==================== Ledger ====================
    /// Adjustment would leave a negative balance
    InsufficientStock,
    /// Lot does not belong to the product
    InvalidLotProduct,

    // ==================== Order ====================
    /// Referenced order is missing or deleted
    InvalidOrder,
    /// Order is frozen (outbound shipped/delivered)
    OrderLocked,
    /// client_id / warehouse_id change on an applied order
    OrderLockedFields,

    // ==================== Auth ====================
    /// Authentication required
    NotAuthenticated,
    /// Bearer token could not be validated
    TokenInvalid,
    /// Bearer token has expired
    TokenExpired,

    // ==================== System ====================
    /// Storage layer failure
    DatabaseError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Wire name of the code
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidReference => "INVALID_REFERENCE",
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::InvalidLotProduct => "INVALID_LOT_PRODUCT",
            ErrorCode::InvalidOrder => "INVALID_ORDER",
            ErrorCode::OrderLocked => "ORDER_LOCKED",
            ErrorCode::OrderLockedFields => "ORDER_LOCKED_FIELDS",
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::TokenInvalid => "TOKEN_INVALID",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidReference => "Invalid reference",
            ErrorCode::Duplicate => "Resource already exists",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidLotProduct => "Lot does not belong to product",
            ErrorCode::InvalidOrder => "Order not found or deleted",
            ErrorCode::OrderLocked => "Order is locked",
            ErrorCode::OrderLockedFields => "client_id and warehouse_id are locked on an applied order",
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::InternalError => "Internal server error",
        }
    }

    /// Errors whose raw message must not reach clients
    pub const fn is_system(&self) -> bool {
        matches!(self, ErrorCode::DatabaseError | ErrorCode::InternalError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
