//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type of the back-office, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a duplicate-key error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Duplicate, msg)
    }

    /// Create an insufficient stock error
    pub fn insufficient_stock(available: i64, delta: i64) -> Self {
        Self::new(ErrorCode::InsufficientStock)
            .with_detail("available_qty", available)
            .with_detail("delta", delta)
    }

    /// Create an error for a stock adjustment that would overflow the balance
    pub fn qty_out_of_range(available: i64, delta: i64) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, "Stock quantity out of range")
            .with_detail("available_qty", available)
            .with_detail("delta", delta)
    }

    /// Create a lot/product mismatch error
    pub fn invalid_lot_product(lot_id: i64, product_id: i64) -> Self {
        Self::new(ErrorCode::InvalidLotProduct)
            .with_detail("lot_id", lot_id)
            .with_detail("product_id", product_id)
    }

    /// Create an invalid order reference error
    pub fn invalid_order(order_id: i64) -> Self {
        Self::new(ErrorCode::InvalidOrder).with_detail("order_id", order_id)
    }

    /// Create an order locked error
    pub fn order_locked(order_id: i64) -> Self {
        Self::new(ErrorCode::OrderLocked).with_detail("order_id", order_id)
    }

    /// Create a locked fields error
    pub fn order_locked_fields(order_id: i64) -> Self {
        Self::new(ErrorCode::OrderLockedFields).with_detail("order_id", order_id)
    }

    /// Create a not authenticated error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }
}

/// Unified API response structure
///
/// - success: `{ "ok": true, "data": ... }`
/// - failure: `{ "ok": false, "code": "...", "message": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response from an AppError
    ///
    /// System errors carry only the code's generic message.
    pub fn error(err: &AppError) -> Self {
        let (message, details) = if err.code.is_system() {
            (err.code.message().to_string(), None)
        } else {
            (err.message.clone(), err.details.clone())
        };
        Self {
            ok: false,
            code: Some(err.code),
            message: Some(message),
            data: None,
            details,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Storage Integration =====

#[cfg(feature = "db")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::new(ErrorCode::NotFound),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::duplicate(ErrorCode::Duplicate.message())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::new(ErrorCode::InvalidReference)
            }
            _ => Self::database(err.to_string()),
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if self.code.is_system() {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}
