//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::Duplicate | Self::OrderLocked | Self::OrderLockedFields => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenInvalid | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            // 500 Internal Server Error
            Self::DatabaseError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation/business errors)
            Self::ValidationFailed
            | Self::InvalidReference
            | Self::InsufficientStock
            | Self::InvalidLotProduct
            | Self::InvalidOrder => StatusCode::BAD_REQUEST,
        }
    }
}
