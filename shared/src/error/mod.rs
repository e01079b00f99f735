//! Unified error system for the warehouse back-office
//!
//! - [`ErrorCode`]: closed set of error kinds, one HTTP status each
//! - [`AppError`]: error type with code, message and details
//! - [`ApiResponse`]: `{ ok, data }` / `{ ok, code, message }` envelope
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::InsufficientStock)
//!     .with_detail("available_qty", 3);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert!(!response.ok);
//! ```

mod codes;
mod http;
mod types;

pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError, AppResult};
