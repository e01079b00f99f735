//! Shared types for the warehouse back-office
//!
//! Domain models, the unified error type and the API response envelope
//! used by wms-server and its clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
