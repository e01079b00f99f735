//! Utilities - logging, request validation and response helpers

pub mod logger;
pub mod validation;

use axum::Json;
use http::StatusCode;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use validation::{validate_note, validate_payload};

/// JSON success envelope `{ "ok": true, "data": ... }`
pub type AppResponse<T> = Json<ApiResponse<T>>;

pub fn ok<T: Serialize>(data: T) -> AppResponse<T> {
    Json(ApiResponse::success(data))
}

/// 201 with the success envelope
pub fn created<T: Serialize>(data: T) -> (StatusCode, AppResponse<T>) {
    (StatusCode::CREATED, ok(data))
}
