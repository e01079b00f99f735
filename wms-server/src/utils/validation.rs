//! Input validation helpers
//!
//! Payload structs derive `validator::Validate`; handlers call
//! [`validate_payload`] to turn field errors into `VALIDATION_FAILED`.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;

/// Notes on orders and items
pub const MAX_NOTE_LEN: usize = 500;

/// Validate a payload, mapping the first field error to an [`AppError`]
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|errors| {
        let mut err = AppError::validation(first_message(&errors));
        for field in errors.field_errors().keys() {
            err = err.with_detail(field.to_string(), "invalid");
        }
        err
    })
}

/// Validate that an optional note, if present, is within the length limit.
pub fn validate_note(value: &Option<String>) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > MAX_NOTE_LEN => Err(AppError::validation(format!(
            "note is too long ({} chars, max {MAX_NOTE_LEN})",
            v.chars().count()
        ))),
        _ => Ok(()),
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(e) = list.first() {
                    return match &e.message {
                        Some(msg) => msg.to_string(),
                        None => format!("{field} is invalid"),
                    };
                }
            }
            ValidationErrorsKind::Struct(inner) => return first_message(inner),
            ValidationErrorsKind::List(items) => {
                if let Some(inner) = items.values().next() {
                    return format!("{field}: {}", first_message(inner));
                }
            }
        }
    }
    "Validation failed".to_string()
}
