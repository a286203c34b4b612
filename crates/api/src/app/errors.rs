//! Consistent error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use armature_core::DomainError;
use armature_mapping::MappingError;
use armature_registry::RegistryError;

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::MissingArgument(name) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "missing_argument",
            format!("required argument missing: {name}"),
        ),
    }
}

/// Wiring failures are server faults; the error filter sanitizes the body
/// outside development.
pub fn registry_error_to_response(err: RegistryError) -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "wiring_error",
        err.to_string(),
    )
}

pub fn mapping_error_to_response(err: MappingError) -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "mapping_error",
        err.to_string(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
