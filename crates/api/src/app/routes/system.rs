use axum::http::StatusCode;

/// Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
