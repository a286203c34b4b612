//! Negotiated response encoding.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Response body format chosen by content negotiation. JSON unless the
/// client asked for XML.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

/// Serialize `value` in the negotiated format. `root` names the XML document
/// element; JSON ignores it.
pub fn respond<T: Serialize>(
    format: ResponseFormat,
    status: StatusCode,
    root: &str,
    value: &T,
) -> Response {
    match format {
        ResponseFormat::Json => (status, Json(value)).into_response(),
        ResponseFormat::Xml => match quick_xml::se::to_string_with_root(root, value) {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("xml encoding failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
    }
}
