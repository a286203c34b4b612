//! Validation problem bodies (RFC 7807 shaped) and the validating JSON
//! extractor that produces them.

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::TraceId;

pub const PROBLEM_TYPE: &str = "modelvalidationproblem";
pub const PROBLEM_TITLE: &str = "One or more model validation errors occurred.";
pub const PROBLEM_DETAIL: &str = "See the errors property for details.";
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Field name → error messages. Ordered map for deterministic bodies.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The 422 problem body returned for input-validation failures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationProblem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: &'static str,
    pub instance: String,
    pub errors: FieldErrors,
    pub trace_id: String,
}

impl ValidationProblem {
    pub fn new(
        instance: impl Into<String>,
        errors: FieldErrors,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: PROBLEM_TYPE,
            title: PROBLEM_TITLE,
            status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            detail: PROBLEM_DETAIL,
            instance: instance.into(),
            errors,
            trace_id: trace_id.into(),
        }
    }
}

impl IntoResponse for ValidationProblem {
    fn into_response(self) -> Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self),
        )
            .into_response()
    }
}

/// Request-body validation hook for DTOs.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// JSON extractor that converts malformed bodies and failed field validation
/// into the 422 problem body.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_string();
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default();

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            let mut errors = FieldErrors::new();
            errors
                .entry("$".to_string())
                .or_default()
                .push(rejection.body_text());
            ValidationProblem::new(instance.clone(), errors, trace_id.clone()).into_response()
        })?;

        value
            .validate()
            .map_err(|errors| ValidationProblem::new(instance, errors, trace_id).into_response())?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn problem_body_has_the_contractual_shape() {
        let mut errors = FieldErrors::new();
        errors.insert(
            "recipient".to_string(),
            vec!["The recipient field is required.".to_string()],
        );

        let problem = ValidationProblem::new("/messages", errors, "trace-1");
        let body = serde_json::to_value(&problem).unwrap();

        assert_eq!(body["type"], json!("modelvalidationproblem"));
        assert_eq!(
            body["title"],
            json!("One or more model validation errors occurred.")
        );
        assert_eq!(body["status"], json!(422));
        assert_eq!(body["detail"], json!("See the errors property for details."));
        assert_eq!(body["instance"], json!("/messages"));
        assert_eq!(
            body["errors"]["recipient"][0],
            json!("The recipient field is required.")
        );
        assert_eq!(body["traceId"], json!("trace-1"));
    }
}
