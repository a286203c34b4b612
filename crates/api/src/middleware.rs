//! Request pipeline middleware.
//!
//! Each stage is an `axum::middleware::from_fn` function; `app::build_app`
//! layers them in the contractual order.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use armature_registry::{Registry, RequestScope};

use crate::app::encode::ResponseFormat;
use crate::config::RunMode;
use crate::context::{Principal, TraceId};

/// Assign a trace identifier to the request and echo it on the response.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let trace_id = TraceId::generate();
    req.extensions_mut().insert(trace_id.clone());

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        res.headers_mut().insert("x-trace-id", value);
    }
    res
}

/// Global error filter: logs server errors and, outside development,
/// replaces them with a fixed plain-text body so internals never leak.
pub async fn error_filter(
    State(run_mode): State<RunMode>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let res = next.run(req).await;
    if res.status().is_server_error() {
        tracing::error!(
            %method,
            path,
            status = res.status().as_u16(),
            "unhandled error in request pipeline"
        );

        if !run_mode.is_development() {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "There was an unexpected error.",
            )
                .into_response();
        }
    }
    res
}

/// The "AllowAll" cross-origin policy: any origin, any method, any header.
/// Layered in development mode only.
pub async fn cors_allow_all(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut res = StatusCode::NO_CONTENT.into_response();
        allow_all_headers(res.headers_mut());
        return res;
    }

    let mut res = next.run(req).await;
    allow_all_headers(res.headers_mut());
    res
}

fn allow_all_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}

/// Redirect plain-HTTP requests to HTTPS.
///
/// The scheme is only visible behind a proxy via `x-forwarded-proto`;
/// requests without the header (local serving) pass through.
pub async fn https_redirect(req: Request<Body>, next: Next) -> Response {
    let forwarded = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());

    if forwarded == Some("http") {
        if let Some(target) = https_target(req.uri(), req.headers()) {
            return Redirect::permanent(&target).into_response();
        }
    }

    next.run(req).await
}

fn https_target(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    Some(format!("https://{host}{path}"))
}

/// Content negotiation: pick the response format from `Accept`, or refuse
/// with 406 when no requested format can be produced.
pub async fn negotiate_accept(mut req: Request<Body>, next: Next) -> Response {
    let Some(format) = accepted_format(req.headers()) else {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    };

    req.extensions_mut().insert(format);
    next.run(req).await
}

/// First acceptable entry wins; qualities are not weighed.
fn accepted_format(headers: &HeaderMap) -> Option<ResponseFormat> {
    let accept = match headers.get(header::ACCEPT) {
        None => return Some(ResponseFormat::Json),
        Some(value) => value.to_str().ok()?,
    };
    if accept.trim().is_empty() {
        return Some(ResponseFormat::Json);
    }

    for entry in accept.split(',') {
        let media = entry.split(';').next().unwrap_or("").trim();
        match media {
            "*/*" | "application/*" | "application/json" | "application/problem+json"
            | "text/json" => return Some(ResponseFormat::Json),
            "application/xml" | "text/xml" => return Some(ResponseFormat::Xml),
            _ => continue,
        }
    }

    None
}

/// Create the per-request resolution scope. Layered directly outside
/// authorization so every dispatched handler can resolve scoped services;
/// the scope drops with the request.
pub async fn request_scope(
    State(registry): State<Arc<Registry>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let scope = Arc::new(RequestScope::new(registry));
    req.extensions_mut().insert(scope);
    next.run(req).await
}

/// Authorization stage. Runs after the routing decision and before handler
/// dispatch. No policies are configured in the scaffold: bearer credentials
/// become a named principal, everything else proceeds anonymous.
pub async fn authorization(mut req: Request<Body>, next: Next) -> Response {
    let principal = bearer_subject(req.headers())
        .map(Principal::bearer)
        .unwrap_or_else(Principal::anonymous);

    req.extensions_mut().insert(principal);
    next.run(req).await
}

fn bearer_subject(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_accept(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_accept_defaults_to_json() {
        assert_eq!(
            accepted_format(&HeaderMap::new()),
            Some(ResponseFormat::Json)
        );
    }

    #[test]
    fn xml_is_produced_when_requested() {
        assert_eq!(
            accepted_format(&headers_with_accept("application/xml")),
            Some(ResponseFormat::Xml)
        );
        assert_eq!(
            accepted_format(&headers_with_accept("text/xml;q=0.9")),
            Some(ResponseFormat::Xml)
        );
    }

    #[test]
    fn first_acceptable_entry_wins() {
        assert_eq!(
            accepted_format(&headers_with_accept("text/csv, application/json")),
            Some(ResponseFormat::Json)
        );
    }

    #[test]
    fn unsupported_accept_yields_none() {
        assert_eq!(accepted_format(&headers_with_accept("text/csv")), None);
        assert_eq!(accepted_format(&headers_with_accept("image/png, text/html")), None);
    }

    #[test]
    fn bearer_subject_requires_non_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_subject(&headers), Some("abc".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_subject(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_subject(&headers), None);
    }

    #[test]
    fn https_target_preserves_path_and_query() {
        let uri: Uri = "/messages?recipient=ops".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("api.example.com"));

        assert_eq!(
            https_target(&uri, &headers),
            Some("https://api.example.com/messages?recipient=ops".to_string())
        );
    }
}
