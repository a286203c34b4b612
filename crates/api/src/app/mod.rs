//! HTTP API application wiring (Axum router + middleware pipeline).
//!
//! This folder is structured like:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs, mapping rules, body validation
//! - `encode.rs`: negotiated response encoding (JSON/XML)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use thiserror::Error;
use tower::ServiceBuilder;

use armature_core::DomainError;
use armature_mapping::{compose, ComposeError, Mapper};
use armature_observability::DiagnosticsLogger;
use armature_registry::{Registry, RegistryError, RequestScope};

use crate::config::AppConfig;
use crate::context::HandlerDeps;
use crate::middleware;

pub mod dto;
pub mod encode;
pub mod errors;
pub mod routes;

/// Startup failure; fatal, the process does not come up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("composition failed: {0}")]
    Compose(#[from] ComposeError),

    #[error("wiring failed: {0}")]
    Wiring(#[from] RegistryError),

    #[error("handler dependencies: {0}")]
    Dependencies(#[from] DomainError),
}

/// Build the registry, the mapping engine and the full router (public
/// entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(config: &AppConfig) -> Result<(Router, Arc<Registry>), StartupError> {
    // Registration order: stores, then Service/Repository conventions, then
    // the mapping engine, then the diagnostics logger.
    let mut registry = Registry::new();
    let mapper: Arc<Mapper> = compose::register(
        &mut registry,
        &[armature_messages::bind_stores],
        &[&armature_messages::MANIFEST],
        &[&dto::MAPPINGS],
    )?;
    let registry = Arc::new(registry);

    let logger = RequestScope::new(Arc::clone(&registry))
        .resolve::<Arc<dyn DiagnosticsLogger>>()?;
    let deps = Arc::new(HandlerDeps::new(Some(logger), Some(mapper))?);

    // Routed endpoints. Route layers run after the routing decision: scope
    // creation sits directly outside authorization, authorization directly
    // outside handler dispatch.
    let api = routes::router()
        .layer(Extension(deps))
        .layer(axum::middleware::from_fn(middleware::authorization))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&registry),
            middleware::request_scope,
        ));

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(axum::middleware::from_fn(middleware::negotiate_accept))
        .layer(axum::middleware::from_fn(middleware::https_redirect));

    if config.run_mode.is_development() {
        // "AllowAll" cross-origin policy; not layered in production builds.
        app = app.layer(axum::middleware::from_fn(middleware::cors_allow_all));
    }

    let app = app
        .layer(axum::middleware::from_fn_with_state(
            config.run_mode,
            middleware::error_filter,
        ))
        .layer(axum::middleware::from_fn(middleware::trace_id))
        .layer(ServiceBuilder::new());

    Ok((app, registry))
}

/// Seed persisted storage; runs after the pipeline is built, before serving.
pub fn seed_storage(registry: &Arc<Registry>) -> Result<usize, RegistryError> {
    let scope = RequestScope::new(Arc::clone(registry));
    armature_messages::seed(&scope)
}
