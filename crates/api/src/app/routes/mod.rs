use axum::Router;

pub mod messages;
pub mod system;

/// Router for all routed endpoints.
pub fn router() -> Router {
    Router::new().nest("/messages", messages::router())
}
