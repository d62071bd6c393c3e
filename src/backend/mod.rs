//! Backend Node Application
//!
//! The tiny HTTP service every provisioned node runs. It identifies itself by name on
//! `/home` and answers liveness probes on `/heartbeat`.

pub mod handlers;

use axum::{Extension, Router, routing::get};
use std::sync::Arc;

pub use handlers::{HomeResponse, ServerName};

pub const ENDPOINT_HOME: &str = "/home";
pub const ENDPOINT_ROOT: &str = "/";
pub const ENDPOINT_HEARTBEAT: &str = "/heartbeat";

/// Builds the router served by the backend node called `name`.
pub fn router(name: &str) -> Router {
    Router::new()
        .route(ENDPOINT_HOME, get(handlers::handle_home))
        .route(ENDPOINT_ROOT, get(handlers::handle_root))
        .route(ENDPOINT_HEARTBEAT, get(handlers::handle_heartbeat))
        .layer(Extension(Arc::new(ServerName(name.to_string()))))
}
