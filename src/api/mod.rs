//! Balancer Control Surface
//!
//! HTTP front end of the balancer: request routing plus pool administration.
//!
//! ## Submodules
//! - **`protocol`**: Paths, status strings and the JSON bodies exchanged with clients.
//! - **`handlers`**: Axum handlers mapping pool and dispatcher results onto HTTP responses.

pub mod handlers;
pub mod protocol;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::pool::NodePool;
use handlers::*;
use protocol::*;

/// Builds the balancer router, serving every endpoint under its current and legacy path.
pub fn router(pool: Arc<NodePool>, dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route(ENDPOINT_ROUTE, get(handle_route))
        .route(LEGACY_ROUTE, get(handle_route))
        .route(ENDPOINT_NODES, post(handle_add_nodes).get(handle_describe))
        .route(LEGACY_ADD, post(handle_add_nodes))
        .route(LEGACY_DESCRIBE, get(handle_describe))
        .route(ENDPOINT_NODES_REMOVE, post(handle_remove_node))
        .route(LEGACY_REMOVE, post(handle_remove_node))
        .route(ENDPOINT_NODES_CLEAR, post(handle_clear))
        .route(LEGACY_CLEAR, post(handle_clear))
        .route(ENDPOINT_HEALTHZ, get(handle_healthz))
        .route(LEGACY_HEALTHZ, get(handle_healthz))
        .layer(Extension(pool))
        .layer(Extension(dispatcher))
}
