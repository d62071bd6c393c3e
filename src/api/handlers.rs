use super::protocol::*;
use crate::dispatcher::{Dispatcher, RoutingOutcome, random_request_id};
use crate::error::PoolError;
use crate::pool::NodePool;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_route(
    Extension(dispatcher): Extension<Arc<Dispatcher>>,
    Query(params): Query<RouteParams>,
) -> (StatusCode, Json<RouteResponse>) {
    let request_id = params.id.unwrap_or_else(random_request_id);
    let outcome = dispatcher.handle_request(request_id).await;

    let (code, response) = match outcome {
        RoutingOutcome::Success { node, payload } => {
            let body =
                serde_json::from_str(&payload).unwrap_or(serde_json::Value::String(payload));
            (
                StatusCode::OK,
                RouteResponse {
                    status: STATUS_SUCCESSFUL.to_string(),
                    request_id,
                    server: Some(node.name),
                    response: Some(body),
                    message: None,
                },
            )
        }
        RoutingOutcome::Recovered { node } => (
            StatusCode::OK,
            RouteResponse {
                status: STATUS_RECOVERED.to_string(),
                request_id,
                message: Some(format!("{} was down and restarted", node)),
                server: Some(node.name),
                response: None,
            },
        ),
        RoutingOutcome::Unavailable { node, reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            RouteResponse {
                status: STATUS_FAILURE.to_string(),
                request_id,
                server: Some(node.name),
                response: None,
                message: Some(reason),
            },
        ),
        RoutingOutcome::NoNodes => (
            StatusCode::SERVICE_UNAVAILABLE,
            RouteResponse {
                status: STATUS_FAILURE.to_string(),
                request_id,
                server: None,
                response: None,
                message: Some("no server available".to_string()),
            },
        ),
    };

    (code, Json(response))
}

pub async fn handle_add_nodes(
    Extension(pool): Extension<Arc<NodePool>>,
    Json(req): Json<AddNodesRequest>,
) -> (StatusCode, Json<PoolResponse>) {
    tracing::info!("Add request for {:?}", req.hostnames);

    match pool.add_nodes(&req.hostnames).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(PoolResponse::snapshot(STATUS_SUCCESSFUL, snapshot)),
        ),
        Err(partial) => {
            let (code, status) = if partial.failures.len() >= req.hostnames.len() {
                (StatusCode::INTERNAL_SERVER_ERROR, STATUS_FAILURE)
            } else {
                (StatusCode::MULTI_STATUS, STATUS_PARTIAL)
            };
            (
                code,
                Json(
                    PoolResponse::snapshot(status, partial.snapshot)
                        .with_failures(partial.failures),
                ),
            )
        }
    }
}

pub async fn handle_remove_node(
    Extension(pool): Extension<Arc<NodePool>>,
    Json(req): Json<RemoveNodeRequest>,
) -> (StatusCode, Json<PoolResponse>) {
    match pool.remove_node(&req.hostname).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(PoolResponse::snapshot(STATUS_SUCCESSFUL, snapshot)),
        ),
        Err(e @ PoolError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(PoolResponse::text(STATUS_FAILURE, e.to_string())),
        ),
        Err(e) => {
            tracing::error!("Failed to remove {}: {}", req.hostname, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PoolResponse::text(STATUS_FAILURE, e.to_string())),
            )
        }
    }
}

pub async fn handle_clear(
    Extension(pool): Extension<Arc<NodePool>>,
) -> (StatusCode, Json<PoolResponse>) {
    match pool.clear().await {
        Ok(_) => (
            StatusCode::OK,
            Json(PoolResponse::text(
                STATUS_SUCCESSFUL,
                "All server replicas cleared.",
            )),
        ),
        Err(partial) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(
                PoolResponse::text(STATUS_FAILURE, partial.to_string())
                    .with_failures(partial.failures),
            ),
        ),
    }
}

pub async fn handle_describe(
    Extension(pool): Extension<Arc<NodePool>>,
) -> (StatusCode, Json<PoolResponse>) {
    (
        StatusCode::OK,
        Json(PoolResponse::snapshot(STATUS_SUCCESSFUL, pool.snapshot().await)),
    )
}

/// Liveness of the balancer process itself.
pub async fn handle_healthz() -> StatusCode {
    StatusCode::OK
}
