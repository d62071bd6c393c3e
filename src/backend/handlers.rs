use axum::{Extension, Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name the backend node was started under.
#[derive(Debug, Clone)]
pub struct ServerName(pub String);

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
    pub status: String,
}

pub async fn handle_home(
    Extension(name): Extension<Arc<ServerName>>,
) -> (StatusCode, Json<HomeResponse>) {
    (
        StatusCode::OK,
        Json(HomeResponse {
            message: format!("Hello from Server: {}", name.0),
            status: "successful".to_string(),
        }),
    )
}

pub async fn handle_root() -> &'static str {
    "Server is running!"
}

pub async fn handle_heartbeat() -> StatusCode {
    StatusCode::OK
}
