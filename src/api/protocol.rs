//! Control Surface Protocol
//!
//! Request and response bodies of the balancer's HTTP API, and the paths it is served on.
//! Every path has a legacy alias kept for existing clients.

use serde::{Deserialize, Serialize};

use crate::error::NodeFailure;
use crate::pool::PoolSnapshot;

pub const ENDPOINT_ROUTE: &str = "/route";
pub const ENDPOINT_NODES: &str = "/nodes";
pub const ENDPOINT_NODES_REMOVE: &str = "/nodes/remove";
pub const ENDPOINT_NODES_CLEAR: &str = "/nodes/clear";
pub const ENDPOINT_HEALTHZ: &str = "/healthz";

pub const LEGACY_ROUTE: &str = "/home";
pub const LEGACY_ADD: &str = "/add";
pub const LEGACY_REMOVE: &str = "/rm";
pub const LEGACY_CLEAR: &str = "/clear";
pub const LEGACY_DESCRIBE: &str = "/rep";
pub const LEGACY_HEALTHZ: &str = "/heartbeat";

pub const STATUS_SUCCESSFUL: &str = "successful";
pub const STATUS_RECOVERED: &str = "recovered";
pub const STATUS_PARTIAL: &str = "partial";
pub const STATUS_FAILURE: &str = "failure";

#[derive(Debug, Default, Deserialize)]
pub struct RouteParams {
    /// Request id to route. A random one is drawn when absent.
    pub id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub status: String,
    pub request_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Body returned by the node; JSON bodies are embedded as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddNodesRequest {
    #[serde(default)]
    pub hostnames: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveNodeRequest {
    pub hostname: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PoolMessage {
    Snapshot(PoolSnapshot),
    Text(String),
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PoolResponse {
    pub status: String,
    pub message: PoolMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<NodeFailure>,
}

impl PoolResponse {
    pub fn snapshot(status: &str, snapshot: PoolSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message: PoolMessage::Snapshot(snapshot),
            failures: Vec::new(),
        }
    }

    pub fn text(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: PoolMessage::Text(message.into()),
            failures: Vec::new(),
        }
    }

    pub fn with_failures(mut self, failures: Vec<NodeFailure>) -> Self {
        self.failures = failures;
        self
    }
}
