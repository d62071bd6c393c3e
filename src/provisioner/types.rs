use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::ring::NodeId;

/// Failure reported by a `NodeProvisioner`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    /// The runtime has no resource under this name ("already gone").
    #[error("node {0} not found")]
    NotFound(String),

    /// The resource exists but is not serving.
    #[error("node {0} is not running")]
    NotRunning(String),

    /// A live resource already exists under this name.
    #[error("node {0} is already running")]
    AlreadyRunning(String),

    #[error("provisioning of {node} failed: {reason}")]
    Failed { node: String, reason: String },

    #[error("{op} on {node} timed out after {after:?}")]
    Timeout {
        op: &'static str,
        node: String,
        after: Duration,
    },
}

impl ProvisionError {
    pub fn failed(node: &NodeId, reason: impl ToString) -> Self {
        Self::Failed {
            node: node.name.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Capability to manage concrete backend nodes by name.
///
/// Implementations are expected to apply their own timeouts as well; callers additionally
/// wrap every call with [`bounded`].
#[async_trait]
pub trait NodeProvisioner: Send + Sync {
    /// Starts a node under `node.name`.
    async fn create(&self, node: &NodeId) -> Result<(), ProvisionError>;

    /// Stops and removes the node. Returns `ProvisionError::NotFound` if nothing exists.
    async fn destroy(&self, node: &NodeId) -> Result<(), ProvisionError>;

    /// Succeeds only if the node is up and answering.
    async fn health_check(&self, node: &NodeId) -> Result<(), ProvisionError>;

    /// Delivers a request to the node and returns its response body.
    async fn invoke(&self, node: &NodeId) -> Result<String, ProvisionError>;
}

/// Runs a provisioner call with an upper bound on how long it may take.
///
/// Elapsed time is reported as `ProvisionError::Timeout` and is otherwise treated exactly
/// like an explicit failure.
pub async fn bounded<T, F>(
    op: &'static str,
    node: &NodeId,
    limit: Duration,
    fut: F,
) -> Result<T, ProvisionError>
where
    F: Future<Output = Result<T, ProvisionError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} on {} exceeded {:?}", op, node, limit);
            Err(ProvisionError::Timeout {
                op,
                node: node.name.clone(),
                after: limit,
            })
        }
    }
}
