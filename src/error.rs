//! Error types for pool membership and recovery.

use serde::Serialize;

use crate::pool::PoolSnapshot;
use crate::provisioner::ProvisionError;
use crate::ring::RingFull;

/// Errors surfaced by `NodePool` operations.
///
/// `Clone` so that one recovery outcome can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error(transparent)]
    RingFull(#[from] RingFull),

    #[error("node {0} not found")]
    NotFound(String),

    #[error("invalid node name {0:?}")]
    InvalidNode(String),

    #[error("provisioning error for {node}: {source}")]
    Provisioning {
        node: String,
        #[source]
        source: ProvisionError,
    },

    /// Reprovisioning during recovery failed; the node stays `Suspect`.
    #[error("failed to recover {node}: {reason}")]
    Recovery { node: String, reason: String },
}

impl PoolError {
    pub fn provisioning(node: &str, source: ProvisionError) -> Self {
        Self::Provisioning {
            node: node.to_string(),
            source,
        }
    }
}

/// Per-node failure inside a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeFailure {
    pub node: String,
    pub error: String,
}

impl NodeFailure {
    pub fn new(node: &str, error: &PoolError) -> Self {
        Self {
            node: node.to_string(),
            error: error.to_string(),
        }
    }
}

/// Batch operation where at least one node failed. Nodes that succeeded stay active and are
/// part of `snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} node(s) failed: {}", .failures.len(), describe(.failures))]
pub struct PartialFailure {
    pub snapshot: PoolSnapshot,
    pub failures: Vec<NodeFailure>,
}

fn describe(failures: &[NodeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.node, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}
