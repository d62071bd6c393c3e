use crate::ring::NodeId;

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingOutcome {
    /// The owning node answered with `payload`.
    Success { node: NodeId, payload: String },
    /// Delivery failed and the node was recreated. The request itself was not re-sent.
    Recovered { node: NodeId },
    /// Delivery failed and the node could not be recovered.
    Unavailable { node: NodeId, reason: String },
    /// The ring is empty.
    NoNodes,
}

impl RoutingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
