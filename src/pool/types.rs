use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::ring::{NodeId, RingSnapshot};

/// Observable membership of the pool: `{nodeCount, nodes, slotsPerNode}`.
pub type PoolSnapshot = RingSnapshot;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeState {
    Provisioning,
    Running,
    Suspect,
    Removed,
}

/// Lifecycle record the pool keeps for every tracked node.
///
/// `recoveries` counts how many times the node has been taken through recovery, successful
/// or not.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: NodeId,
    pub state: NodeState,
    pub recoveries: u64,
    pub since: Instant,
}

impl NodeRecord {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            state: NodeState::Provisioning,
            recoveries: 0,
            since: Instant::now(),
        }
    }

    /// Moves to `to` and returns the state the node was in before.
    pub fn transition(&mut self, to: NodeState) -> NodeState {
        let from = self.state;
        self.state = to;
        self.since = Instant::now();
        from
    }
}
