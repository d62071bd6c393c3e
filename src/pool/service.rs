use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

use super::types::{NodeRecord, NodeState, PoolSnapshot};
use crate::error::{NodeFailure, PartialFailure, PoolError};
use crate::provisioner::{NodeProvisioner, bounded};
use crate::ring::{HashRing, NodeId, RingConfig, RingFull};

struct PoolState {
    ring: HashRing,
    nodes: HashMap<String, NodeRecord>,
}

impl PoolState {
    fn transition(&mut self, name: &str, to: NodeState) {
        if let Some(record) = self.nodes.get_mut(name) {
            let from = record.transition(to);
            if from != to {
                tracing::info!("Node {}: {:?} -> {:?}", name, from, to);
            }
        }
    }
}

pub struct NodePool {
    state: RwLock<PoolState>,
    membership: Mutex<()>,
    provisioner: Arc<dyn NodeProvisioner>,
    call_timeout: Duration,
}

impl NodePool {
    /// `config` is expected to have passed `RingConfig::validate`.
    pub fn new(
        config: RingConfig,
        provisioner: Arc<dyn NodeProvisioner>,
        call_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(PoolState {
                ring: HashRing::new(config),
                nodes: HashMap::new(),
            }),
            membership: Mutex::new(()),
            provisioner,
            call_timeout,
        })
    }

    pub fn provisioner(&self) -> &Arc<dyn NodeProvisioner> {
        &self.provisioner
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Provisions and registers every name in `names`.
    ///
    /// Names already tracked are left untouched. Each failing name is rolled back on its own
    /// and reported in the returned `PartialFailure`; the others stay active.
    pub async fn add_nodes(&self, names: &[String]) -> Result<PoolSnapshot, PartialFailure> {
        let _membership = self.membership.lock().await;

        let mut failures = Vec::new();
        for name in names {
            if let Err(e) = self.add_one(name).await {
                tracing::error!("Failed to add node {:?}: {}", name, e);
                failures.push(NodeFailure::new(name, &e));
            }
        }

        let snapshot = self.snapshot().await;
        if failures.is_empty() {
            Ok(snapshot)
        } else {
            Err(PartialFailure { snapshot, failures })
        }
    }

    async fn add_one(&self, name: &str) -> Result<(), PoolError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PoolError::InvalidNode(name.to_string()));
        }
        let node = NodeId::new(name);

        {
            let mut state = self.state.write().await;
            if state.nodes.contains_key(name) {
                tracing::debug!("Node {} already tracked, skipping", name);
                return Ok(());
            }

            let needed = state.ring.config().virtual_nodes;
            let free = state.ring.free_slots();
            if free < needed {
                return Err(RingFull {
                    node: name.to_string(),
                    needed,
                    free,
                }
                .into());
            }

            state
                .nodes
                .insert(name.to_string(), NodeRecord::new(node.clone()));
        }

        let created = bounded(
            "create",
            &node,
            self.call_timeout,
            self.provisioner.create(&node),
        )
        .await;

        if let Err(e) = created {
            self.state.write().await.nodes.remove(name);
            self.release(&node).await;
            return Err(PoolError::provisioning(name, e));
        }

        let placed = {
            let mut state = self.state.write().await;
            match state.ring.add_node(&node) {
                Ok(()) => {
                    state.transition(name, NodeState::Running);
                    Ok(())
                }
                Err(e) => {
                    state.nodes.remove(name);
                    Err(e)
                }
            }
        };

        if let Err(e) = placed {
            self.release(&node).await;
            return Err(e.into());
        }

        tracing::info!("Added node {} (ordinal {})", node, node.ordinal);
        Ok(())
    }

    /// Best-effort teardown of a node that could not be registered.
    async fn release(&self, node: &NodeId) {
        match bounded(
            "destroy",
            node,
            self.call_timeout,
            self.provisioner.destroy(node),
        )
        .await
        {
            Ok(()) => tracing::debug!("Released resources of {}", node),
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::warn!("Failed to release {}: {}", node, e),
        }
    }

    /// Stops the node, evicts it from the ring and forgets it.
    pub async fn remove_node(&self, name: &str) -> Result<PoolSnapshot, PoolError> {
        let _membership = self.membership.lock().await;

        let node = {
            let state = self.state.read().await;
            state
                .nodes
                .get(name)
                .map(|record| record.id.clone())
                .ok_or_else(|| PoolError::NotFound(name.to_string()))?
        };

        match bounded(
            "destroy",
            &node,
            self.call_timeout,
            self.provisioner.destroy(&node),
        )
        .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("Node {} was already gone", node);
            }
            Err(e) => return Err(PoolError::provisioning(name, e)),
        }

        let mut state = self.state.write().await;
        state.ring.remove_node(&node);
        state.nodes.remove(name);

        tracing::info!("Removed node {}, {} node(s) left", node, state.nodes.len());
        Ok(state.ring.describe())
    }

    /// Stops every tracked node and empties the ring.
    ///
    /// The pool ends up empty even if some nodes could not be stopped; those are reported.
    pub async fn clear(&self) -> Result<PoolSnapshot, PartialFailure> {
        let _membership = self.membership.lock().await;

        let mut nodes: Vec<NodeId> = {
            let state = self.state.read().await;
            state.nodes.values().map(|record| record.id.clone()).collect()
        };
        nodes.sort();

        let mut failures = Vec::new();
        for node in &nodes {
            let result = bounded(
                "destroy",
                node,
                self.call_timeout,
                self.provisioner.destroy(node),
            )
            .await;

            match result {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    tracing::warn!("Failed to stop {} during clear: {}", node, e);
                    failures.push(NodeFailure::new(
                        &node.name,
                        &PoolError::provisioning(&node.name, e),
                    ));
                }
            }
        }

        let snapshot = {
            let mut state = self.state.write().await;
            state.ring.clear();
            state.nodes.clear();
            state.ring.describe()
        };

        tracing::info!("Cleared pool ({} node(s) stopped)", nodes.len());

        if failures.is_empty() {
            Ok(snapshot)
        } else {
            Err(PartialFailure { snapshot, failures })
        }
    }

    pub async fn route(&self, request_id: u64) -> Option<NodeId> {
        let state = self.state.read().await;
        let node = state.ring.route(request_id).cloned();

        tracing::debug!(
            "Request {} (slot {}) -> {:?}",
            request_id,
            state.ring.target_slot(request_id),
            node.as_ref().map(NodeId::as_str)
        );

        node
    }

    /// Recreates `node` under the same name after a delivery failure.
    ///
    /// The ring placement is reused when the node still has one. If reprovisioning fails the
    /// node is left `Suspect` so that a later request can try again. A node that was not
    /// tracked when recovery started is forgotten again on failure.
    pub async fn recover(&self, node: &NodeId) -> Result<NodeId, PoolError> {
        let _membership = self.membership.lock().await;

        let (node, untracked) = {
            let mut state = self.state.write().await;
            let untracked = !state.nodes.contains_key(&node.name);
            let record = state
                .nodes
                .entry(node.name.clone())
                .or_insert_with(|| NodeRecord::new(node.clone()));
            record.recoveries += 1;
            let id = record.id.clone();
            state.transition(&id.name, NodeState::Suspect);
            (id, untracked)
        };

        tracing::warn!("Recovering node {}", node);

        match bounded(
            "destroy",
            &node,
            self.call_timeout,
            self.provisioner.destroy(&node),
        )
        .await
        {
            Ok(()) => tracing::info!("Removed failed node {}", node),
            Err(e) if e.is_not_found() => {
                tracing::info!("Node {} not found, safe to recreate", node);
            }
            Err(e) => return Err(self.recovery_failed(&node, untracked, e.to_string()).await),
        }

        {
            let mut state = self.state.write().await;
            state.transition(&node.name, NodeState::Removed);
            state.transition(&node.name, NodeState::Provisioning);
        }

        let created = bounded(
            "create",
            &node,
            self.call_timeout,
            self.provisioner.create(&node),
        )
        .await;

        if let Err(e) = created {
            return Err(self.recovery_failed(&node, untracked, e.to_string()).await);
        }

        let placed = {
            let mut state = self.state.write().await;
            let placed = if state.ring.contains(&node) {
                Ok(())
            } else {
                tracing::info!("Re-adding {} to the ring", node);
                state.ring.add_node(&node)
            };
            if placed.is_ok() {
                state.transition(&node.name, NodeState::Running);
            }
            placed
        };

        if let Err(e) = placed {
            self.release(&node).await;
            return Err(self.recovery_failed(&node, untracked, e.to_string()).await);
        }

        tracing::info!("Recovered and restarted node {}", node);
        Ok(node)
    }

    async fn recovery_failed(&self, node: &NodeId, untracked: bool, reason: String) -> PoolError {
        {
            let mut state = self.state.write().await;
            if untracked {
                state.nodes.remove(&node.name);
            } else {
                state.transition(&node.name, NodeState::Suspect);
            }
        }

        tracing::error!("Failed to recover {}: {}", node, reason);
        PoolError::Recovery {
            node: node.name.clone(),
            reason,
        }
    }

    /// Clears a stale `Suspect` mark after the node answered a request.
    pub async fn mark_running(&self, node: &NodeId) {
        {
            let state = self.state.read().await;
            match state.nodes.get(&node.name) {
                Some(record) if record.state == NodeState::Suspect => {}
                _ => return,
            }
        }

        let mut state = self.state.write().await;
        if state
            .nodes
            .get(&node.name)
            .is_some_and(|record| record.state == NodeState::Suspect)
        {
            state.transition(&node.name, NodeState::Running);
        }
    }

    /// True if `name` entered `Running` after `at`.
    pub async fn running_since(&self, name: &str, at: Instant) -> bool {
        self.state
            .read()
            .await
            .nodes
            .get(name)
            .is_some_and(|record| record.state == NodeState::Running && record.since > at)
    }

    pub async fn snapshot(&self) -> PoolSnapshot {
        self.state.read().await.ring.describe()
    }

    pub async fn state_of(&self, name: &str) -> Option<NodeState> {
        self.state.read().await.nodes.get(name).map(|r| r.state)
    }

    pub async fn record(&self, name: &str) -> Option<NodeRecord> {
        self.state.read().await.nodes.get(name).cloned()
    }

    pub async fn slots_of(&self, name: &str) -> Option<Vec<usize>> {
        let state = self.state.read().await;
        let record = state.nodes.get(name)?;
        state.ring.slots_of(&record.id).map(<[usize]>::to_vec)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.nodes.is_empty()
    }
}
