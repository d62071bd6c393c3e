//! Routing and recovery driver.
//!
//! In-flight recoveries are tracked per node name. The first request to fail on a node
//! spawns the recovery as its own task and publishes the outcome on a `watch` channel;
//! later requests for the same node subscribe to that channel instead of starting another
//! one. The task clears its map entry once the outcome is published, so the next failure
//! after that starts a fresh attempt. A request routed before that attempt finished does
//! not start another one.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use super::types::RoutingOutcome;
use crate::error::PoolError;
use crate::pool::NodePool;
use crate::provisioner::{ProvisionError, bounded};
use crate::ring::NodeId;

type RecoveryOutcome = Option<Result<NodeId, PoolError>>;

/// Upper bound of server-generated request ids.
pub const MAX_REQUEST_ID: u64 = 10_000;

pub struct Dispatcher {
    pool: Arc<NodePool>,
    /// Node name -> outcome of the recovery currently running for it.
    recoveries: Arc<DashMap<String, watch::Receiver<RecoveryOutcome>>>,
}

impl Dispatcher {
    pub fn new(pool: Arc<NodePool>) -> Arc<Self> {
        Arc::new(Self {
            pool,
            recoveries: Arc::new(DashMap::new()),
        })
    }

    pub fn pool(&self) -> &Arc<NodePool> {
        &self.pool
    }

    /// Routes `request_id` and delivers it to the owning node.
    ///
    /// A failed delivery triggers one recovery of the node; the request is not retried.
    pub async fn handle_request(&self, request_id: u64) -> RoutingOutcome {
        let routed_at = Instant::now();
        let Some(node) = self.pool.route(request_id).await else {
            tracing::debug!("Request {} dropped, no nodes in the ring", request_id);
            return RoutingOutcome::NoNodes;
        };

        match self.deliver(&node).await {
            Ok(payload) => {
                self.pool.mark_running(&node).await;
                RoutingOutcome::Success { node, payload }
            }
            Err(e) => {
                tracing::warn!(
                    "Delivery of request {} to {} failed: {}",
                    request_id,
                    node,
                    e
                );

                match self.recover(&node, routed_at).await {
                    Ok(node) => RoutingOutcome::Recovered { node },
                    Err(e) => RoutingOutcome::Unavailable {
                        node,
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    async fn deliver(&self, node: &NodeId) -> Result<String, ProvisionError> {
        let provisioner = self.pool.provisioner();
        let limit = self.pool.call_timeout();

        bounded("health_check", node, limit, provisioner.health_check(node)).await?;
        bounded("invoke", node, limit, provisioner.invoke(node)).await
    }

    /// Joins the recovery already running for `node`, or starts one.
    ///
    /// Nothing is started if `node` came back up after `routed_at`; the failure was seen
    /// against the instance that has since been replaced.
    pub(crate) async fn recover(
        &self,
        node: &NodeId,
        routed_at: Instant,
    ) -> Result<NodeId, PoolError> {
        if self.pool.running_since(&node.name, routed_at).await {
            tracing::debug!("Node {} was recovered after the request was routed", node);
            return Ok(node.clone());
        }

        let mut outcome = match self.recoveries.entry(node.name.clone()) {
            Entry::Occupied(entry) => {
                tracing::debug!("Waiting on in-flight recovery of {}", node);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx.clone());
                self.spawn_recovery(node.clone(), tx);
                rx
            }
        };

        let result = outcome
            .wait_for(Option::is_some)
            .await
            .map(|published| (*published).clone());

        match result {
            Ok(Some(result)) => result,
            _ => Err(PoolError::Recovery {
                node: node.name.clone(),
                reason: "recovery task ended without an outcome".to_string(),
            }),
        }
    }

    fn spawn_recovery(&self, node: NodeId, tx: watch::Sender<RecoveryOutcome>) {
        let pool = self.pool.clone();
        let recoveries = self.recoveries.clone();

        tokio::spawn(async move {
            let result = pool.recover(&node).await;
            tx.send_replace(Some(result));
            recoveries.remove(&node.name);
        });
    }

    /// Number of nodes with a recovery in flight.
    pub fn recoveries_in_flight(&self) -> usize {
        self.recoveries.len()
    }
}

/// Draws a request id for callers that did not supply one.
pub fn random_request_id() -> u64 {
    rand::thread_rng().gen_range(1..=MAX_REQUEST_ID)
}
