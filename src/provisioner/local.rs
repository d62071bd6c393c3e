//! In-process node runtime.
//!
//! Each node is an axum server bound to an ephemeral port on `host`, running on its own
//! tokio task. Destroying a node aborts the task; a node is health-checked and invoked over
//! real HTTP, so a hung or dead server is observed exactly like a remote one.

use async_trait::async_trait;
use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::types::{NodeProvisioner, ProvisionError};
use crate::backend::{self, ENDPOINT_HEARTBEAT, ENDPOINT_HOME};
use crate::ring::NodeId;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

struct LocalNode {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    alive: bool,
}

impl LocalNode {
    fn is_serving(&self) -> bool {
        self.alive && !self.handle.is_finished()
    }
}

pub struct LocalProvisioner {
    host: IpAddr,
    nodes: DashMap<String, LocalNode>,
    http_client: reqwest::Client,
    request_timeout: Duration,
}

impl LocalProvisioner {
    pub fn new(host: IpAddr) -> Self {
        Self::with_timeout(host, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(host: IpAddr, request_timeout: Duration) -> Self {
        Self {
            host,
            nodes: DashMap::new(),
            http_client: reqwest::Client::new(),
            request_timeout,
        }
    }

    pub fn address_of(&self, name: &str) -> Option<SocketAddr> {
        self.nodes.get(name).map(|entry| entry.addr)
    }

    pub fn running_nodes(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .nodes
            .iter()
            .filter(|entry| entry.value().is_serving())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Kills the node's server but keeps its record, as if the process died on its own.
    pub fn crash(&self, name: &str) -> bool {
        match self.nodes.get_mut(name) {
            Some(mut entry) => {
                entry.alive = false;
                entry.handle.abort();
                tracing::warn!("Node {} at {} crashed", name, entry.addr);
                true
            }
            None => false,
        }
    }

    fn serving_addr(&self, node: &NodeId) -> Result<SocketAddr, ProvisionError> {
        match self.nodes.get(&node.name) {
            Some(entry) if entry.is_serving() => Ok(entry.addr),
            Some(_) => Err(ProvisionError::NotRunning(node.name.clone())),
            None => Err(ProvisionError::NotFound(node.name.clone())),
        }
    }

    async fn get(&self, node: &NodeId, path: &str) -> Result<reqwest::Response, ProvisionError> {
        let addr = self.serving_addr(node)?;

        let response = self
            .http_client
            .get(format!("http://{}{}", addr, path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ProvisionError::failed(node, e))?;

        if !response.status().is_success() {
            return Err(ProvisionError::failed(
                node,
                format!("{} returned {}", path, response.status()),
            ));
        }

        Ok(response)
    }
}

impl Default for LocalProvisioner {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

impl Drop for LocalProvisioner {
    fn drop(&mut self) {
        for entry in self.nodes.iter() {
            entry.handle.abort();
        }
    }
}

#[async_trait]
impl NodeProvisioner for LocalProvisioner {
    async fn create(&self, node: &NodeId) -> Result<(), ProvisionError> {
        let stale = self.nodes.get(&node.name).map(|entry| !entry.is_serving());
        match stale {
            Some(false) => return Err(ProvisionError::AlreadyRunning(node.name.clone())),
            Some(true) => {
                if let Some((_, old)) = self.nodes.remove(&node.name) {
                    old.handle.abort();
                }
                tracing::debug!("Discarded dead server for {}", node);
            }
            None => {}
        }

        let listener = TcpListener::bind(SocketAddr::new(self.host, 0))
            .await
            .map_err(|e| ProvisionError::failed(node, e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ProvisionError::failed(node, e))?;

        let app = backend::router(&node.name);
        let name = node.name.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("Server for {} stopped: {}", name, e);
            }
        });

        self.nodes.insert(
            node.name.clone(),
            LocalNode {
                addr,
                handle,
                alive: true,
            },
        );

        tracing::info!("Started node {} on {}", node, addr);
        Ok(())
    }

    async fn destroy(&self, node: &NodeId) -> Result<(), ProvisionError> {
        match self.nodes.remove(&node.name) {
            Some((_, entry)) => {
                entry.handle.abort();
                tracing::info!("Stopped node {} on {}", node, entry.addr);
                Ok(())
            }
            None => Err(ProvisionError::NotFound(node.name.clone())),
        }
    }

    async fn health_check(&self, node: &NodeId) -> Result<(), ProvisionError> {
        self.get(node, ENDPOINT_HEARTBEAT).await.map(|_| ())
    }

    async fn invoke(&self, node: &NodeId) -> Result<String, ProvisionError> {
        let response = self.get(node, ENDPOINT_HOME).await?;
        response
            .text()
            .await
            .map_err(|e| ProvisionError::failed(node, e))
    }
}
