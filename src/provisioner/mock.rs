//! Scripted `NodeProvisioner` used by the pool, dispatcher and API tests.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::types::{NodeProvisioner, ProvisionError};
use crate::ring::NodeId;

#[derive(Default)]
pub struct ScriptedProvisioner {
    running: DashSet<String>,
    fail_create: DashSet<String>,
    fail_destroy: DashSet<String>,
    fail_delivery: DashSet<String>,
    create_calls: DashMap<String, usize>,
    destroy_calls: AtomicUsize,
    create_delay: Option<Duration>,
    invoke_delay: Option<Duration>,
}

impl ScriptedProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create` sleeps for `delay` before completing.
    pub fn with_create_delay(delay: Duration) -> Self {
        Self {
            create_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Every `invoke` sleeps for `delay` before answering.
    pub fn with_invoke_delay(delay: Duration) -> Self {
        Self {
            invoke_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_create(&self, name: &str) {
        self.fail_create.insert(name.to_string());
    }

    pub fn allow_create(&self, name: &str) {
        self.fail_create.remove(name);
    }

    pub fn fail_destroy(&self, name: &str) {
        self.fail_destroy.insert(name.to_string());
    }

    /// Makes health checks and invocations of `name` fail until the node is recreated.
    pub fn break_node(&self, name: &str) {
        self.fail_delivery.insert(name.to_string());
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }

    pub fn create_calls(&self, name: &str) -> usize {
        self.create_calls.get(name).map(|c| *c).unwrap_or(0)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeProvisioner for ScriptedProvisioner {
    async fn create(&self, node: &NodeId) -> Result<(), ProvisionError> {
        *self.create_calls.entry(node.name.clone()).or_insert(0) += 1;

        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create.contains(&node.name) {
            return Err(ProvisionError::failed(node, "scripted create failure"));
        }
        if self.running.contains(&node.name) {
            return Err(ProvisionError::AlreadyRunning(node.name.clone()));
        }

        self.fail_delivery.remove(&node.name);
        self.running.insert(node.name.clone());
        Ok(())
    }

    async fn destroy(&self, node: &NodeId) -> Result<(), ProvisionError> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_destroy.contains(&node.name) {
            return Err(ProvisionError::failed(node, "scripted destroy failure"));
        }
        match self.running.remove(&node.name) {
            Some(_) => Ok(()),
            None => Err(ProvisionError::NotFound(node.name.clone())),
        }
    }

    async fn health_check(&self, node: &NodeId) -> Result<(), ProvisionError> {
        if !self.running.contains(&node.name) {
            return Err(ProvisionError::NotFound(node.name.clone()));
        }
        if self.fail_delivery.contains(&node.name) {
            return Err(ProvisionError::NotRunning(node.name.clone()));
        }
        Ok(())
    }

    async fn invoke(&self, node: &NodeId) -> Result<String, ProvisionError> {
        self.health_check(node).await?;
        if let Some(delay) = self.invoke_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("Hello from Server: {}", node.name))
    }
}
