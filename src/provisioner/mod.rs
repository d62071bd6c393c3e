//! Node Provisioning Module
//!
//! Abstracts the runtime that actually hosts backend nodes. The routing and recovery core
//! only ever talks to the `NodeProvisioner` trait, so a process spawner, a container engine
//! or a remote agent can be swapped in without touching the ring or the pool.
//!
//! ## Submodules
//! - **`types`**: The `NodeProvisioner` capability, its error type and the bounded-call helper.
//! - **`local`**: `LocalProvisioner`, which hosts every node as an in-process HTTP server.

pub mod local;
pub mod types;

pub use local::LocalProvisioner;
pub use types::{NodeProvisioner, ProvisionError, bounded};

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests;
