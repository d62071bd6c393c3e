//! Node Pool Module
//!
//! Owns the hash ring together with the authoritative table of known nodes and their
//! lifecycle state. It is the only component allowed to mutate either of them.
//!
//! ## Core Mechanisms
//! - **Single Writer**: Membership operations (add, remove, clear, recover) are serialized
//!   behind one lock, while routing lookups only take a shared read lock on the state.
//! - **Lifecycle**: `Provisioning -> Running -> Suspect`, back to `Running` on recovery, with
//!   `Suspect -> Removed -> Provisioning` while a node is being recreated.
//! - **Partial Success**: Batch operations report failures per node; nodes that succeeded
//!   stay active.

pub mod service;
pub mod types;

pub use service::NodePool;
pub use types::{NodeRecord, NodeState, PoolSnapshot};
