//! Consistent Hash Ring Module
//!
//! Maps request identifiers onto a fixed space of slots and resolves each slot to the
//! node that owns it. This is a pure data structure: it performs no I/O and owns no locks,
//! so it is always manipulated by a single owner (`NodePool`).
//!
//! ## Core Mechanisms
//! - **Virtual Nodes**: Every physical node is placed on the ring `virtual_nodes` times to
//!   smooth out the share of the identifier space each node owns.
//! - **Linear Probing**: A replica whose computed slot is taken walks forward one slot at a
//!   time until it finds a free one, so placement stays reproducible.
//! - **Clockwise Lookup**: A request is served by the first occupied slot at or after its
//!   target slot, wrapping around to slot 0.

pub mod hashing;
pub mod ring;
pub mod types;

pub use ring::HashRing;
pub use types::{
    DEFAULT_NUM_SLOTS, DEFAULT_VIRTUAL_NODES, NodeId, RingConfig, RingFull, RingSnapshot, Slot,
};
