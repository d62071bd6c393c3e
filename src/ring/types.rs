use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A position on the ring, always in `[0, num_slots)`.
pub type Slot = usize;

pub const DEFAULT_NUM_SLOTS: usize = 512;
pub const DEFAULT_VIRTUAL_NODES: usize = 9;

/// Identity of a backend node.
///
/// The `ordinal` is fixed when the id is created and is the only part of the identity the
/// hash functions look at. Names ending in digits use that number (`"S1"` -> 1); any other
/// name gets the CRC-32 of the full string, which is the same on every build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub name: String,
    pub ordinal: u64,
}

impl NodeId {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let ordinal = derive_ordinal(&name);
        Self { name, ordinal }
    }

    /// Creates an id with an explicit ordinal, bypassing derivation from the name.
    pub fn with_ordinal(name: impl Into<String>, ordinal: u64) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn derive_ordinal(name: &str) -> u64 {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx);

    if let Some(start) = digits_start
        && let Ok(value) = name[start..].parse::<u64>()
    {
        return value;
    }

    u64::from(crc32fast::hash(name.as_bytes()))
}

/// Geometry of the ring. Immutable once a `HashRing` is built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    pub num_slots: usize,
    pub virtual_nodes: usize,
}

impl RingConfig {
    pub fn new(num_slots: usize, virtual_nodes: usize) -> Self {
        Self {
            num_slots,
            virtual_nodes,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.num_slots == 0 {
            return Err("num_slots must be greater than zero".to_string());
        }
        if self.virtual_nodes == 0 {
            return Err("virtual_nodes must be greater than zero".to_string());
        }
        if self.virtual_nodes > self.num_slots {
            return Err(format!(
                "virtual_nodes ({}) cannot exceed num_slots ({})",
                self.virtual_nodes, self.num_slots
            ));
        }
        Ok(())
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_SLOTS, DEFAULT_VIRTUAL_NODES)
    }
}

/// Raised when a node cannot be placed because too few slots are free.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ring is full: node {node} needs {needed} free slots, only {free} left")]
pub struct RingFull {
    pub node: String,
    pub needed: usize,
    pub free: usize,
}

/// Read-only view of ring membership, serialized as part of every control-surface reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSnapshot {
    pub node_count: usize,
    pub nodes: Vec<String>,
    pub slots_per_node: BTreeMap<String, Vec<Slot>>,
}
