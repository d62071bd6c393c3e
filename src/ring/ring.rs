//! Slot-based consistent hash ring.

use std::collections::{BTreeMap, HashMap};

use super::hashing::{request_slot, virtual_slot};
use super::types::{NodeId, RingConfig, RingFull, RingSnapshot, Slot};

/// Fixed-size ring of slots with virtual-node placement.
///
/// `occupied` holds every bound slot; `placements` remembers, per node, the slots its
/// replicas landed on (replica 0 first) so removal never has to re-run the probe.
#[derive(Debug, Clone)]
pub struct HashRing {
    config: RingConfig,
    occupied: BTreeMap<Slot, NodeId>,
    placements: HashMap<NodeId, Vec<Slot>>,
    order: Vec<NodeId>,
}

impl HashRing {
    /// `config` is expected to have passed `RingConfig::validate`.
    pub fn new(config: RingConfig) -> Self {
        Self {
            config,
            occupied: BTreeMap::new(),
            placements: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn config(&self) -> RingConfig {
        self.config
    }

    /// Places all replicas of `node`, or none of them.
    ///
    /// Adding a node that is already on the ring is a no-op.
    pub fn add_node(&mut self, node: &NodeId) -> Result<(), RingFull> {
        if self.placements.contains_key(node) {
            return Ok(());
        }

        let needed = self.config.virtual_nodes;
        let free = self.free_slots();
        if free < needed {
            return Err(RingFull {
                node: node.name.clone(),
                needed,
                free,
            });
        }

        let mut slots = Vec::with_capacity(needed);
        for replica in 0..needed {
            let candidate = virtual_slot(node.ordinal, replica, self.config.num_slots);
            // Free capacity was checked up front, so the probe always lands.
            let Some(slot) = self.probe_free(candidate) else {
                for slot in &slots {
                    self.occupied.remove(slot);
                }
                return Err(RingFull {
                    node: node.name.clone(),
                    needed,
                    free,
                });
            };
            self.occupied.insert(slot, node.clone());
            slots.push(slot);
        }

        tracing::debug!("Placed {} on slots {:?}", node, slots);

        self.placements.insert(node.clone(), slots);
        self.order.push(node.clone());
        Ok(())
    }

    /// Vacates every slot bound to `node`. Unknown nodes are ignored.
    pub fn remove_node(&mut self, node: &NodeId) -> bool {
        let Some(slots) = self.placements.remove(node) else {
            return false;
        };

        for slot in &slots {
            self.occupied.remove(slot);
        }
        self.order.retain(|n| n != node);

        tracing::debug!("Vacated slots {:?} held by {}", slots, node);
        true
    }

    /// Resolves a request to the owner of the first occupied slot clockwise from its target.
    pub fn route(&self, request_id: u64) -> Option<&NodeId> {
        let target = self.target_slot(request_id);

        self.occupied
            .range(target..)
            .chain(self.occupied.range(..target))
            .map(|(_, node)| node)
            .next()
    }

    pub fn target_slot(&self, request_id: u64) -> Slot {
        request_slot(request_id, self.config.num_slots)
    }

    pub fn clear(&mut self) {
        self.occupied.clear();
        self.placements.clear();
        self.order.clear();
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.placements.contains_key(node)
    }

    pub fn slots_of(&self, node: &NodeId) -> Option<&[Slot]> {
        self.placements.get(node).map(Vec::as_slice)
    }

    pub fn owner_of(&self, slot: Slot) -> Option<&NodeId> {
        self.occupied.get(&slot)
    }

    pub fn free_slots(&self) -> usize {
        self.config.num_slots - self.occupied.len()
    }

    pub fn occupied_slots(&self) -> Vec<Slot> {
        self.occupied.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in the order they joined.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn describe(&self) -> RingSnapshot {
        RingSnapshot {
            node_count: self.order.len(),
            nodes: self.order.iter().map(|n| n.name.clone()).collect(),
            slots_per_node: self
                .placements
                .iter()
                .map(|(node, slots)| (node.name.clone(), slots.clone()))
                .collect(),
        }
    }

    /// Walks forward from `start` until an unoccupied slot is found, trying each slot once.
    fn probe_free(&self, start: Slot) -> Option<Slot> {
        let n = self.config.num_slots;
        (0..n)
            .map(|step| (start + step) % n)
            .find(|slot| !self.occupied.contains_key(slot))
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(RingConfig::default())
    }
}
