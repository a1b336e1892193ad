#![allow(dead_code)]
//! Identifiers and a simple allocator for timeline nodes.

use serde::{Deserialize, Serialize};

/// Stable handle for a node in a [`Timeline`](crate::Timeline) arena.
///
/// Handles survive sibling insertion and removal; they are only invalidated
/// when the node itself is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Monotonic allocator for NodeId.
/// Dense indices improve cache locality; IDs are opaque externally.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_node: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node = self.next_node.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
