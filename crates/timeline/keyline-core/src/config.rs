#![allow(dead_code)]
//! Core configuration for keyline-core.

use serde::{Deserialize, Serialize};

/// Configuration for tree sizing and effect backpressure.
/// Keep this minimal in v1; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Initial capacity hint for the node arena.
    pub node_capacity: usize,

    /// Initial capacity hint for the deferred-effect queue.
    pub effect_capacity: usize,

    /// Maximum deferred effects retained per drain interval. Past the cap,
    /// effects are dropped with a warning so an undrained queue cannot grow
    /// without bound.
    pub max_effects_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_capacity: 64,
            effect_capacity: 128,
            max_effects_per_tick: 1024,
        }
    }
}
