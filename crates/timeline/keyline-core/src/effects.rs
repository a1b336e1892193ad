#![allow(dead_code)]
//! Deferred effects emitted during a tick.
//!
//! Keyframe callbacks, fireEvent records, and the lifecycle hooks all
//! resolve to an [`EffectAction`] — plain data naming a host function or a
//! host event. By default actions are appended to the tree's queue and
//! drained by the driver after the tick, so side effects never mutate tree
//! state mid-traversal; actions flagged `fireImmediately` are handed to the
//! host sink during the walk instead.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// What the host should do when an effect fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectAction {
    /// Direct invocation of a host function by handle.
    #[serde(rename_all = "camelCase")]
    Invoke {
        func: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<serde_json::Value>,
    },
    /// A named event raised against an optional scope handle.
    #[serde(rename_all = "camelCase")]
    EmitEvent {
        event: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<serde_json::Value>,
    },
}

/// Authoring descriptor for keyframe callbacks and the `onStart` /
/// `onUpdate` / `onEnd` hooks: the action plus its dispatch mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackSpec {
    #[serde(flatten)]
    pub action: EffectAction,
    /// Dispatch through the host sink mid-walk instead of deferring.
    #[serde(default)]
    pub fire_immediately: bool,
}

impl CallbackSpec {
    /// Deferred invocation of a host function.
    pub fn invoke(func: impl Into<String>) -> Self {
        Self {
            action: EffectAction::Invoke {
                func: func.into(),
                args: Vec::new(),
            },
            fire_immediately: false,
        }
    }

    /// Deferred event against a scope handle.
    pub fn emit(event: impl Into<String>, scope: Option<&str>) -> Self {
        Self {
            action: EffectAction::EmitEvent {
                event: event.into(),
                scope: scope.map(str::to_string),
                args: Vec::new(),
            },
            fire_immediately: false,
        }
    }

    pub fn immediately(mut self) -> Self {
        self.fire_immediately = true;
        self
    }
}

/// One recorded effect: which node produced it and what to do.
///
/// `step_ms` is populated for `onUpdate`-originated effects — that hook's
/// contract passes the effective time step along to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub node: NodeId,
    pub action: EffectAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_ms: Option<f64>,
}

/// The deferred-effect buffer owned by the tree.
///
/// Append-only while a tick is in flight; the driver drains it exactly once
/// per tick. A capacity limit guards against a driver that forgets to
/// drain: past the limit, effects are dropped with a warning.
#[derive(Debug, Serialize)]
pub struct EffectQueue {
    effects: Vec<Effect>,
    #[serde(skip)]
    limit: usize,
    dropped: usize,
}

impl EffectQueue {
    pub fn new(capacity: usize, limit: usize) -> Self {
        Self {
            effects: Vec::with_capacity(capacity),
            limit,
            dropped: 0,
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(cfg.effect_capacity, cfg.max_effects_per_tick)
    }

    #[inline]
    pub fn push(&mut self, effect: Effect) {
        if self.effects.len() >= self.limit {
            self.dropped += 1;
            log::warn!(
                "effect queue limit ({}) reached; dropping effect from {:?} ({} dropped so far)",
                self.limit,
                effect.node,
                self.dropped
            );
            return;
        }
        self.effects.push(effect);
    }

    /// Hand the accumulated effects to the caller and reset the buffer.
    #[inline]
    pub fn drain(&mut self) -> Vec<Effect> {
        self.dropped = 0;
        std::mem::take(&mut self.effects)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Effect] {
        &self.effects
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects discarded since the last drain.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for EffectQueue {
    fn default() -> Self {
        Self::from_config(&crate::config::Config::default())
    }
}
