#![allow(dead_code)]
//! Host boundary: target handles, property writes, and the sink trait.
//!
//! v1 uses small string keys as TargetHandle. The tree never touches host
//! objects itself — every interpolated value flows through the host's
//! [`TargetSink`] while the walk is in progress, preserving the original
//! write ordering (parent before children, siblings in stored order).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effects::Effect;

/// Opaque target handle for v1 (small string key).
pub type TargetHandle = String;

/// One interpolated value headed for the host.
///
/// `prop` is the node's property path; `key` is the sub-property when the
/// keyframe value is a field map. With `prop` unset, field-map writes land
/// directly on the target (`target[key]`) — the single-property shorthand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyWrite {
    pub target: TargetHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: f64,
}

impl fmt::Display for PropertyWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = self.target.clone();
        if let Some(prop) = &self.prop {
            path.push('.');
            path.push_str(prop);
        }
        if let Some(key) = &self.key {
            path.push('.');
            path.push_str(key);
        }
        write!(f, "{{ path: {}, value: {} }}", path, self.value)
    }
}

/// Host-side receiver for a tick.
///
/// `apply` is called for every property write, in traversal order, while
/// the tick runs. `dispatch` receives only effects whose callback was
/// marked `fireImmediately`; everything else goes through the deferred
/// queue. The default `dispatch` drops the effect, which suits headless
/// hosts.
pub trait TargetSink {
    fn apply(&mut self, write: PropertyWrite);

    fn dispatch(&mut self, effect: Effect) {
        let _ = effect;
    }
}

/// Sink that discards everything. Useful for benches and for ticking trees
/// whose only outputs are deferred effects.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullSink;

impl TargetSink for NullSink {
    fn apply(&mut self, _write: PropertyWrite) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_the_write_path() {
        let w = PropertyWrite {
            target: "wheel".into(),
            prop: Some("display".into()),
            key: Some("x".into()),
            value: 0.5,
        };
        assert_eq!(w.to_string(), "{ path: wheel.display.x, value: 0.5 }");

        let bare = PropertyWrite {
            target: "wheel".into(),
            prop: None,
            key: Some("angle".into()),
            value: 90.0,
        };
        assert_eq!(bare.to_string(), "{ path: wheel.angle, value: 90 }");
    }
}
