#![allow(dead_code)]
//! Canonical keyframe records and the playhead.
//! KeyValue lives in value.rs; callback/event descriptors in effects.rs.

use serde::{Deserialize, Serialize};

use crate::effects::CallbackSpec;
use crate::value::KeyValue;

/// Deferred-event descriptor carried on a keyframe's `fireEvent` field.
/// Always deferred (unlike callbacks there is no immediate mode).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpec {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
}

/// One canonical keyframe: a point on the node's animation clock plus the
/// sideband carried along from the authoring config.
///
/// `callback_fired` / `event_fired` are runtime markers making sideband
/// dispatch idempotent across ticks; they reset on restore, not on a
/// looping node's internal wrap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Milliseconds on the node's animation clock.
    pub time: f64,
    pub value: KeyValue,
    /// Easing-curve name resolved through the interpolator registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<CallbackSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_event: Option<EventSpec>,
    /// Index to jump the cursor to when this frame is reached. Not fully
    /// hardened; see the advancement module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_to: Option<usize>,

    #[serde(skip)]
    pub callback_fired: bool,
    #[serde(skip)]
    pub event_fired: bool,
}

impl Keyframe {
    pub fn new(time: f64, value: impl Into<KeyValue>) -> Self {
        Self {
            time,
            value: value.into(),
            ease: None,
            callback: None,
            fire_event: None,
            go_to: None,
            callback_fired: false,
            event_fired: false,
        }
    }

    #[inline]
    pub fn reset_markers(&mut self) {
        self.callback_fired = false;
        self.event_fired = false;
    }
}

/// Mutable playhead over a keyframe sequence.
///
/// `elapsed_ms` is the node's own animation clock — distinct from the
/// node's `local_time`, so a delay gate never consumes animation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub elapsed_ms: f64,
    pub index: usize,
}

impl Cursor {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_camel_case() {
        let json = r#"{
            "time": 500,
            "value": {"x": 1.0},
            "ease": "powerTwoOut",
            "goTo": 0,
            "fireEvent": {"event": "view:halfway", "scope": "view"}
        }"#;
        let kf: Keyframe = serde_json::from_str(json).unwrap();
        assert_eq!(kf.time, 500.0);
        assert_eq!(kf.go_to, Some(0));
        assert_eq!(kf.fire_event.as_ref().unwrap().event, "view:halfway");
        assert!(!kf.callback_fired);

        let back = serde_json::to_value(&kf).unwrap();
        assert!(back.get("goTo").is_some());
        assert!(back.get("fireEvent").is_some());
        assert!(back.get("callbackFired").is_none());
    }

    #[test]
    fn markers_reset_together() {
        let mut kf = Keyframe::new(0.0, 1.0);
        kf.callback_fired = true;
        kf.event_fired = true;
        kf.reset_markers();
        assert!(!kf.callback_fired && !kf.event_fired);
    }
}
