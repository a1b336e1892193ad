#![allow(dead_code)]
//! Authoring-config ingestion. Specs arrive as lenient JSON (hand-written
//! or exported); normalization turns the `animate` section into a canonical
//! keyframe sequence. Malformed pieces are skipped with a warning instead of
//! failing the whole insert.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::effects::CallbackSpec;
use crate::error::Result;
use crate::ids::NodeId;
use crate::keyframe::{EventSpec, Keyframe};
use crate::value::KeyValue;

/// Authoring-side description of one node, before it is attached to a tree.
///
/// Unknown keys are kept in `extra` so hosts can stash metadata on a node
/// and search for it later.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeSpec {
    /// Display/search name. Defaults to `<target>:<prop>Animation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Handle of the object the writes address. Inherited from the parent
    /// when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Property on the target that scalar keyframes write to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animate: Option<AnimateSpec>,
    pub running: bool,
    pub playback_speed: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Milliseconds of local time to swallow before the first frame plays.
    pub delay: f64,
    /// One-shot head start added to the first step after a restore.
    pub start_time_offset: f64,
    pub local_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_start: Option<CallbackSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<CallbackSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_end: Option<CallbackSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildSpec>,
    /// Attach under an already-inserted node instead of becoming a root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            id: None,
            target: None,
            prop: None,
            animate: None,
            running: false,
            playback_speed: 1.0,
            looping: false,
            delay: 0.0,
            start_time_offset: 0.0,
            local_time: 0.0,
            on_start: None,
            on_update: None,
            on_end: None,
            children: Vec::new(),
            parent: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// A child entry is either the handle of a node already in the tree or an
/// inline spec to insert.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildSpec {
    Existing(NodeId),
    Spec(NodeSpec),
}

/// The `animate` section as authored: either an explicit keyframe list or a
/// map keyed by time in milliseconds. Entries stay raw JSON here so a bad
/// one can be dropped without losing its siblings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimateSpec {
    Frames(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Long form of a map entry: `{ "value": ..., "ease": ..., ... }`.
/// Detection keys off a defined (non-null) `value`, so a fields object that
/// itself contains a `value` key is read as this form.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordSpec {
    value: KeyValue,
    #[serde(default)]
    ease: Option<String>,
    #[serde(default)]
    callback: Option<CallbackSpec>,
    #[serde(default)]
    fire_event: Option<EventSpec>,
    #[serde(default)]
    go_to: Option<usize>,
}

/// Parse a map key as milliseconds. Accepts integer and float spellings
/// with surrounding whitespace; text after a leading integer ("500ms") is
/// ignored. Keys that do not start with a number are unusable.
fn parse_time_key(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(whole) = trimmed.parse::<i64>() {
        return Some(whole as f64);
    }
    if let Ok(ms) = trimmed.parse::<f64>() {
        if ms.is_finite() {
            return Some(ms);
        }
    }
    let bytes = trimmed.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    while bytes.get(end).map_or(false, u8::is_ascii_digit) {
        end += 1;
    }
    let prefix = &trimmed[..end];
    if prefix.is_empty() || prefix == "+" || prefix == "-" {
        return None;
    }
    match prefix.parse::<f64>() {
        Ok(ms) if ms.is_finite() => Some(ms),
        _ => None,
    }
}

fn map_entry_to_frame(time: f64, raw: &Value) -> Option<Keyframe> {
    let is_record = raw
        .as_object()
        .and_then(|obj| obj.get("value"))
        .map_or(false, |v| !v.is_null());
    if is_record {
        match serde_json::from_value::<RecordSpec>(raw.clone()) {
            Ok(rec) => {
                let mut frame = Keyframe::new(time, rec.value);
                frame.ease = rec.ease;
                frame.callback = rec.callback;
                frame.fire_event = rec.fire_event;
                frame.go_to = rec.go_to;
                Some(frame)
            }
            Err(err) => {
                log::warn!("Skipping keyframe at {}ms: {}", time, err);
                None
            }
        }
    } else {
        match serde_json::from_value::<KeyValue>(raw.clone()) {
            Ok(value) => Some(Keyframe::new(time, value)),
            Err(err) => {
                log::warn!("Skipping keyframe at {}ms: {}", time, err);
                None
            }
        }
    }
}

/// Build the canonical keyframe sequence for one node.
///
/// Map-form entries are sorted by parsed time; the sort is stable, so
/// duplicate times keep the map's key order. Explicit lists are trusted as
/// authored; an out-of-order list is reported but not reordered.
pub fn normalize_animate(spec: &AnimateSpec, prop: Option<&str>) -> Vec<Keyframe> {
    let mut frames: Vec<Keyframe> = Vec::new();
    match spec {
        AnimateSpec::Map(entries) => {
            for (key, raw) in entries {
                let time = match parse_time_key(key) {
                    Some(ms) => ms,
                    None => {
                        log::warn!("Skipping keyframe with unparseable time key {:?}", key);
                        continue;
                    }
                };
                if let Some(frame) = map_entry_to_frame(time, raw) {
                    frames.push(frame);
                }
            }
            frames.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        AnimateSpec::Frames(entries) => {
            for (idx, raw) in entries.iter().enumerate() {
                match serde_json::from_value::<Keyframe>(raw.clone()) {
                    Ok(frame) if frame.time.is_finite() => frames.push(frame),
                    Ok(frame) => {
                        log::warn!(
                            "Skipping keyframe {} with non-finite time {}",
                            idx,
                            frame.time
                        );
                    }
                    Err(err) => {
                        log::warn!("Skipping malformed keyframe {}: {}", idx, err);
                    }
                }
            }
            if frames.windows(2).any(|pair| pair[0].time > pair[1].time) {
                log::warn!("Keyframe list is not sorted by time; keeping authored order");
            }
        }
    }
    if prop.is_none() && frames.iter().any(|frame| frame.value.is_scalar()) {
        log::warn!("Scalar keyframes without a prop write to the bare target handle");
    }
    frames
}

/// Name used when a spec carries no `id`.
pub(crate) fn default_name(target: Option<&str>, prop: Option<&str>) -> String {
    format!(
        "{}:{}Animation",
        target.unwrap_or_default(),
        prop.unwrap_or_default()
    )
}

/// Deserialize a spec from a JSON value, shedding the pieces that cannot be
/// used (non-string `target`, `animate` that is neither a list nor a map)
/// instead of rejecting the node.
pub fn node_spec_from_value(mut value: Value) -> Result<NodeSpec> {
    sanitize_spec_value(&mut value);
    let spec = serde_json::from_value(value)?;
    Ok(spec)
}

/// [`node_spec_from_value`] for a JSON string.
pub fn node_spec_from_json(json: &str) -> Result<NodeSpec> {
    let value: Value = serde_json::from_str(json)?;
    node_spec_from_value(value)
}

fn sanitize_spec_value(value: &mut Value) {
    let obj = match value.as_object_mut() {
        Some(obj) => obj,
        None => return,
    };
    if let Some(animate) = obj.get("animate") {
        if !(animate.is_array() || animate.is_object() || animate.is_null()) {
            log::warn!("Dropping animate config that is neither a list nor a time map");
            obj.remove("animate");
        }
    }
    if let Some(target) = obj.get("target") {
        if !(target.is_string() || target.is_null()) {
            log::warn!("Dropping non-string target {:?}", target);
            obj.remove("target");
        }
    }
    if let Some(children) = obj.get_mut("children") {
        if let Some(list) = children.as_array_mut() {
            for child in list {
                sanitize_spec_value(child);
            }
        }
    }
}
