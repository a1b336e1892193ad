#![allow(dead_code)]
//! A single node of the timeline tree: identity, clocks, playback flags,
//! canonical keyframes and the callback sideband. Tree wiring and lifecycle
//! traversal live in [`crate::tree`]; per-tick advancement in
//! [`crate::advance`].

use serde::Serialize;
use serde_json::Value;

use crate::effects::CallbackSpec;
use crate::ids::NodeId;
use crate::keyframe::{Cursor, Keyframe};
use crate::normalize::{self, NodeSpec};
use crate::target::TargetHandle;

/// Coarse lifecycle view derived from the playback flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaybackState {
    /// Not advancing.
    Idle,
    /// Advancing on every tick.
    Playing,
    /// Finished its pass and waiting for siblings before the parent wraps.
    LoopPending,
}

/// Tree unit. All playback fields are public; `id`/`parent`/`children` are
/// linkage owned by the tree and only readable from outside.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Search/display name; defaults to `<target>:<prop>Animation`.
    pub name: String,
    pub target: Option<TargetHandle>,
    pub prop: Option<String>,
    pub key_frames: Vec<Keyframe>,
    pub cursor: Cursor,
    /// Milliseconds of (speed-adjusted) wall time since the last restore.
    /// Gates `delay`; distinct from the animation clock in `cursor`.
    pub local_time: f64,
    pub delay: f64,
    /// One-shot head start folded into the first step after a restore.
    pub start_time_offset: f64,
    pub playback_speed: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub running: bool,
    /// Done with the current pass. Cleared while a non-looping child is
    /// still running so the parent waits before wrapping.
    pub ready_to_loop: bool,
    pub on_start: Option<CallbackSpec>,
    pub on_update: Option<CallbackSpec>,
    pub on_end: Option<CallbackSpec>,
    /// Unrecognized spec keys, searchable through find_child.
    pub extra: serde_json::Map<String, Value>,
}

impl TimelineNode {
    pub(crate) fn from_spec(
        id: NodeId,
        spec: &NodeSpec,
        target: Option<TargetHandle>,
        key_frames: Vec<Keyframe>,
    ) -> Self {
        let name = match &spec.id {
            Some(name) => name.clone(),
            None => normalize::default_name(target.as_deref(), spec.prop.as_deref()),
        };
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name,
            target,
            prop: spec.prop.clone(),
            key_frames,
            cursor: Cursor::default(),
            local_time: spec.local_time,
            delay: spec.delay,
            start_time_offset: spec.start_time_offset,
            playback_speed: spec.playback_speed,
            looping: spec.looping,
            running: spec.running,
            ready_to_loop: false,
            on_start: spec.on_start.clone(),
            on_update: spec.on_update.clone(),
            on_end: spec.on_end.clone(),
            extra: spec.extra.clone(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// At least two keyframes and somewhere to write them. Nodes that fail
    /// this are pure group/ticker nodes: their own pass is inert.
    #[inline]
    pub fn is_animatable(&self) -> bool {
        self.key_frames.len() >= 2 && self.target.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        if self.running {
            PlaybackState::Playing
        } else if self.ready_to_loop {
            PlaybackState::LoopPending
        } else {
            PlaybackState::Idle
        }
    }

    /// Rewind the animation clock and let every frame's sideband fire again.
    pub(crate) fn restore_animation(&mut self) {
        self.cursor.reset();
        for frame in &mut self.key_frames {
            frame.reset_markers();
        }
    }

    /// Property lookup used by find: well-known keys first, then `extra`.
    pub(crate) fn matches_key(&self, value: &str, key: &str) -> bool {
        match key {
            "id" => self.name == value,
            "target" => self.target.as_deref() == Some(value),
            "prop" => self.prop.as_deref() == Some(value),
            other => self
                .extra
                .get(other)
                .and_then(Value::as_str)
                .map_or(false, |v| v == value),
        }
    }
}
