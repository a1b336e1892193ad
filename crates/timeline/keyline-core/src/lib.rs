#![allow(dead_code)]
//! keyline core (engine-agnostic)
//!
//! A hierarchical keyframe timeline: nodes own canonical keyframe sequences
//! and form a tree; one `run` call per tick advances a root and its running
//! descendants, pushing interpolated property writes through a host sink and
//! deferring callbacks/events into an effect queue the driver drains after
//! the tick. Authoring configs arrive as lenient JSON and are normalized on
//! insert.

pub mod advance;
pub mod config;
pub mod ease;
pub mod effects;
pub mod error;
pub mod ids;
pub mod keyframe;
pub mod node;
pub mod normalize;
pub mod target;
pub mod time;
pub mod tree;
pub mod value;

// Re-exports for consumers (drivers/hosts)
pub use config::Config;
pub use ease::{linear, power_two_in, power_two_out, EaseFn, Interpolator};
pub use effects::{CallbackSpec, Effect, EffectAction, EffectQueue};
pub use error::{Result, TimelineError};
pub use ids::NodeId;
pub use keyframe::{Cursor, EventSpec, Keyframe};
pub use node::{PlaybackState, TimelineNode};
pub use normalize::{node_spec_from_json, node_spec_from_value, AnimateSpec, ChildSpec, NodeSpec};
pub use target::{NullSink, PropertyWrite, TargetHandle, TargetSink};
pub use time::{segment_fraction, TickStep, FALLBACK_STEP_MS, MAX_STEP_MS};
pub use tree::Timeline;
pub use value::KeyValue;
