#![allow(dead_code)]
//! Per-node keyframe advancement: walk the cursor forward over the canonical
//! sequence, fire each passed frame's sideband once, follow `goTo` jumps,
//! wrap looping sequences, and emit interpolated writes. Tree traversal and
//! the lifecycle epilogue live in [`crate::tree`].

use crate::ease::Interpolator;
use crate::effects::{Effect, EffectAction, EffectQueue};
use crate::node::TimelineNode;
use crate::target::{PropertyWrite, TargetSink};
use crate::time;
use crate::value::KeyValue;

/// Upper bound on `goTo` jumps followed in a single tick. Chained jumps are
/// authoring errors; past this the walk stops for the tick.
const MAX_GOTO_JUMPS_PER_TICK: usize = 32;

impl TimelineNode {
    /// Advance this node's own animation by `step_ms`.
    ///
    /// Nodes with fewer than two keyframes or no target have nothing to
    /// animate: they finish instantly and flag themselves ready to loop,
    /// which is what keeps pure group and ticker nodes cycling.
    pub(crate) fn advance_animation(
        &mut self,
        step_ms: f64,
        eases: &Interpolator,
        effects: &mut EffectQueue,
        sink: &mut dyn TargetSink,
    ) {
        if !self.is_animatable() {
            self.ready_to_loop = true;
            self.running = false;
            return;
        }

        let still_running = self.walk_key_frames(step_ms, eases, effects, sink);
        if !still_running {
            self.running = false;
            self.ready_to_loop = true;
        }
    }

    /// One tick of the keyframe walk. Returns false once a non-looping
    /// sequence has reached its last frame.
    fn walk_key_frames(
        &mut self,
        step_ms: f64,
        eases: &Interpolator,
        effects: &mut EffectQueue,
        sink: &mut dyn TargetSink,
    ) -> bool {
        self.cursor.elapsed_ms += step_ms;
        let last = self.key_frames.len() - 1;
        let mut running = true;

        // Frame 0 never gets passed, so its sideband fires here.
        self.fire_frame_effects(self.cursor.index, effects, sink);

        if self.cursor.index < last
            && self.key_frames[self.cursor.index + 1].time <= self.cursor.elapsed_ms
        {
            self.progress_key_frame(None, effects, sink);
            if self.cursor.index == last {
                running = false;
            }
        }

        let cur = self.cursor.index;
        let next = (cur + 1).min(last);
        self.write_values(eases, sink, cur, next);

        running
    }

    /// Move the cursor until it sits on the latest frame whose time has been
    /// reached, firing sideband on every frame landed on. Handles `goTo`
    /// jumps and the looping wrap.
    fn progress_key_frame(
        &mut self,
        to_index: Option<usize>,
        effects: &mut EffectQueue,
        sink: &mut dyn TargetSink,
    ) {
        let last = self.key_frames.len() - 1;
        let mut jumps = 0usize;
        let mut next_index = to_index;

        loop {
            self.cursor.index = match next_index.take() {
                Some(index) => index,
                None => self.cursor.index + 1,
            };
            self.fire_frame_effects(self.cursor.index, effects, sink);

            if let Some(go_to) = self.key_frames[self.cursor.index].go_to {
                if go_to > last {
                    log::warn!(
                        "Ignoring goTo {} outside 0..={} on '{}'",
                        go_to,
                        last,
                        self.name
                    );
                } else {
                    log::warn!("goTo on '{}' is not fully hardened; use with care", self.name);
                    self.cursor.elapsed_ms = self.key_frames[go_to].time;
                    self.cursor.index = go_to;
                    jumps += 1;
                    if jumps > MAX_GOTO_JUMPS_PER_TICK {
                        log::warn!(
                            "Stopping after {} goTo jumps in one tick on '{}'",
                            MAX_GOTO_JUMPS_PER_TICK,
                            self.name
                        );
                        break;
                    }
                }
            }

            if self.cursor.index != last {
                if self.key_frames[self.cursor.index + 1].time <= self.cursor.elapsed_ms {
                    continue;
                }
                break;
            } else if self.looping {
                let span = self.key_frames[last].time;
                if span <= 0.0 {
                    // A wrap that cannot consume time would spin forever.
                    log::warn!(
                        "Cannot wrap '{}': its last keyframe is at {} ms; dropping the loop flag",
                        self.name,
                        span
                    );
                    self.looping = false;
                    break;
                }
                self.cursor.elapsed_ms -= span;
                next_index = Some(0);
            } else {
                break;
            }
        }
    }

    /// Fire the frame's callback and event sideband, at most once per pass.
    /// Markers survive a looping node's internal wrap; only a restore (or
    /// the parent's loop restore) arms them again.
    fn fire_frame_effects(
        &mut self,
        index: usize,
        effects: &mut EffectQueue,
        sink: &mut dyn TargetSink,
    ) {
        let id = self.id;
        let frame = &mut self.key_frames[index];

        if let Some(callback) = &frame.callback {
            if !frame.callback_fired {
                let effect = Effect {
                    node: id,
                    action: callback.action.clone(),
                    step_ms: None,
                };
                if callback.fire_immediately {
                    sink.dispatch(effect);
                } else {
                    effects.push(effect);
                }
                frame.callback_fired = true;
            }
        }

        if let Some(event) = &frame.fire_event {
            if !frame.event_fired {
                effects.push(Effect {
                    node: id,
                    action: EffectAction::EmitEvent {
                        event: event.event.clone(),
                        scope: event.scope.clone(),
                        args: event.args.clone(),
                    },
                    step_ms: None,
                });
                frame.event_fired = true;
            }
        }
    }

    /// Interpolate between the current and next frame and push the writes.
    /// The easing curve comes from the frame being left.
    fn write_values(&self, eases: &Interpolator, sink: &mut dyn TargetSink, cur: usize, next: usize) {
        let target = match &self.target {
            Some(target) => target,
            None => return,
        };
        let from = &self.key_frames[cur];
        let to = &self.key_frames[next];
        let t = time::segment_fraction(self.cursor.elapsed_ms, from.time, to.time);
        let ease = from.ease.as_deref();

        match &from.value {
            KeyValue::Fields(components) => {
                for (key, from_component) in components {
                    // A key missing on the far frame holds its value.
                    let to_component = to.value.field(key).unwrap_or(*from_component);
                    let value = eases.value(*from_component, to_component, t, ease, Some(key));
                    sink.apply(PropertyWrite {
                        target: target.clone(),
                        prop: self.prop.clone(),
                        key: Some(key.clone()),
                        value,
                    });
                }
            }
            KeyValue::Scalar(from_scalar) => {
                let to_scalar = to.value.as_scalar().unwrap_or(*from_scalar);
                let value = eases.value(*from_scalar, to_scalar, t, ease, None);
                sink.apply(PropertyWrite {
                    target: target.clone(),
                    prop: self.prop.clone(),
                    key: None,
                    value,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::keyframe::Keyframe;
    use crate::normalize::{self, NodeSpec};
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<PropertyWrite>,
        dispatched: Vec<Effect>,
    }

    impl TargetSink for Recorder {
        fn apply(&mut self, write: PropertyWrite) {
            self.writes.push(write);
        }
        fn dispatch(&mut self, effect: Effect) {
            self.dispatched.push(effect);
        }
    }

    fn scalar_node(times: &[(f64, f64)], looping: bool) -> TimelineNode {
        let spec = NodeSpec {
            prop: Some("x".into()),
            looping,
            running: true,
            ..NodeSpec::default()
        };
        let frames = times
            .iter()
            .map(|(time, value)| Keyframe::new(*time, *value))
            .collect();
        let mut node =
            TimelineNode::from_spec(crate::ids::NodeId(0), &spec, Some("wheel".into()), frames);
        node.running = true;
        node
    }

    fn tick(node: &mut TimelineNode, step: f64, sink: &mut Recorder) -> Vec<Effect> {
        let eases = Interpolator::new();
        let mut effects = EffectQueue::from_config(&Config::default());
        node.advance_animation(step, &eases, &mut effects, sink);
        effects.drain()
    }

    #[test]
    fn inert_node_finishes_instantly() {
        let spec = normalize::node_spec_from_value(json!({ "target": "wheel" })).unwrap();
        let mut node = TimelineNode::from_spec(crate::ids::NodeId(0), &spec, Some("wheel".into()), Vec::new());
        node.running = true;
        let mut sink = Recorder::default();
        tick(&mut node, 16.0, &mut sink);
        assert!(!node.running);
        assert!(node.ready_to_loop);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn linear_walk_interpolates_between_frames() {
        let mut node = scalar_node(&[(0.0, 0.0), (1000.0, 100.0)], false);
        let mut sink = Recorder::default();
        tick(&mut node, 250.0, &mut sink);
        assert!(node.running);
        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.writes[0].value, 25.0);
        assert_eq!(sink.writes[0].prop.as_deref(), Some("x"));
    }

    #[test]
    fn non_looping_walk_clamps_on_last_frame() {
        let mut node = scalar_node(&[(0.0, 0.0), (100.0, 10.0)], false);
        let mut sink = Recorder::default();
        tick(&mut node, 250.0, &mut sink);
        assert!(!node.running);
        assert!(node.ready_to_loop);
        // current == next == last writes the final value exactly
        assert_eq!(sink.writes.last().map(|w| w.value), Some(10.0));
    }

    #[test]
    fn big_step_cascades_over_intermediate_frames() {
        let mut node = scalar_node(&[(0.0, 0.0), (100.0, 1.0), (200.0, 2.0), (1000.0, 10.0)], false);
        let mut sink = Recorder::default();
        tick(&mut node, 600.0, &mut sink);
        assert!(node.running);
        assert_eq!(node.cursor.index, 2);
        // halfway between 200 and 1000
        assert_eq!(sink.writes[0].value, 6.0);
    }

    #[test]
    fn looping_walk_wraps_and_keeps_running() {
        let mut node = scalar_node(&[(0.0, 0.0), (1000.0, 100.0)], true);
        let mut sink = Recorder::default();
        tick(&mut node, 1100.0, &mut sink);
        assert!(node.running);
        assert_eq!(node.cursor.index, 0);
        assert_eq!(node.cursor.elapsed_ms, 100.0);
        assert_eq!(sink.writes[0].value, 10.0);
    }

    #[test]
    fn zero_span_loop_drops_the_flag_and_finishes() {
        let mut node = scalar_node(&[(0.0, 0.0), (0.0, 1.0)], true);
        let mut sink = Recorder::default();
        tick(&mut node, 16.0, &mut sink);
        assert!(!node.looping);
        assert!(!node.running);
        assert!(node.ready_to_loop);
        assert_eq!(sink.writes.last().map(|w| w.value), Some(1.0));
    }

    #[test]
    fn zero_duration_segments_fire_and_hold() {
        let mut node = scalar_node(
            &[(0.0, 0.0), (250.0, 25.0), (250.0, 50.0), (250.0, 75.0), (250.0, 100.0)],
            false,
        );
        let mut sink = Recorder::default();
        tick(&mut node, 250.0, &mut sink);
        assert!(!node.running);
        assert_eq!(node.cursor.index, 4);
        assert_eq!(sink.writes.last().map(|w| w.value), Some(100.0));
    }

    #[test]
    fn frame_zero_callback_fires_once() {
        let mut node = scalar_node(&[(0.0, 0.0), (1000.0, 100.0)], false);
        node.key_frames[0].callback = Some(crate::effects::CallbackSpec::invoke("armed"));
        let mut sink = Recorder::default();

        let effects = tick(&mut node, 100.0, &mut sink);
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0].action,
            EffectAction::Invoke { func, .. } if func == "armed"
        ));

        let effects = tick(&mut node, 100.0, &mut sink);
        assert!(effects.is_empty());
    }

    #[test]
    fn immediate_callbacks_bypass_the_queue() {
        let mut node = scalar_node(&[(0.0, 0.0), (1000.0, 100.0)], false);
        node.key_frames[0].callback =
            Some(crate::effects::CallbackSpec::invoke("now").immediately());
        let mut sink = Recorder::default();

        let effects = tick(&mut node, 100.0, &mut sink);
        assert!(effects.is_empty());
        assert_eq!(sink.dispatched.len(), 1);
    }

    #[test]
    fn go_to_jumps_rewind_the_clock() {
        let mut node = scalar_node(&[(0.0, 0.0), (500.0, 50.0), (1000.0, 100.0)], false);
        node.key_frames[1].go_to = Some(0);
        let mut sink = Recorder::default();

        tick(&mut node, 600.0, &mut sink);
        assert_eq!(node.cursor.index, 0);
        assert_eq!(node.cursor.elapsed_ms, 0.0);
        assert!(node.running);
    }

    #[test]
    fn out_of_range_go_to_is_ignored() {
        let mut node = scalar_node(&[(0.0, 0.0), (500.0, 50.0), (1000.0, 100.0)], false);
        node.key_frames[1].go_to = Some(9);
        let mut sink = Recorder::default();

        tick(&mut node, 600.0, &mut sink);
        assert_eq!(node.cursor.index, 1);
        assert!(node.running);
    }

    #[test]
    fn field_values_write_each_component() {
        let spec = NodeSpec {
            prop: Some("scale".into()),
            running: true,
            ..NodeSpec::default()
        };
        let frames = vec![
            Keyframe::new(0.0, KeyValue::from_pairs([("x", 0.0), ("y", 2.0)])),
            Keyframe::new(100.0, KeyValue::from_pairs([("x", 1.0), ("y", 4.0)])),
        ];
        let mut node =
            TimelineNode::from_spec(crate::ids::NodeId(0), &spec, Some("wheel".into()), frames);
        node.running = true;
        let mut sink = Recorder::default();

        tick(&mut node, 50.0, &mut sink);
        assert_eq!(sink.writes.len(), 2);
        let x = sink.writes.iter().find(|w| w.key.as_deref() == Some("x"));
        let y = sink.writes.iter().find(|w| w.key.as_deref() == Some("y"));
        assert_eq!(x.map(|w| w.value), Some(0.5));
        assert_eq!(y.map(|w| w.value), Some(3.0));
    }
}
