#![allow(dead_code)]
//! The timeline tree: arena ownership of nodes, spec insertion, tree
//! mutation, the lifecycle state machine and the per-tick run traversal.
//!
//! Lifecycle recursion is implemented as free functions over the node slice
//! so a traversal can borrow the easing registry and effect queue alongside
//! the nodes.

use crate::config::Config;
use crate::ease::Interpolator;
use crate::effects::{CallbackSpec, Effect, EffectQueue};
use crate::error::{Result, TimelineError};
use crate::ids::{IdAllocator, NodeId};
use crate::node::{PlaybackState, TimelineNode};
use crate::normalize::{self, AnimateSpec, ChildSpec, NodeSpec};
use crate::target::TargetSink;
use crate::time::TickStep;

/// Tree of timeline nodes plus the systems a tick needs: the easing
/// registry and the deferred-effect queue.
///
/// Drivers hold one `Timeline`, insert specs, then once per frame call
/// [`Timeline::run`] for each root they consider running and drain the
/// effects afterwards.
#[derive(Debug)]
pub struct Timeline {
    cfg: Config,
    ids: IdAllocator,
    nodes: Vec<TimelineNode>,
    eases: Interpolator,
    effects: EffectQueue,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(cfg: Config) -> Self {
        Self {
            ids: IdAllocator::default(),
            nodes: Vec::with_capacity(cfg.node_capacity),
            eases: Interpolator::new(),
            effects: EffectQueue::from_config(&cfg),
            cfg,
        }
    }

    /// The easing registry, for hosts registering custom curves.
    pub fn interpolator_mut(&mut self) -> &mut Interpolator {
        &mut self.eases
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.eases
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ---- insertion -------------------------------------------------------

    /// Insert a spec (and its inline children) as a new subtree and return
    /// the handle of its root. A spec-level `parent` attaches the subtree
    /// under an existing node instead of leaving it a root.
    pub fn insert(&mut self, spec: NodeSpec) -> NodeId {
        let inherited = spec
            .parent
            .and_then(|parent| self.node(parent))
            .and_then(|parent| parent.target.clone());
        let id = self.insert_with_target(&spec, inherited);
        if let Some(parent) = spec.parent {
            if let Err(err) = self.set_parent(id, parent) {
                log::warn!("Could not attach {:?} under {:?}: {}", id, parent, err);
            }
        }
        id
    }

    /// [`Timeline::insert`] from raw JSON, shedding malformed pieces with a
    /// warning (see [`normalize::node_spec_from_value`]).
    pub fn insert_value(&mut self, value: serde_json::Value) -> Result<NodeId> {
        let spec = normalize::node_spec_from_value(value)?;
        Ok(self.insert(spec))
    }

    /// [`Timeline::insert`] from a JSON string.
    pub fn insert_json(&mut self, json: &str) -> Result<NodeId> {
        let spec = normalize::node_spec_from_json(json)?;
        Ok(self.insert(spec))
    }

    fn insert_with_target(&mut self, spec: &NodeSpec, inherited: Option<String>) -> NodeId {
        let target = spec.target.clone().or(inherited);
        let frames = match &spec.animate {
            Some(animate) => normalize::normalize_animate(animate, spec.prop.as_deref()),
            None => Vec::new(),
        };
        let id = self.ids.alloc_node();
        let node = TimelineNode::from_spec(id, spec, target.clone(), frames);
        if node.key_frames.len() >= 2 && node.target.is_none() {
            log::warn!(
                "'{}' has keyframes but no target to write to; it will stay inert",
                node.name
            );
        }
        log::debug!(
            "Inserted '{}' ({:?}, {} keyframes, {} inline children)",
            node.name,
            id,
            node.key_frames.len(),
            spec.children.len()
        );
        self.nodes.push(node);

        for child in &spec.children {
            match child {
                ChildSpec::Existing(child_id) => {
                    if let Err(err) = self.set_parent(*child_id, id) {
                        log::warn!("Could not adopt {:?} under {:?}: {}", child_id, id, err);
                    }
                }
                ChildSpec::Spec(child_spec) => {
                    let child_id = self.insert_with_target(child_spec, target.clone());
                    if let Err(err) = self.set_parent(child_id, id) {
                        log::warn!("Could not attach {:?} under {:?}: {}", child_id, id, err);
                    }
                }
            }
        }
        id
    }

    /// Replace the node's animation with a freshly normalized sequence and
    /// restore it (a node still flagged running re-plays from the start).
    /// `play_now` additionally starts playback.
    pub fn animate(&mut self, id: NodeId, animate: &AnimateSpec, play_now: bool) -> Result<()> {
        let prop = self.get(id)?.prop.clone();
        let frames = normalize::normalize_animate(animate, prop.as_deref());
        self.get_mut(id)?.key_frames = frames;
        self.restore(id, None)?;
        if play_now {
            self.play(id, None)?;
        }
        Ok(())
    }

    // ---- tree mutation ---------------------------------------------------

    /// Re-home `child` under `parent`, detaching it from any previous
    /// parent first. The child inherits the parent's target if it has none.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        self.index_of(child)?;
        self.index_of(parent)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TimelineError::ParentCycle { child, parent });
        }
        self.detach(child)?;

        let parent_target = self.get(parent)?.target.clone();
        {
            let node = self.get_mut(child)?;
            node.parent = Some(parent);
            if node.target.is_none() {
                node.target = parent_target;
            }
        }
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.set_parent(child, parent)
    }

    pub fn add_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for child in children {
            self.set_parent(*child, parent)?;
        }
        Ok(())
    }

    /// Unlink `child` from its parent, leaving it a root.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let parent = self.get(child)?.parent;
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.node_mut(parent_id) {
                parent_node.children.retain(|c| *c != child);
            }
            self.get_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Drop `id` and its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        let mut doomed = vec![id];
        let mut queue = vec![id];
        while let Some(current) = queue.pop() {
            if let Some(node) = self.node(current) {
                for child in node.children() {
                    doomed.push(*child);
                    queue.push(*child);
                }
            }
        }
        self.nodes.retain(|node| !doomed.contains(&node.id));
        Ok(())
    }

    /// Depth-first search from `from` (inclusive) for the first node whose
    /// `by_key` property equals `value`. `by_key` defaults to `"id"` (the
    /// node name); `"target"`, `"prop"` and string-valued `extra` keys also
    /// match.
    pub fn find_child(&self, from: NodeId, value: &str, by_key: Option<&str>) -> Option<NodeId> {
        self.find_in(from, value, by_key.unwrap_or("id"))
    }

    fn find_in(&self, id: NodeId, value: &str, key: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.matches_key(value, key) {
            return Some(id);
        }
        for child in node.children() {
            if let Some(found) = self.find_in(*child, value, key) {
                return Some(found);
            }
        }
        None
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.node(current).and_then(|n| n.parent()) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    // ---- lifecycle -------------------------------------------------------

    /// Start (or resume) `id` and the selected children: `None` plays all
    /// children, `Some(&[])` only the node itself. Narrowing applies to the
    /// first level only. On a fresh node (`local_time == 0`) the `onStart`
    /// hook is appended to the effect queue. Ancestors are marked running so
    /// the next tick reaches the node.
    pub fn play(&mut self, id: NodeId, selection: Option<&[NodeId]>) -> Result<()> {
        self.index_of(id)?;
        let Timeline { nodes, effects, .. } = self;
        play_inner(nodes, effects, id, selection, true);
        Ok(())
    }

    /// Halt advancement without touching clocks or cursors. Resumable via
    /// [`Timeline::play`].
    pub fn pause(&mut self, id: NodeId, selection: Option<&[NodeId]>) -> Result<()> {
        self.index_of(id)?;
        pause_inner(&mut self.nodes, id, selection);
        Ok(())
    }

    /// Halt and rewind: stops the selection recursively, then restores the
    /// subtree to its pre-play state.
    pub fn stop(&mut self, id: NodeId, selection: Option<&[NodeId]>) -> Result<()> {
        self.index_of(id)?;
        let Timeline { nodes, effects, .. } = self;
        stop_inner(nodes, effects, id, selection, true);
        Ok(())
    }

    /// Rewind clocks, cursors and per-frame fired markers. A node still
    /// flagged running re-enters play from the start.
    pub fn restore(&mut self, id: NodeId, selection: Option<&[NodeId]>) -> Result<()> {
        self.index_of(id)?;
        let Timeline { nodes, effects, .. } = self;
        restore_inner(nodes, effects, id, selection, true);
        Ok(())
    }

    // ---- per-tick run ----------------------------------------------------

    /// Advance the subtree rooted at `id` by one tick.
    ///
    /// Drivers call this once per frame for every root they consider
    /// running; the call itself does not re-check the flag. Property writes
    /// and immediate-fire effects go to `sink` during traversal; deferred
    /// effects accumulate and are handed out by [`Timeline::drain_effects`].
    pub fn run(&mut self, id: NodeId, step: TickStep, sink: &mut dyn TargetSink) -> Result<()> {
        self.index_of(id)?;
        let Timeline {
            nodes,
            eases,
            effects,
            ..
        } = self;
        run_inner(nodes, eases, effects, sink, id, step.step_ms);
        Ok(())
    }

    /// Hand out the effects deferred since the last drain. Call once per
    /// tick, after every root has run.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain()
    }

    /// Deferred effects accumulated so far this tick.
    pub fn pending_effects(&self) -> &[Effect] {
        self.effects.as_slice()
    }

    // ---- queries ---------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&TimelineNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TimelineNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> impl Iterator<Item = &TimelineNode> {
        self.nodes.iter().filter(|node| node.is_root())
    }

    pub fn is_running(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, |node| node.running)
    }

    pub fn state(&self, id: NodeId) -> Option<PlaybackState> {
        self.node(id).map(TimelineNode::state)
    }

    fn index_of(&self, id: NodeId) -> Result<usize> {
        self.nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or(TimelineError::NodeNotFound { id })
    }

    fn get(&self, id: NodeId) -> Result<&TimelineNode> {
        self.node(id).ok_or(TimelineError::NodeNotFound { id })
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut TimelineNode> {
        match self.nodes.iter_mut().find(|node| node.id == id) {
            Some(node) => Ok(node),
            None => Err(TimelineError::NodeNotFound { id }),
        }
    }
}

fn position(nodes: &[TimelineNode], id: NodeId) -> Option<usize> {
    nodes.iter().position(|node| node.id == id)
}

/// First-level targets of a lifecycle call: the explicit selection if one
/// was given, otherwise every child. Recursion below the first level always
/// passes `None`.
fn selected(nodes: &[TimelineNode], index: usize, selection: Option<&[NodeId]>) -> Vec<NodeId> {
    match selection {
        Some(list) => list.to_vec(),
        None => nodes[index].children.clone(),
    }
}

/// Route a hook through the sink when it asks for immediate dispatch and a
/// tick is in flight; defer otherwise.
fn fire_hook(
    effects: &mut EffectQueue,
    sink: Option<&mut dyn TargetSink>,
    node: NodeId,
    spec: &CallbackSpec,
    step_ms: Option<f64>,
) {
    let effect = Effect {
        node,
        action: spec.action.clone(),
        step_ms,
    };
    match sink {
        Some(sink) if spec.fire_immediately => sink.dispatch(effect),
        _ => effects.push(effect),
    }
}

fn play_inner(
    nodes: &mut [TimelineNode],
    effects: &mut EffectQueue,
    id: NodeId,
    selection: Option<&[NodeId]>,
    is_root: bool,
) {
    let index = match position(nodes, id) {
        Some(index) => index,
        None => return,
    };
    nodes[index].running = true;

    for child_id in selected(nodes, index, selection) {
        play_inner(nodes, effects, child_id, None, false);
    }

    if nodes[index].local_time == 0.0 {
        if let Some(start) = nodes[index].on_start.clone() {
            fire_hook(effects, None, id, &start, None);
        }
    }

    if is_root {
        // Wake the ancestor chain so the tick reaches this node; their own
        // clocks resume where they were.
        let mut current = nodes[index].parent;
        while let Some(parent_id) = current {
            match position(nodes, parent_id) {
                Some(parent_index) => {
                    nodes[parent_index].running = true;
                    current = nodes[parent_index].parent;
                }
                None => break,
            }
        }
    }
}

fn pause_inner(nodes: &mut [TimelineNode], id: NodeId, selection: Option<&[NodeId]>) {
    let index = match position(nodes, id) {
        Some(index) => index,
        None => return,
    };
    nodes[index].running = false;
    for child_id in selected(nodes, index, selection) {
        pause_inner(nodes, child_id, None);
    }
}

fn stop_inner(
    nodes: &mut [TimelineNode],
    effects: &mut EffectQueue,
    id: NodeId,
    selection: Option<&[NodeId]>,
    is_root: bool,
) {
    let index = match position(nodes, id) {
        Some(index) => index,
        None => return,
    };
    nodes[index].running = false;
    for child_id in selected(nodes, index, selection) {
        stop_inner(nodes, effects, child_id, None, false);
    }
    if is_root {
        restore_inner(nodes, effects, id, selection, true);
    }
}

fn restore_inner(
    nodes: &mut [TimelineNode],
    effects: &mut EffectQueue,
    id: NodeId,
    selection: Option<&[NodeId]>,
    is_root: bool,
) {
    let index = match position(nodes, id) {
        Some(index) => index,
        None => return,
    };
    {
        let node = &mut nodes[index];
        node.local_time = 0.0;
        node.ready_to_loop = false;
        node.restore_animation();
    }
    for child_id in selected(nodes, index, selection) {
        restore_inner(nodes, effects, child_id, None, false);
    }
    // A restored-while-running root starts over right away.
    if is_root && nodes[index].running {
        play_inner(nodes, effects, id, selection, true);
    }
}

/// The loop-wrap restore: rewinds the animation cursor but not `local_time`,
/// revives finished children, and leaves looping descendants alone — they
/// manage their own wrap cadence.
fn restore_on_loop_inner(nodes: &mut [TimelineNode], id: NodeId, is_root: bool) {
    let index = match position(nodes, id) {
        Some(index) => index,
        None => return,
    };
    if !is_root && nodes[index].looping {
        return;
    }
    {
        let node = &mut nodes[index];
        node.running = true;
        node.ready_to_loop = false;
        node.restore_animation();
    }
    let children = nodes[index].children.clone();
    for child_id in children {
        restore_on_loop_inner(nodes, child_id, false);
    }
}

fn run_inner(
    nodes: &mut [TimelineNode],
    eases: &Interpolator,
    effects: &mut EffectQueue,
    sink: &mut dyn TargetSink,
    id: NodeId,
    step_ms: f64,
) {
    let index = match position(nodes, id) {
        Some(index) => index,
        None => return,
    };

    // Clock bookkeeping: one-shot start offset on a fresh clock, then the
    // node's own speed. Children receive this effective step and scale it
    // again by their own speed.
    let (effective_step, gate_open, child_ids) = {
        let node = &mut nodes[index];
        let mut effective = step_ms;
        if node.local_time == 0.0 {
            effective += node.start_time_offset;
        }
        effective *= node.playback_speed;
        node.local_time += effective;
        (
            effective,
            node.local_time >= node.delay,
            node.children.clone(),
        )
    };

    if gate_open {
        nodes[index].advance_animation(effective_step, eases, effects, sink);

        for child_id in child_ids {
            let child_running = position(nodes, child_id)
                .map_or(false, |child_index| nodes[child_index].running);
            if !child_running {
                continue;
            }
            run_inner(nodes, eases, effects, sink, child_id, effective_step);

            // Reconcile bottom-up: a still-running child keeps the parent
            // alive, and a non-looping one that is not done yet keeps the
            // parent from wrapping.
            if let Some(child_index) = position(nodes, child_id) {
                let child_running = nodes[child_index].running;
                let child_waits =
                    !nodes[child_index].looping && !nodes[child_index].ready_to_loop;
                if child_running {
                    nodes[index].running = true;
                    if child_waits {
                        nodes[index].ready_to_loop = false;
                    }
                }
            }
        }

        if let Some(update) = nodes[index].on_update.clone() {
            fire_hook(effects, Some(&mut *sink), id, &update, Some(effective_step));
        }
    }

    // Wrap or finish. The wrap only fires once this node and every
    // non-looping descendant have completed their pass.
    let (looping, ready, running) = {
        let node = &nodes[index];
        (node.looping, node.ready_to_loop, node.running)
    };
    if looping && ready {
        restore_on_loop_inner(nodes, id, true);
    } else if !running {
        if let Some(end) = nodes[index].on_end.clone() {
            fire_hook(effects, Some(&mut *sink), id, &end, None);
        }
        restore_inner(nodes, effects, id, None, true);
    }
}
