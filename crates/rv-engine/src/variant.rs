//! Variant state machine: per-node interaction state.
//!
//! Every dynamic node is either in **base** state (no entry) or showing a
//! **variant** (an entry naming the target node whose style and children
//! stand in for the dynamic node's own). Discrete events move nodes between
//! the two:
//!
//! - `click` / `load` follow the first matching connection. While a variant
//!   is showing, the variant's own connections are consulted instead of the
//!   base node's, so `A → B → A` toggles.
//! - `hover` enters a variant and marks the node as hovered either way.
//! - `mouseLeave` follows its own connection if there is one, otherwise it
//!   undoes the hover.
//!
//! Entries are tagged with the breakpoint they were set under. Crossing into
//! another breakpoint drops every entry set under a different one; resizing
//! within a breakpoint never does.
//!
//! The machine never holds on to a `NodeGraph`: every operation borrows the
//! current snapshot, so the editor can swap snapshots freely.

use rv_core::{
    Connection, EventType, Node, NodeGraph, NodeId, StyleMap, active_breakpoint, resolve_style,
};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

// ─── Records & outcomes ──────────────────────────────────────────────────

/// The variant a dynamic node is currently showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    /// The dynamic node whose identity and position are kept.
    pub display_node_id: NodeId,
    /// The node whose appearance is shown.
    pub target_id: NodeId,
    /// Target style resolved at the width the record was written.
    pub resolved_style: StyleMap,
    /// Children of the variant are stored under this id, not under
    /// `display_node_id`.
    pub resolved_children_root_id: NodeId,
}

/// What a call to [`VariantStateMachine::transition`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// No connection applied (or the node was already in base state).
    Unchanged,
    /// `node` now shows `target`.
    Entered { node: NodeId, target: NodeId },
    /// `node` returned to base state.
    Reverted { node: NodeId },
}

impl TransitionOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, TransitionOutcome::Unchanged)
    }
}

// ─── State machine ───────────────────────────────────────────────────────

/// Interaction state for one open document.
///
/// Callers serialize access: each method reads and writes the same maps
/// without isolation, and a resize must be applied before any event that
/// should observe it.
#[derive(Debug, Clone, Default)]
pub struct VariantStateMachine {
    active: HashMap<NodeId, VariantRecord>,
    current_breakpoint: Option<NodeId>,
    current_width: f32,
    /// Breakpoint in effect when each entry was written.
    last_breakpoint_at_set: HashMap<NodeId, Option<NodeId>>,
    /// Nodes hovered since their last `mouseLeave`.
    was_hovered: HashSet<NodeId>,
}

impl VariantStateMachine {
    /// Start with every node in base state at `width`.
    pub fn new(graph: &NodeGraph, width: f32) -> Self {
        Self {
            current_breakpoint: active_breakpoint(width, graph.breakpoints()).map(|bp| bp.id),
            current_width: width,
            ..Default::default()
        }
    }

    pub fn current_breakpoint(&self) -> Option<NodeId> {
        self.current_breakpoint
    }

    pub fn current_width(&self) -> f32 {
        self.current_width
    }

    /// The variant `node_id` is showing, or `None` in base state.
    pub fn active_variant(&self, node_id: NodeId) -> Option<&VariantRecord> {
        self.active.get(&node_id)
    }

    /// Number of nodes currently showing a variant.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether `node_id`'s current hover cycle has not been closed by a
    /// `mouseLeave` yet.
    pub fn was_hovered(&self, node_id: NodeId) -> bool {
        self.was_hovered.contains(&node_id)
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Apply one discrete event raised on `source_id`.
    ///
    /// Unknown sources, unwired events and dangling targets are no-ops.
    pub fn transition(
        &mut self,
        graph: &NodeGraph,
        source_id: NodeId,
        event: EventType,
    ) -> TransitionOutcome {
        let Some(source) = graph.get(source_id) else {
            log::debug!("transition: unknown source {source_id} ({event:?})");
            return TransitionOutcome::Unchanged;
        };
        let actual = self.actual_source(graph, source, event);

        match event {
            EventType::Hover => {
                let outcome = self.apply(graph, actual, event);
                self.was_hovered.insert(actual);
                outcome
            }
            EventType::MouseLeave => self.leave(graph, actual),
            EventType::Click | EventType::Load => self.apply(graph, actual, event),
        }
    }

    /// Fire every `load` connection once, in declaration order.
    /// Returns how many nodes changed state.
    pub fn fire_load_transitions(&mut self, graph: &NodeGraph) -> usize {
        let sources: Vec<NodeId> = graph
            .nodes()
            .filter(|node| graph.has_connection(node.id, EventType::Load, self.current_breakpoint))
            .map(|node| node.id)
            .collect();

        sources
            .into_iter()
            .filter(|id| self.transition(graph, *id, EventType::Load).is_change())
            .count()
    }

    /// Record a viewport resize.
    ///
    /// When the width lands in a different breakpoint, every entry set under
    /// another breakpoint returns to base state. Returns the nodes reset.
    pub fn set_current_width(&mut self, graph: &NodeGraph, width: f32) -> Vec<NodeId> {
        self.current_width = width;
        let next = active_breakpoint(width, graph.breakpoints()).map(|bp| bp.id);
        if next == self.current_breakpoint {
            return Vec::new();
        }
        log::debug!(
            "breakpoint change at {width}px: {:?} -> {:?}",
            self.current_breakpoint,
            next
        );
        self.current_breakpoint = next;
        self.invalidate_stale()
    }

    /// Re-validate state against a fresh snapshot.
    ///
    /// Entries whose dynamic node or target vanished are dropped (all entries
    /// when `keep_variants` is false), the breakpoint is recomputed for the
    /// current width, and surviving records are re-resolved. Returns the
    /// nodes reset.
    pub fn rebase(&mut self, graph: &NodeGraph, keep_variants: bool) -> Vec<NodeId> {
        let mut dropped: Vec<NodeId> = self
            .active
            .values()
            .filter(|record| {
                !keep_variants
                    || !graph.contains(record.display_node_id)
                    || !graph.contains(record.target_id)
            })
            .map(|record| record.display_node_id)
            .collect();
        for id in &dropped {
            self.clear(*id);
        }
        self.was_hovered.retain(|id| graph.contains(*id));

        let next = active_breakpoint(self.current_width, graph.breakpoints()).map(|bp| bp.id);
        if next != self.current_breakpoint {
            self.current_breakpoint = next;
            dropped.extend(self.invalidate_stale());
        }

        for record in self.active.values_mut() {
            record.resolved_style = resolve_style(graph, record.target_id, self.current_width);
        }
        sort_ids(&mut dropped);
        dropped
    }

    /// Return every node to base state.
    pub fn clear_all(&mut self) {
        self.active.clear();
        self.last_breakpoint_at_set.clear();
        self.was_hovered.clear();
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// The node whose state an event on `source` actually changes.
    ///
    /// A node with its own wiring for the event handles it. Otherwise a
    /// child trigger, or a descendant that opted into bubbling, hands the
    /// event to its nearest dynamic ancestor.
    fn actual_source(&self, graph: &NodeGraph, source: &Node, event: EventType) -> NodeId {
        if self.has_own_wiring(graph, source.id, event) {
            return source.id;
        }
        if (source.dynamic_parent_id.is_some() || source.allow_event_bubbling)
            && let Some(ancestor) = graph.find_dynamic_ancestor(source.id)
        {
            log::trace!("{event:?} on {} routed to {ancestor}", source.id);
            return ancestor;
        }
        source.id
    }

    /// A leave belongs to whoever handled the hover, so hover wiring counts
    /// as own wiring for `mouseLeave`.
    fn has_own_wiring(&self, graph: &NodeGraph, node: NodeId, event: EventType) -> bool {
        let relevant: &[EventType] = match event {
            EventType::MouseLeave => &[EventType::MouseLeave, EventType::Hover],
            EventType::Click => &[EventType::Click],
            EventType::Hover => &[EventType::Hover],
            EventType::Load => &[EventType::Load],
        };
        relevant.iter().any(|e| {
            graph.has_connection(node, *e, self.current_breakpoint)
                || !self.candidates(graph, node, *e).is_empty()
        })
    }

    /// Connections that may fire for `node`: the showing variant's own when
    /// one is active, the base node's otherwise.
    fn candidates<'g>(
        &self,
        graph: &'g NodeGraph,
        node: NodeId,
        event: EventType,
    ) -> SmallVec<[&'g Connection; 4]> {
        let origin = self
            .active
            .get(&node)
            .map_or(node, |record| record.target_id);
        graph.connections_of(origin, event, self.current_breakpoint)
    }

    fn apply(&mut self, graph: &NodeGraph, actual: NodeId, event: EventType) -> TransitionOutcome {
        let Some(connection) = self.candidates(graph, actual, event).first().copied() else {
            log::trace!("{event:?} on {actual}: no matching connection");
            return TransitionOutcome::Unchanged;
        };
        let Some(literal) = graph.get(connection.target_id) else {
            log::warn!(
                "{event:?} on {actual}: connection targets missing node {}",
                connection.target_id
            );
            return TransitionOutcome::Unchanged;
        };

        let target = self.target_for_viewport(graph, literal);
        if target == actual {
            return self.revert(actual);
        }

        let record = VariantRecord {
            display_node_id: actual,
            target_id: target,
            resolved_style: resolve_style(graph, target, self.current_width),
            resolved_children_root_id: target,
        };
        self.active.insert(actual, record);
        self.last_breakpoint_at_set
            .insert(actual, self.current_breakpoint);
        log::debug!("{event:?} on {actual}: showing {target}");
        TransitionOutcome::Entered {
            node: actual,
            target,
        }
    }

    fn leave(&mut self, graph: &NodeGraph, actual: NodeId) -> TransitionOutcome {
        let outcome = if !self
            .candidates(graph, actual, EventType::MouseLeave)
            .is_empty()
        {
            self.apply(graph, actual, EventType::MouseLeave)
        } else if self.was_hovered.contains(&actual) && self.has_hover_wiring(graph, actual) {
            self.revert(actual)
        } else {
            TransitionOutcome::Unchanged
        };
        self.was_hovered.remove(&actual);
        outcome
    }

    fn has_hover_wiring(&self, graph: &NodeGraph, node: NodeId) -> bool {
        graph.has_connection(node, EventType::Hover, self.current_breakpoint)
            || !self.candidates(graph, node, EventType::Hover).is_empty()
    }

    /// Prefer the copy of `literal` that belongs to the current breakpoint.
    fn target_for_viewport(&self, graph: &NodeGraph, literal: &Node) -> NodeId {
        match (literal.shared_id, self.current_breakpoint) {
            (Some(shared), Some(breakpoint)) => graph
                .find_by_shared_id(shared, breakpoint)
                .map_or(literal.id, |node| node.id),
            _ => literal.id,
        }
    }

    fn revert(&mut self, node: NodeId) -> TransitionOutcome {
        if self.clear(node) {
            log::debug!("{node}: back to base");
            TransitionOutcome::Reverted { node }
        } else {
            TransitionOutcome::Unchanged
        }
    }

    fn clear(&mut self, node: NodeId) -> bool {
        self.last_breakpoint_at_set.remove(&node);
        self.active.remove(&node).is_some()
    }

    /// Drop entries set under a breakpoint other than the current one.
    fn invalidate_stale(&mut self) -> Vec<NodeId> {
        let current = self.current_breakpoint;
        let mut stale: Vec<NodeId> = self
            .active
            .keys()
            .filter(|id| self.last_breakpoint_at_set.get(*id).copied().flatten() != current)
            .copied()
            .collect();
        sort_ids(&mut stale);
        for id in &stale {
            self.clear(*id);
            self.was_hovered.remove(id);
        }
        if !stale.is_empty() {
            log::debug!("breakpoint change reset {} variant(s)", stale.len());
        }
        stale
    }
}

fn sort_ids(ids: &mut [NodeId]) {
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
}

// ─── Tests ───────────────────────────────────────────────────────────────
