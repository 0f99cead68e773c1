//! Resolution facade: one engine per open document.
//!
//! The engine pairs the current `NodeGraph` snapshot with the variant state
//! machine and answers the only question renderers and serializers ask:
//! *what does this node look like at this width, right now?*
//!
//! - **Renderer**: calls [`Engine::resolve`] starting from each viewport
//!   root and walks `children_ids` recursively. A node showing a variant
//!   keeps its own id but reports the variant's kind, style and children.
//! - **Serializer**: calls [`Engine::resolve_all_breakpoints`] once per
//!   logical element to get one merged style map per breakpoint.
//! - **Input layer**: forwards click/hover/mouseLeave through
//!   [`Engine::transition`] and viewport resizes through
//!   [`Engine::set_current_width`], resize first when both are pending.

use crate::config::EngineConfig;
use crate::variant::{TransitionOutcome, VariantRecord, VariantStateMachine};
use rv_core::{
    Breakpoint, EventType, GraphError, NodeGraph, NodeId, NodeType, StyleMap, parse_graph,
    resolve_per_breakpoint, resolve_style,
};
use serde::Serialize;
use std::collections::HashSet;

/// A node as the renderer should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveNode {
    /// The id that was resolved (a dynamic node keeps its own id).
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub style: StyleMap,
    pub children_ids: Vec<NodeId>,
    /// The variant being shown in place of the node, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<NodeId>,
}

/// The engine holds the authoritative snapshot and the interaction state
/// derived from it.
pub struct Engine {
    graph: NodeGraph,
    variants: VariantStateMachine,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine over `graph`. Load connections fire immediately when
    /// the config asks for it.
    pub fn new(graph: NodeGraph, config: EngineConfig) -> Self {
        let mut variants = VariantStateMachine::new(&graph, config.initial_width);
        if config.fire_load_connections {
            let fired = variants.fire_load_transitions(&graph);
            log::debug!("engine start: {fired} load transition(s)");
        }
        Self {
            graph,
            variants,
            config,
        }
    }

    /// Create an engine from editor JSON.
    pub fn from_json(text: &str, config: EngineConfig) -> Result<Self, GraphError> {
        Ok(Self::new(parse_graph(text)?, config))
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn variants(&self) -> &VariantStateMachine {
        &self.variants
    }

    pub fn current_width(&self) -> f32 {
        self.variants.current_width()
    }

    /// The breakpoint in effect at the current width.
    pub fn current_breakpoint(&self) -> Option<&Breakpoint> {
        self.variants
            .current_breakpoint()
            .and_then(|id| self.graph.breakpoint(id))
    }

    pub fn active_variant(&self, node_id: NodeId) -> Option<&VariantRecord> {
        self.variants.active_variant(node_id)
    }

    // ─── Inputs ──────────────────────────────────────────────────────────

    /// Forward one interaction event.
    pub fn transition(&mut self, source_id: NodeId, event: EventType) -> TransitionOutcome {
        self.variants.transition(&self.graph, source_id, event)
    }

    /// Apply a viewport resize. Returns the nodes reset by a breakpoint crossing.
    pub fn set_current_width(&mut self, width: f32) -> Vec<NodeId> {
        self.variants.set_current_width(&self.graph, width)
    }

    /// Swap in a fresh snapshot from the editor. Returns the nodes reset.
    pub fn replace_graph(&mut self, graph: NodeGraph) -> Vec<NodeId> {
        self.graph = graph;
        self.variants
            .rebase(&self.graph, self.config.keep_variants_on_refresh)
    }

    /// Return every node to base state, then re-fire load connections.
    pub fn reset(&mut self) {
        self.variants.clear_all();
        if self.config.fire_load_connections {
            self.variants.fire_load_transitions(&self.graph);
        }
    }

    // ─── Outputs ─────────────────────────────────────────────────────────

    /// Merged style of a logical element at `width`, ignoring interaction state.
    pub fn resolve_style(&self, logical_id: NodeId, width: f32) -> StyleMap {
        resolve_style(&self.graph, logical_id, width)
    }

    /// One merged style map per breakpoint, largest first.
    pub fn resolve_all_breakpoints(&self, logical_id: NodeId) -> Vec<(Breakpoint, StyleMap)> {
        resolve_per_breakpoint(&self.graph, logical_id)
    }

    /// Resolve one node at `width`, with its active variant applied.
    /// Returns `None` for unknown ids.
    pub fn resolve(&self, node_id: NodeId, width: f32) -> Option<EffectiveNode> {
        let node = self.graph.get(node_id)?;

        let Some(record) = self.variants.active_variant(node_id) else {
            return Some(EffectiveNode {
                id: node_id,
                kind: node.kind,
                style: resolve_style(&self.graph, node_id, width),
                children_ids: self.graph.children_of(node_id),
                variant_id: None,
            });
        };

        let kind = self
            .graph
            .get(record.target_id)
            .map_or(node.kind, |target| target.kind);
        let style = if self.same_breakpoint(width) {
            record.resolved_style.clone()
        } else {
            resolve_style(&self.graph, record.target_id, width)
        };
        Some(EffectiveNode {
            id: node_id,
            kind,
            style,
            children_ids: self.graph.children_of(record.resolved_children_root_id),
            variant_id: Some(record.target_id),
        })
    }

    /// Resolve `root` and everything below it, depth-first, parents first.
    ///
    /// A variant whose subtree leads back to a node already visited is not
    /// expanded twice.
    pub fn resolve_tree(&self, root: NodeId, width: f32) -> Vec<EffectiveNode> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(resolved) = self.resolve(id, width) else {
                continue;
            };
            stack.extend(resolved.children_ids.iter().rev().copied());
            out.push(resolved);
        }
        out
    }

    fn same_breakpoint(&self, width: f32) -> bool {
        rv_core::active_breakpoint(width, self.graph.breakpoints()).map(|bp| bp.id)
            == self.variants.current_breakpoint()
    }
}
