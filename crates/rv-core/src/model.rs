//! Core node-graph data model for responsive page documents.
//!
//! A document is a forest: every breakpoint owns a full, separate subtree
//! rooted at a viewport node. Nodes that represent the same logical element
//! across breakpoints share a `shared_id`. A second, independent edge set
//! (dynamic connections) wires nodes to the variants they swap to on
//! interaction. The parent/child forest is acyclic; the connection graph may
//! contain cycles.
//!
//! `NodeGraph` is a read-only snapshot. The editor that owns the document
//! rebuilds it on every edit; derived indices (viewport membership, shared-ID
//! groups, breakpoints) are computed once at construction.

use crate::error::GraphError;
use crate::id::NodeId;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

// ─── Styles ──────────────────────────────────────────────────────────────

/// Ordered property map: declared order is preserved through merges.
pub type StyleMap = serde_json::Map<String, serde_json::Value>;

// ─── Node kinds & events ─────────────────────────────────────────────────

/// The element kinds a page can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Frame,
    Text,
    Image,
    Video,
    /// Root of one breakpoint's render tree.
    ViewportRoot,
}

/// Discrete interaction events that can fire a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    Click,
    Hover,
    MouseLeave,
    Load,
}

// ─── Connections ─────────────────────────────────────────────────────────

/// A directed, event-typed edge selecting a variant for its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub event_type: EventType,
    /// Restricts the connection to one breakpoint. `None` applies everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_id: Option<NodeId>,
}

impl Connection {
    pub fn new(source_id: NodeId, target_id: NodeId, event_type: EventType) -> Self {
        Self {
            source_id,
            target_id,
            event_type,
            viewport_id: None,
        }
    }

    /// Scope this connection to a single breakpoint.
    #[must_use]
    pub fn in_viewport(mut self, viewport_id: NodeId) -> Self {
        self.viewport_id = Some(viewport_id);
        self
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single design element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub kind: NodeType,

    /// Containing node. `None` for viewport roots.
    #[serde(default)]
    pub parent_id: Option<NodeId>,

    /// Groups the per-breakpoint copies of one logical element.
    #[serde(default)]
    pub shared_id: Option<NodeId>,

    #[serde(default)]
    pub style: StyleMap,

    /// Properties this breakpoint's record owns instead of inheriting them
    /// from the primary breakpoint.
    #[serde(default)]
    pub independent_styles: BTreeMap<String, bool>,

    #[serde(default)]
    pub is_viewport: bool,
    #[serde(default)]
    pub viewport_width: Option<f32>,
    #[serde(default)]
    pub viewport_name: Option<String>,

    /// Interaction root: may hold an active variant.
    #[serde(default)]
    pub is_dynamic: bool,

    /// Marks a child trigger whose events belong to this dynamic ancestor.
    #[serde(default)]
    pub dynamic_parent_id: Option<NodeId>,

    #[serde(default)]
    pub allow_event_bubbling: bool,

    #[serde(default)]
    pub dynamic_connections: SmallVec<[Connection; 2]>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeType) -> Self {
        Self {
            id,
            kind,
            parent_id: None,
            shared_id: None,
            style: StyleMap::new(),
            independent_styles: BTreeMap::new(),
            is_viewport: false,
            viewport_width: None,
            viewport_name: None,
            is_dynamic: false,
            dynamic_parent_id: None,
            allow_event_bubbling: false,
            dynamic_connections: SmallVec::new(),
        }
    }

    /// A breakpoint root of the given width.
    pub fn viewport(id: NodeId, width: f32, name: &str) -> Self {
        let mut node = Self::new(id, NodeType::ViewportRoot);
        node.is_viewport = true;
        node.viewport_width = Some(width);
        node.viewport_name = Some(name.to_string());
        node
    }

    #[must_use]
    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    #[must_use]
    pub fn shared(mut self, shared_id: NodeId) -> Self {
        self.shared_id = Some(shared_id);
        self
    }

    #[must_use]
    pub fn with_style(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.style.insert(key.to_string(), value.into());
        self
    }

    /// Set a property and mark it independent of the primary breakpoint.
    #[must_use]
    pub fn with_independent_style(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.style.insert(key.to_string(), value.into());
        self.independent_styles.insert(key.to_string(), true);
        self
    }

    #[must_use]
    pub fn dynamic(mut self) -> Self {
        self.is_dynamic = true;
        self
    }

    #[must_use]
    pub fn trigger_for(mut self, dynamic_parent: NodeId) -> Self {
        self.dynamic_parent_id = Some(dynamic_parent);
        self
    }

    #[must_use]
    pub fn bubbling(mut self) -> Self {
        self.allow_event_bubbling = true;
        self
    }

    /// Append a connection from this node to `target`.
    #[must_use]
    pub fn on(mut self, event: EventType, target: NodeId) -> Self {
        self.dynamic_connections
            .push(Connection::new(self.id, target, event));
        self
    }

    /// Append an already-built connection.
    #[must_use]
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.dynamic_connections.push(connection);
        self
    }

    /// The breakpoint this node declares, if it is a viewport root.
    pub fn as_breakpoint(&self) -> Option<Breakpoint> {
        if !self.is_viewport {
            return None;
        }
        let width = self.viewport_width?;
        Some(Breakpoint {
            id: self.id,
            width,
            name: self
                .viewport_name
                .clone()
                .unwrap_or_else(|| self.id.as_str().to_string()),
        })
    }
}

// ─── Breakpoints ─────────────────────────────────────────────────────────

/// One tier of the responsive partition. `id` is the viewport root's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: NodeId,
    pub width: f32,
    pub name: String,
}

// ─── Node Graph ──────────────────────────────────────────────────────────

/// An immutable snapshot of the document's nodes.
///
/// Edges in `graph` go from parent → child. Children keep declaration order
/// because node indices are assigned in declaration order.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    graph: StableDiGraph<Node, ()>,

    /// Index from NodeId → NodeIndex for fast lookup.
    id_index: HashMap<NodeId, NodeIndex>,

    /// Node → the viewport root whose subtree contains it (itself for roots).
    viewport_index: HashMap<NodeId, NodeId>,

    /// Shared ID → member nodes, in declaration order.
    shared_index: HashMap<NodeId, SmallVec<[NodeIndex; 4]>>,

    /// Breakpoints sorted descending by width.
    breakpoints: Vec<Breakpoint>,
}

impl NodeGraph {
    /// Build a graph from nodes in declaration order.
    ///
    /// # Errors
    /// - Two nodes share an `id`
    /// - A `parent_id` names no node
    /// - Parent links form a cycle
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, GraphError> {
        let mut graph = StableDiGraph::new();
        let mut id_index = HashMap::new();

        for node in nodes {
            let id = node.id;
            if id_index.contains_key(&id) {
                return Err(GraphError::DuplicateId(id));
            }
            let idx = graph.add_node(node);
            id_index.insert(id, idx);
        }

        let links: Vec<(NodeIndex, NodeId, NodeId)> = graph
            .node_indices()
            .filter_map(|idx| {
                let node: &Node = &graph[idx];
                node.parent_id.map(|parent| (idx, node.id, parent))
            })
            .collect();
        for (idx, id, parent) in links {
            let parent_idx = *id_index
                .get(&parent)
                .ok_or(GraphError::UnknownParent { node: id, parent })?;
            graph.add_edge(parent_idx, idx, ());
        }

        if let Err(cycle) = petgraph::algo::toposort(&graph, None) {
            return Err(GraphError::ParentCycle(graph[cycle.node_id()].id));
        }

        let mut sg = Self {
            graph,
            id_index,
            viewport_index: HashMap::new(),
            shared_index: HashMap::new(),
            breakpoints: Vec::new(),
        };
        sg.rebuild_derived();
        Ok(sg)
    }

    /// An empty document: no nodes, no breakpoints.
    pub fn empty() -> Self {
        Self {
            graph: StableDiGraph::new(),
            id_index: HashMap::new(),
            viewport_index: HashMap::new(),
            shared_index: HashMap::new(),
            breakpoints: Vec::new(),
        }
    }

    /// Recompute viewport membership, shared-ID groups and breakpoints.
    fn rebuild_derived(&mut self) {
        self.viewport_index.clear();
        self.shared_index.clear();
        self.breakpoints.clear();

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if let Some(shared) = node.shared_id {
                self.shared_index.entry(shared).or_default().push(idx);
            }
            if let Some(bp) = node.as_breakpoint() {
                self.breakpoints.push(bp);
            }
            if let Some(viewport) = self.nearest_viewport(idx) {
                self.viewport_index.insert(node.id, viewport);
            }
        }

        // Stable sort: equal widths keep declaration order.
        self.breakpoints
            .sort_by(|a, b| b.width.total_cmp(&a.width));
    }

    fn nearest_viewport(&self, idx: NodeIndex) -> Option<NodeId> {
        let mut current = idx;
        loop {
            let node = &self.graph[current];
            if node.is_viewport {
                return Some(node.id);
            }
            current = self.parent(current)?;
        }
    }

    /// Look up a node by its id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Get the index for a NodeId.
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// The node stored at `idx`.
    ///
    /// # Panics
    /// If `idx` does not belong to this graph.
    pub fn node_at(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    /// Get the parent index of a node.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Child indices in declaration order.
    ///
    /// Sorts by `NodeIndex` so the result is deterministic regardless of
    /// how `petgraph` iterates its adjacency list.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Breakpoints sorted descending by width.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn breakpoint(&self, id: NodeId) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|bp| bp.id == id)
    }

    /// The breakpoint whose subtree contains `id`.
    pub fn viewport_of(&self, id: NodeId) -> Option<NodeId> {
        self.viewport_index.get(&id).copied()
    }

    /// Members of a shared-ID group, in declaration order.
    pub fn shared_group(&self, shared_id: NodeId) -> impl Iterator<Item = &Node> {
        self.shared_index
            .get(&shared_id)
            .into_iter()
            .flatten()
            .map(|idx| &self.graph[*idx])
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::empty()
    }
}
