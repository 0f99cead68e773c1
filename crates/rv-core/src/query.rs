//! Stateless graph queries used by the variant state machine.

use crate::id::NodeId;
use crate::model::{Connection, EventType, Node, NodeGraph};
use smallvec::SmallVec;
use std::collections::HashSet;

impl NodeGraph {
    /// Ids of the children of `parent_id`, in declaration order.
    /// Unknown ids have no children.
    pub fn children_of(&self, parent_id: NodeId) -> Vec<NodeId> {
        match self.index_of(parent_id) {
            Some(idx) => self
                .children(idx)
                .into_iter()
                .map(|child| self.node_at(child).id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// The member of `shared_id`'s group that lives under `viewport_id`.
    pub fn find_by_shared_id(&self, shared_id: NodeId, viewport_id: NodeId) -> Option<&Node> {
        self.shared_group(shared_id)
            .find(|node| self.viewport_of(node.id) == Some(viewport_id))
    }

    /// Nearest dynamic ancestor of `node_id`, excluding the node itself.
    ///
    /// Each step follows `dynamic_parent_id` when it names an existing node,
    /// otherwise `parent_id`. Revisiting a node ends the walk.
    pub fn find_dynamic_ancestor(&self, node_id: NodeId) -> Option<NodeId> {
        let mut visited = HashSet::from([node_id]);
        let mut current = self.get(node_id)?;
        loop {
            let next = current
                .dynamic_parent_id
                .filter(|id| self.contains(*id))
                .or(current.parent_id)?;
            if !visited.insert(next) {
                return None;
            }
            current = self.get(next)?;
            if current.is_dynamic {
                return Some(next);
            }
        }
    }

    /// Connections on `node_id` that fire on `event`.
    ///
    /// Connections scoped to `current_breakpoint` come first, then the
    /// viewport-agnostic ones; declared order is kept within each tier.
    /// Connections scoped to any other breakpoint are dropped.
    pub fn connections_of(
        &self,
        node_id: NodeId,
        event: EventType,
        current_breakpoint: Option<NodeId>,
    ) -> SmallVec<[&Connection; 4]> {
        let Some(node) = self.get(node_id) else {
            return SmallVec::new();
        };
        let matching = || {
            node.dynamic_connections
                .iter()
                .filter(move |c| c.event_type == event)
        };

        let mut out: SmallVec<[&Connection; 4]> = SmallVec::new();
        if let Some(bp) = current_breakpoint {
            out.extend(matching().filter(|c| c.viewport_id == Some(bp)));
        }
        out.extend(matching().filter(|c| c.viewport_id.is_none()));
        out
    }

    /// Whether `node_id` declares any connection for `event` at the current breakpoint.
    pub fn has_connection(
        &self,
        node_id: NodeId,
        event: EventType,
        current_breakpoint: Option<NodeId>,
    ) -> bool {
        !self
            .connections_of(node_id, event, current_breakpoint)
            .is_empty()
    }
}
