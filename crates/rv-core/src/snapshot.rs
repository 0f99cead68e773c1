//! Document snapshots: the wire form the editor hands to the engine.
//!
//! A snapshot is a flat node list. Connections travel inside their source
//! node; breakpoints are derived from viewport roots. JSON is the editor's
//! native form; MessagePack is used when shipping snapshots between
//! processes.

use crate::error::GraphError;
use crate::model::{Node, NodeGraph};
use serde::{Deserialize, Serialize};

/// A flat, ordered node list as supplied by the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
}

impl Snapshot {
    /// Decode a snapshot from JSON text.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a snapshot from MessagePack bytes.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, GraphError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Encode as MessagePack with named fields.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, GraphError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Build the indexed graph. See [`NodeGraph::from_nodes`] for errors.
    pub fn into_graph(self) -> Result<NodeGraph, GraphError> {
        NodeGraph::from_nodes(self.nodes)
    }
}

/// Parse JSON text straight into a `NodeGraph`.
pub fn parse_graph(text: &str) -> Result<NodeGraph, GraphError> {
    Snapshot::from_json(text)?.into_graph()
}
