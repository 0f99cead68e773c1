//! Errors raised while decoding a snapshot or building a `NodeGraph`.
//!
//! Resolution itself never fails; only malformed input at the graph
//! boundary is reported.

use crate::id::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid MessagePack snapshot: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("could not encode snapshot as MessagePack: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("node `{0}` is declared more than once")]
    DuplicateId(NodeId),

    #[error("node `{node}` names unknown parent `{parent}`")]
    UnknownParent { node: NodeId, parent: NodeId },

    #[error("parent links form a cycle through `{0}`")]
    ParentCycle(NodeId),
}
