pub mod breakpoint;
pub mod error;
pub mod id;
pub mod lint;
pub mod model;
pub mod query;
pub mod snapshot;

pub use breakpoint::{active_breakpoint, resolve_per_breakpoint, resolve_style};
pub use error::GraphError;
pub use id::NodeId;
pub use lint::{LintDiagnostic, LintSeverity, lint_graph};
pub use model::*;
pub use snapshot::{Snapshot, parse_graph};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
