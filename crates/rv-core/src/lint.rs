//! Lint diagnostics for node graphs.
//!
//! Reports structural issues without modifying the graph. Resolution
//! tolerates every one of them; the lints exist so the editor can surface
//! wiring mistakes that would otherwise be silent no-ops.

use crate::id::NodeId;
use crate::model::NodeGraph;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed: resolution will silently ignore something.
    Warning,
    /// Informational: harmless but probably unintended.
    Info,
}

/// A single lint diagnostic for a node.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The node this diagnostic refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-target").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the graph and return diagnostics.
#[must_use]
pub fn lint_graph(graph: &NodeGraph) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_viewports_without_width(graph, &mut diags);
    lint_duplicate_breakpoint_widths(graph, &mut diags);
    lint_shared_id_per_viewport(graph, &mut diags);
    lint_connections(graph, &mut diags);
    lint_dynamic_parents(graph, &mut diags);
    lint_independent_without_value(graph, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// A viewport root without a width never becomes a breakpoint, so records
/// under it are never chosen.
fn lint_viewports_without_width(graph: &NodeGraph, diags: &mut Vec<LintDiagnostic>) {
    for node in graph.nodes() {
        if node.is_viewport && node.viewport_width.is_none() {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!(
                    "Viewport `{}` has no width; nodes under it are ignored by style resolution.",
                    node.id
                ),
                severity: LintSeverity::Warning,
                rule: "viewport-without-width",
            });
        }
    }
}

/// Two viewports with the same width leave one of them unreachable.
fn lint_duplicate_breakpoint_widths(graph: &NodeGraph, diags: &mut Vec<LintDiagnostic>) {
    for pair in graph.breakpoints().windows(2) {
        if pair[0].width == pair[1].width {
            diags.push(LintDiagnostic {
                node_id: pair[1].id,
                message: format!(
                    "Viewport `{}` has the same width ({}px) as `{}` and will never be active.",
                    pair[1].id, pair[1].width, pair[0].id
                ),
                severity: LintSeverity::Warning,
                rule: "duplicate-breakpoint-width",
            });
        }
    }
}

/// A shared ID may appear at most once inside one breakpoint's subtree.
fn lint_shared_id_per_viewport(graph: &NodeGraph, diags: &mut Vec<LintDiagnostic>) {
    let mut seen: HashMap<(NodeId, NodeId), NodeId> = HashMap::new();
    for node in graph.nodes() {
        let (Some(shared), Some(viewport)) = (node.shared_id, graph.viewport_of(node.id)) else {
            continue;
        };
        if let Some(first) = seen.get(&(shared, viewport)) {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!(
                    "Shared id `{shared}` already used by `{first}` in viewport `{viewport}`."
                ),
                severity: LintSeverity::Warning,
                rule: "duplicate-shared-id",
            });
        } else {
            seen.insert((shared, viewport), node.id);
        }
    }
}

/// Connections must point at existing nodes and known viewports.
fn lint_connections(graph: &NodeGraph, diags: &mut Vec<LintDiagnostic>) {
    let viewports: HashSet<NodeId> = graph.breakpoints().iter().map(|bp| bp.id).collect();
    for node in graph.nodes() {
        for conn in &node.dynamic_connections {
            if !graph.contains(conn.target_id) {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!(
                        "Connection from `{}` targets missing node `{}`.",
                        node.id, conn.target_id
                    ),
                    severity: LintSeverity::Warning,
                    rule: "dangling-target",
                });
            }
            if let Some(viewport) = conn.viewport_id
                && !viewports.contains(&viewport)
            {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!(
                        "Connection to `{}` is scoped to unknown viewport `{viewport}`.",
                        conn.target_id
                    ),
                    severity: LintSeverity::Warning,
                    rule: "unknown-viewport",
                });
            }
            if conn.source_id != node.id {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!(
                        "Connection stored on `{}` names `{}` as its source.",
                        node.id, conn.source_id
                    ),
                    severity: LintSeverity::Info,
                    rule: "foreign-source",
                });
            }
        }
    }
}

/// Child triggers must point at a dynamic node.
fn lint_dynamic_parents(graph: &NodeGraph, diags: &mut Vec<LintDiagnostic>) {
    for node in graph.nodes() {
        let Some(parent) = node.dynamic_parent_id else {
            continue;
        };
        let message = match graph.get(parent) {
            None => format!("`{}` triggers missing node `{parent}`.", node.id),
            Some(p) if !p.is_dynamic => {
                format!("`{}` triggers `{parent}`, which is not dynamic.", node.id)
            }
            Some(_) => continue,
        };
        diags.push(LintDiagnostic {
            node_id: node.id,
            message,
            severity: LintSeverity::Warning,
            rule: "invalid-dynamic-parent",
        });
    }
}

/// An independent flag on a property the record does not set does nothing.
fn lint_independent_without_value(graph: &NodeGraph, diags: &mut Vec<LintDiagnostic>) {
    for node in graph.nodes() {
        for (key, independent) in &node.independent_styles {
            if *independent && !node.style.contains_key(key) {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!(
                        "`{}` marks `{key}` independent but sets no value for it.",
                        node.id
                    ),
                    severity: LintSeverity::Info,
                    rule: "independent-without-value",
                });
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
