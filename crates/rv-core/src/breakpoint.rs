//! Breakpoint resolver: width → breakpoint, and per-breakpoint style merging.
//!
//! The partition rule lives in exactly one place, [`active_breakpoint`]:
//! a width exactly equal to a breakpoint's declared width belongs to that
//! breakpoint, never to the one below it. Every other resolution path
//! (style merging, variant invalidation, serializer feed) goes through it.

use crate::id::NodeId;
use crate::model::{Breakpoint, Node, NodeGraph, StyleMap};
use smallvec::SmallVec;

/// Pick the breakpoint whose tier contains `width`.
///
/// Breakpoints need not be pre-sorted. Widths above the largest breakpoint
/// resolve to the largest, widths below the smallest (and NaN) resolve to
/// the smallest. Returns `None` only for an empty list.
pub fn active_breakpoint(width: f32, breakpoints: &[Breakpoint]) -> Option<&Breakpoint> {
    let mut sorted: SmallVec<[&Breakpoint; 4]> = breakpoints.iter().collect();
    sorted.sort_by(|a, b| b.width.total_cmp(&a.width));

    let largest = *sorted.first()?;
    if width > largest.width {
        return Some(largest);
    }
    for pair in sorted.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        if width > lower.width && width <= upper.width {
            return Some(upper);
        }
    }
    sorted.last().copied()
}

/// Resolve the effective style of a logical element at `width`.
///
/// `logical_id` may be a shared ID or the id of any concrete node; a
/// concrete node that carries a shared ID resolves as its whole group.
/// The primary (largest-breakpoint) record supplies every property; the
/// record chosen for the active breakpoint only overrides the properties it
/// marks independent. Unknown ids resolve to an empty map.
pub fn resolve_style(graph: &NodeGraph, logical_id: NodeId, width: f32) -> StyleMap {
    let records = records_of(graph, logical_id);
    let Some(primary) = primary_record(graph, &records) else {
        log::trace!("resolve_style: no records for {logical_id}");
        return StyleMap::new();
    };

    let mut resolved = primary.style.clone();
    let Some(chosen) = chosen_record(graph, &records, width) else {
        return resolved;
    };
    if chosen.id == primary.id {
        return resolved;
    }

    for (key, independent) in &chosen.independent_styles {
        if !independent {
            continue;
        }
        // An independent flag without a value has nothing to override with.
        if let Some(value) = chosen.style.get(key) {
            resolved.insert(key.clone(), value.clone());
        }
    }
    log::trace!(
        "resolve_style: {logical_id} @ {width}px -> primary {} + overrides from {}",
        primary.id,
        chosen.id
    );
    resolved
}

/// Resolve `logical_id` once per breakpoint, largest first.
///
/// This is the feed a stylesheet serializer consumes: one merged map per
/// breakpoint tier.
pub fn resolve_per_breakpoint(graph: &NodeGraph, logical_id: NodeId) -> Vec<(Breakpoint, StyleMap)> {
    graph
        .breakpoints()
        .iter()
        .map(|bp| (bp.clone(), resolve_style(graph, logical_id, bp.width)))
        .collect()
}

/// All concrete records of a logical element, in declaration order.
pub fn records_of(graph: &NodeGraph, logical_id: NodeId) -> SmallVec<[&Node; 4]> {
    let group = match graph.get(logical_id) {
        Some(node) => match node.shared_id {
            Some(shared) => shared,
            None => return SmallVec::from_iter([node]),
        },
        None => logical_id,
    };
    graph.shared_group(group).collect()
}

/// The record belonging to the widest breakpoint. Records outside any
/// viewport only win when no record sits in one.
fn primary_record<'g>(graph: &'g NodeGraph, records: &[&'g Node]) -> Option<&'g Node> {
    for bp in graph.breakpoints() {
        if let Some(record) = record_for(graph, records, bp.id) {
            return Some(record);
        }
    }
    records.first().copied()
}

/// The record for the active breakpoint, else the nearest smaller breakpoint
/// that has one. `None` means "use the primary".
fn chosen_record<'g>(graph: &'g NodeGraph, records: &[&'g Node], width: f32) -> Option<&'g Node> {
    let breakpoints = graph.breakpoints();
    let active = active_breakpoint(width, breakpoints)?;
    let start = breakpoints.iter().position(|bp| bp.id == active.id)?;
    breakpoints[start..]
        .iter()
        .find_map(|bp| record_for(graph, records, bp.id))
}

fn record_for<'g>(graph: &NodeGraph, records: &[&'g Node], breakpoint: NodeId) -> Option<&'g Node> {
    records
        .iter()
        .copied()
        .find(|record| graph.viewport_of(record.id) == Some(breakpoint))
}
