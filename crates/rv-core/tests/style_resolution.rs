//! Integration tests: JSON snapshot → NodeGraph → per-breakpoint styles.
//!
//! Exercises the full `rv-core` pipeline against a pricing page with three
//! breakpoints declared out of order (1280 / 390 / 820).

use pretty_assertions::assert_eq;
use rv_core::{NodeGraph, NodeId, Snapshot, active_breakpoint, parse_graph, resolve_style};
use serde_json::{Value, json};

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn pricing_page() -> NodeGraph {
    parse_graph(include_str!("fixtures/pricing_page.json")).unwrap()
}

fn style_at(graph: &NodeGraph, logical: &str, width: f32) -> Value {
    Value::Object(resolve_style(graph, id(logical), width))
}

// ─── Breakpoint selection ───────────────────────────────────────────────

#[test]
fn breakpoints_are_sorted_widest_first() {
    let graph = pricing_page();
    let widths: Vec<f32> = graph.breakpoints().iter().map(|bp| bp.width).collect();
    assert_eq!(widths, vec![1280.0, 820.0, 390.0]);
}

#[test]
fn every_width_maps_to_exactly_one_breakpoint() {
    let graph = pricing_page();
    let cases = [
        (4000.0, "desktop"),
        (1280.0, "desktop"),
        (1000.0, "desktop"),
        (820.5, "desktop"),
        (820.0, "tablet"),
        (391.0, "tablet"),
        (390.0, "phone"),
        (120.0, "phone"),
        (0.0, "phone"),
        (f32::NAN, "phone"),
    ];
    for (width, expected) in cases {
        let bp = active_breakpoint(width, graph.breakpoints()).unwrap();
        assert_eq!(bp.id, id(expected), "width {width}");
    }
}

// ─── Style merging ──────────────────────────────────────────────────────

#[test]
fn primary_breakpoint_uses_its_own_record() {
    let graph = pricing_page();
    assert_eq!(
        style_at(&graph, "title", 1280.0),
        json!({ "text": "Simple pricing", "fontSize": 48, "color": "#111" })
    );
}

#[test]
fn only_flagged_properties_override_the_primary() {
    let graph = pricing_page();
    // `color` is set on the tablet record but flagged `false`.
    assert_eq!(
        style_at(&graph, "title", 820.0),
        json!({ "text": "Simple pricing", "fontSize": 36, "color": "#111" })
    );
}

#[test]
fn content_can_differ_per_breakpoint() {
    let graph = pricing_page();
    assert_eq!(
        style_at(&graph, "title", 390.0),
        json!({ "text": "Pricing", "fontSize": 28, "color": "#111" })
    );
}

#[test]
fn concrete_id_resolves_as_its_group() {
    let graph = pricing_page();
    assert_eq!(
        style_at(&graph, "title_phone", 1280.0),
        style_at(&graph, "title", 1280.0)
    );
}

#[test]
fn missing_record_uses_next_smaller_breakpoint() {
    let graph = pricing_page();
    // No tablet copy of `plans`; the phone copy stands in. `gap` is flagged
    // but unset there, so the primary value survives.
    assert_eq!(
        style_at(&graph, "plans", 600.0),
        json!({ "columns": 1, "gap": 32 })
    );
}

#[test]
fn node_outside_shared_groups_resolves_to_itself() {
    let graph = pricing_page();
    assert_eq!(style_at(&graph, "badge", 390.0), json!({ "src": "star.svg" }));
}

#[test]
fn unknown_id_resolves_to_empty_style() {
    let graph = pricing_page();
    assert_eq!(style_at(&graph, "no_such_node", 390.0), json!({}));
}

#[test]
fn per_breakpoint_feed_matches_single_resolution() {
    let graph = pricing_page();
    for (bp, style) in rv_core::resolve_per_breakpoint(&graph, id("title")) {
        assert_eq!(style, resolve_style(&graph, id("title"), bp.width));
    }
}

// ─── Graph queries ──────────────────────────────────────────────────────

#[test]
fn children_keep_declaration_order() {
    let graph = pricing_page();
    assert_eq!(
        graph.children_of(id("plans_desktop")),
        vec![id("plan_basic"), id("plan_pro"), id("plan_team")]
    );
}

#[test]
fn shared_copy_is_found_per_viewport() {
    let graph = pricing_page();
    let phone_copy = graph.find_by_shared_id(id("plans"), id("phone")).unwrap();
    assert_eq!(phone_copy.id, id("plans_phone"));
    assert!(graph.find_by_shared_id(id("plans"), id("tablet")).is_none());
    assert_eq!(graph.viewport_of(id("badge")), Some(id("desktop")));
}

// ─── Snapshots ──────────────────────────────────────────────────────────

#[test]
fn msgpack_snapshot_resolves_like_json() {
    let snapshot = Snapshot::from_json(include_str!("fixtures/pricing_page.json")).unwrap();
    let bytes = snapshot.to_msgpack().unwrap();
    let graph = Snapshot::from_msgpack(&bytes).unwrap().into_graph().unwrap();

    let from_json = pricing_page();
    for width in [1280.0, 820.0, 390.0] {
        assert_eq!(
            style_at(&graph, "title", width),
            style_at(&from_json, "title", width)
        );
    }
}
