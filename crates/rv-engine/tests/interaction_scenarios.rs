//! Integration tests: snapshot → engine → events/resizes → resolved output.
//!
//! Exercises the full pipeline against a three-breakpoint landing page
//! (1440 / 768 / 375).

use pretty_assertions::assert_eq;
use rv_core::{EventType, NodeId, Snapshot};
use rv_engine::{Engine, EngineConfig, TransitionOutcome};
use serde_json::json;

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_engine() -> Engine {
    init_logging();
    let input = include_str!("fixtures/landing_page.json");
    Engine::from_json(input, EngineConfig::default()).unwrap()
}

fn showing(engine: &Engine, node: &str) -> Option<NodeId> {
    engine.active_variant(id(node)).map(|r| r.target_id)
}

// ─── Breakpoint styles ──────────────────────────────────────────────────

#[test]
fn independent_style_overrides_only_its_own_key() {
    let engine = make_engine();
    let style = engine.resolve_style(id("hero"), 700.0);
    assert_eq!(
        serde_json::Value::Object(style),
        json!({ "width": "50%", "color": "red" })
    );
}

#[test]
fn content_key_overrides_on_mobile() {
    let engine = make_engine();
    let style = engine.resolve_style(id("hero"), 375.0);
    assert_eq!(
        serde_json::Value::Object(style),
        json!({
            "width": "100%",
            "color": "red",
            "backgroundImage": "url(hero-narrow.png)"
        })
    );
}

#[test]
fn serializer_feed_has_one_entry_per_breakpoint() {
    let engine = make_engine();
    let feed = engine.resolve_all_breakpoints(id("hero"));
    let names: Vec<&str> = feed.iter().map(|(bp, _)| bp.name.as_str()).collect();
    assert_eq!(names, vec!["Desktop", "Tablet", "Mobile"]);
    assert_eq!(feed[0].1.get("width"), Some(&json!("100%")));
    assert_eq!(feed[1].1.get("width"), Some(&json!("50%")));
}

// ─── Start-up ───────────────────────────────────────────────────────────

#[test]
fn load_connection_fires_at_start() {
    let engine = make_engine();
    assert_eq!(showing(&engine, "promo"), Some(id("promo_intro")));
    let promo = engine.resolve(id("promo"), 1440.0).unwrap();
    assert_eq!(promo.style.get("src"), Some(&json!("intro.mp4")));
}

#[test]
fn load_connections_can_be_disabled() {
    init_logging();
    let config = EngineConfig {
        fire_load_connections: false,
        ..Default::default()
    };
    let engine = Engine::from_json(include_str!("fixtures/landing_page.json"), config).unwrap();
    assert_eq!(showing(&engine, "promo"), None);
}

// ─── Click cycles ───────────────────────────────────────────────────────

#[test]
fn menu_toggles_open_and_closed() {
    let mut engine = make_engine();

    engine.transition(id("menu_d"), EventType::Click);
    assert_eq!(showing(&engine, "menu_d"), Some(id("menu_open_d")));
    let menu = engine.resolve(id("menu_d"), 1440.0).unwrap();
    assert_eq!(menu.children_ids, vec![id("menu_link_d")]);

    let outcome = engine.transition(id("menu_d"), EventType::Click);
    assert_eq!(outcome, TransitionOutcome::Reverted { node: id("menu_d") });
    assert_eq!(showing(&engine, "menu_d"), None);
}

#[test]
fn child_trigger_opens_its_dynamic_parent() {
    let mut engine = make_engine();
    engine.transition(id("menu_icon_d"), EventType::Click);
    assert_eq!(showing(&engine, "menu_d"), Some(id("menu_open_d")));
    assert_eq!(showing(&engine, "menu_icon_d"), None);
}

#[test]
fn dangling_connection_is_ignored() {
    let mut engine = make_engine();
    let outcome = engine.transition(id("broken"), EventType::Click);
    assert_eq!(outcome, TransitionOutcome::Unchanged);
    assert_eq!(showing(&engine, "broken"), None);
}

#[test]
fn unknown_source_changes_nothing() {
    let mut engine = make_engine();
    let before = engine.variants().active_count();
    let outcome = engine.transition(id("missing-id"), EventType::Click);
    assert_eq!(outcome, TransitionOutcome::Unchanged);
    assert_eq!(engine.variants().active_count(), before);
}

// ─── Viewport-specific wiring ───────────────────────────────────────────

#[test]
fn mobile_menu_uses_mobile_copy_of_target() {
    let mut engine = make_engine();
    engine.set_current_width(375.0);

    let outcome = engine.transition(id("menu_m"), EventType::Click);
    assert_eq!(
        outcome,
        TransitionOutcome::Entered {
            node: id("menu_m"),
            target: id("menu_open_m")
        }
    );
    let menu = engine.resolve(id("menu_m"), 375.0).unwrap();
    assert_eq!(
        serde_json::Value::Object(menu.style),
        json!({ "height": "100vh", "display": "none" })
    );

    // menu_open_m points back at the desktop menu; its mobile copy is the
    // source itself, so this closes the menu.
    let outcome = engine.transition(id("menu_m"), EventType::Click);
    assert_eq!(outcome, TransitionOutcome::Reverted { node: id("menu_m") });
}

#[test]
fn viewport_scoped_connection_is_preferred() {
    let mut engine = make_engine();
    engine.transition(id("cta"), EventType::Click);
    assert_eq!(showing(&engine, "cta"), Some(id("cta_on")));

    engine.reset();
    engine.set_current_width(375.0);
    engine.transition(id("cta"), EventType::Click);
    assert_eq!(showing(&engine, "cta"), Some(id("cta_mobile_on")));
}

// ─── Hover ──────────────────────────────────────────────────────────────

#[test]
fn hover_then_leave_restores_base() {
    let mut engine = make_engine();
    engine.transition(id("card"), EventType::Hover);
    let card = engine.resolve(id("card"), 1440.0).unwrap();
    assert_eq!(card.style.get("shadow"), Some(&json!("0 8px 24px #0003")));

    engine.transition(id("card"), EventType::MouseLeave);
    let card = engine.resolve(id("card"), 1440.0).unwrap();
    assert_eq!(card.style.get("shadow"), Some(&json!("none")));
    assert_eq!(card.variant_id, None);
}

#[test]
fn variant_mouse_leave_connection_closes_hover() {
    let mut engine = make_engine();
    engine.transition(id("tile"), EventType::Hover);
    assert_eq!(showing(&engine, "tile"), Some(id("tile_hover")));

    let outcome = engine.transition(id("tile"), EventType::MouseLeave);
    assert_eq!(outcome, TransitionOutcome::Reverted { node: id("tile") });
    assert!(!engine.variants().was_hovered(id("tile")));
}

// ─── Resizes ────────────────────────────────────────────────────────────

#[test]
fn resize_inside_breakpoint_keeps_variants() {
    let mut engine = make_engine();
    engine.transition(id("menu_d"), EventType::Click);

    let reset = engine.set_current_width(1000.0);
    assert!(reset.is_empty());
    assert_eq!(engine.current_breakpoint().unwrap().width, 1440.0);
    assert_eq!(showing(&engine, "menu_d"), Some(id("menu_open_d")));
}

#[test]
fn crossing_into_mobile_resets_variants() {
    let mut engine = make_engine();
    engine.transition(id("menu_d"), EventType::Click);

    let reset = engine.set_current_width(300.0);
    assert_eq!(reset, vec![id("menu_d"), id("promo")]);
    assert_eq!(engine.current_breakpoint().unwrap().name, "Mobile");
    assert_eq!(engine.variants().active_count(), 0);
}

#[test]
fn exact_boundary_width_stays_in_its_breakpoint() {
    let mut engine = make_engine();
    engine.set_current_width(768.0);
    assert_eq!(engine.current_breakpoint().unwrap().id, id("vp_tablet"));
    engine.transition(id("menu_d"), EventType::Click);
    assert!(engine.set_current_width(500.0).is_empty());
    assert_eq!(showing(&engine, "menu_d"), Some(id("menu_open_d")));
}

// ─── Snapshot refresh ───────────────────────────────────────────────────

#[test]
fn refreshed_snapshot_keeps_live_variants() {
    let mut engine = make_engine();
    engine.transition(id("menu_d"), EventType::Click);

    let fresh = rv_core::parse_graph(include_str!("fixtures/landing_page.json")).unwrap();
    let reset = engine.replace_graph(fresh);
    assert!(reset.is_empty());
    assert_eq!(showing(&engine, "menu_d"), Some(id("menu_open_d")));
}

#[test]
fn msgpack_snapshot_drives_the_same_engine() {
    init_logging();
    let snapshot = Snapshot::from_json(include_str!("fixtures/landing_page.json")).unwrap();
    let bytes = snapshot.to_msgpack().unwrap();
    let graph = Snapshot::from_msgpack(&bytes).unwrap().into_graph().unwrap();

    let mut engine = Engine::new(graph, EngineConfig::default());
    engine.transition(id("menu_icon_d"), EventType::Click);
    assert_eq!(showing(&engine, "menu_d"), Some(id("menu_open_d")));
}
