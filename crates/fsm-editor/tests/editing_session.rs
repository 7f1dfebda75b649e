//! Integration tests: pointer-driven editing through `EditorState`.
//!
//! Each test drives the editor the way the host page does, with surface
//! coordinates only, and checks the resulting diagram.

use fsm_core::*;
use fsm_editor::*;
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn backend_editor() -> EditorState {
    init_logging();
    let mut ed = EditorState::default();
    ed.import_json(include_str!("fixtures/backend_sparse.json")).unwrap();
    ed
}

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

// ─── Dragging ────────────────────────────────────────────────────────────

#[test]
fn dragging_state_updates_its_transitions_only() {
    let mut ed = backend_editor();

    ed.handle_pointer_down(60.0, 60.0);
    assert_eq!(ed.selection(), Some(ElementRef::Node(id("CLOSED"))));
    assert_eq!(ed.handle_pointer_move(60.0, 160.0), Outcome::MODIFIED);
    ed.handle_pointer_up(60.0, 160.0);

    let closed = ed.graph().node(id("CLOSED")).unwrap();
    assert_eq!((closed.x, closed.y), (50.0, 150.0));
    let tr1 = ed.graph().edge(id("tr_1")).unwrap();
    assert_eq!(tr1.points, [(80.0, 180.0), (280.0, 80.0)]);
    let tr2 = ed.graph().edge(id("tr_2")).unwrap();
    assert_eq!(tr2.points, [(280.0, 80.0), (480.0, 80.0)]);
}

#[test]
fn moving_without_drag_changes_nothing() {
    let mut ed = backend_editor();
    let before = ed.export_json().unwrap();
    assert_eq!(ed.handle_pointer_move(100.0, 100.0), Outcome::NONE);
    assert_eq!(ed.export_json().unwrap(), before);
}

// ─── Selecting & deleting ────────────────────────────────────────────────

#[test]
fn transition_is_picked_near_its_midpoint() {
    let mut ed = backend_editor();
    ed.handle_pointer_down(185.0, 90.0);
    assert_eq!(ed.selection(), Some(ElementRef::Edge(id("tr_1"))));
    assert_eq!(ed.handle_key("Delete", Modifiers::NONE), Outcome::MODIFIED);
    assert!(ed.graph().edge(id("tr_1")).is_none());
    assert_eq!(ed.graph().node_count(), 3);
}

#[test]
fn delete_mode_cascades_through_transitions() {
    let mut ed = backend_editor();
    ed.set_mode(ToolMode::Delete);
    ed.handle_pointer_down(280.0, 80.0);

    let states: Vec<_> = ed.graph().nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(states, vec!["CLOSED", "ESTABLISHED"]);
    assert_eq!(ed.graph().edge_count(), 0);
    assert_eq!(ed.mode(), ToolMode::Delete);
    ed.graph().check_integrity().unwrap();
}

#[test]
fn deleting_state_removes_its_note() {
    let mut ed = backend_editor();
    assert_eq!(ed.annotation_panel().len(), 1);
    ed.set_mode(ToolMode::Delete);
    ed.handle_pointer_down(80.0, 80.0);
    assert!(ed.graph().annotations().is_empty());
    assert!(ed.annotation_panel().is_empty());
}

// ─── Building a diagram ──────────────────────────────────────────────────

#[test]
fn build_label_and_export() {
    init_logging();
    let mut ed = EditorState::default();

    ed.handle_key("s", Modifiers::NONE);
    ed.handle_pointer_down(0.0, 0.0);
    ed.handle_pointer_down(300.0, 0.0);
    ed.handle_key("x", Modifiers::NONE);
    ed.handle_pointer_down(40.0, 200.0);
    ed.handle_key("t", Modifiers::NONE);
    ed.handle_pointer_down(30.0, 30.0);
    ed.handle_pointer_down(330.0, 30.0);
    assert_eq!(ed.mode(), ToolMode::Select);

    // Rename the transition through an inline edit at its midpoint
    ed.handle_double_click(180.0, 30.0);
    let edit = ed.inline_edit().unwrap();
    assert_eq!(edit.original, "");
    assert_eq!(ed.commit_inline_edit("CONNECT"), Outcome::MODIFIED);

    let exported = ed.export_json().unwrap();
    let mut other = EditorState::default();
    other.import_json(&exported).unwrap();
    assert_eq!(ed.graph().node_count(), 2);
    assert_eq!(other.graph().edges().next().unwrap().label, "CONNECT");
    assert_eq!(other.graph().texts().len(), 1);
    // Two state notes and one transition note
    assert_eq!(other.graph().annotations().len(), 3);

    let edge = other.graph().edges().next().unwrap().id;
    let note = other.annotation(edge, "transitionDescription").unwrap();
    assert_eq!(note.content, "From: State\nTo: State\nCondition: describe the trigger");
}

#[test]
fn escape_abandons_a_half_drawn_transition() {
    let mut ed = backend_editor();
    ed.set_mode(ToolMode::AddEdge);
    ed.handle_pointer_down(80.0, 80.0);
    assert_eq!(ed.session().pending_source(), Some(id("CLOSED")));
    ed.handle_key("Escape", Modifiers::NONE);
    assert_eq!(ed.mode(), ToolMode::Select);
    assert_eq!(ed.session().pending_source(), None);
    assert_eq!(ed.graph().edge_count(), 2);
}

#[test]
fn segment_mode_picks_anywhere_on_the_line() {
    init_logging();
    let config = EditorConfig::from_json(r#"{"edgeHitMode": "segment"}"#).unwrap();
    let mut ed = EditorState::new(config);
    ed.import_json(include_str!("fixtures/backend_sparse.json")).unwrap();
    ed.handle_pointer_down(130.0, 85.0);
    assert_eq!(ed.selection(), Some(ElementRef::Edge(id("tr_1"))));
}

#[test]
fn svg_export_reflects_edits() {
    let mut ed = backend_editor();
    ed.update_property(id("CLOSED"), "label", &serde_json::json!("LISTEN"))
        .unwrap();
    let svg = ed.export_svg();
    assert!(svg.contains("LISTEN"));
    assert!(!svg.contains(">CLOSED<"));
}
