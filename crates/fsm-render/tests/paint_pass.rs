//! Integration tests: GraphModel → paint pass → recorded draw commands.

use fsm_core::kurbo::{PathEl, Point};
use fsm_core::*;
use fsm_render::*;
use pretty_assertions::assert_eq;

fn login() -> GraphModel {
    GraphModel::from_json(include_str!("fixtures/login_session.json")).unwrap()
}

fn paint(model: &GraphModel, overlay: &Overlay) -> DisplayList {
    let mut list = DisplayList::new();
    render(model, &mut list, overlay, &Palette::default());
    list
}

fn first_point(path: &fsm_core::kurbo::BezPath) -> Option<Point> {
    match path.elements().first() {
        Some(PathEl::MoveTo(p)) => Some(*p),
        _ => None,
    }
}

// ─── Order ───────────────────────────────────────────────────────────────

#[test]
fn transitions_then_states_then_texts() {
    let list = paint(&login(), &Overlay::default());
    assert_eq!(list.commands()[0], DrawCommand::Clear(None));
    assert_eq!(
        list.texts(),
        vec!["LOGIN_REQ", "LOGIN_ACK", "IDLE", "AUTH", "PENDING", "OPEN", "Session setup"]
    );
}

#[test]
fn multi_line_labels_are_centered() {
    let list = paint(&login(), &Overlay::default());
    let ys: Vec<f64> = list
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { text, at, .. } if text == "AUTH" || text == "PENDING" => Some(at.y),
            _ => None,
        })
        .collect();
    // Center y 150, line height 12 + 2
    assert_eq!(ys, vec![143.0, 157.0]);
}

#[test]
fn free_text_draws_from_top_of_glyphs() {
    let list = paint(&login(), &Overlay::default());
    let at = list.commands().iter().find_map(|c| match c {
        DrawCommand::FillText { text, at, baseline, .. } if text == "Session setup" => {
            assert_eq!(*baseline, TextBaseline::Top);
            Some(*at)
        }
        _ => None,
    });
    assert_eq!(at, Some(Point::new(80.0, 286.0)));
}

// ─── Arrowheads ──────────────────────────────────────────────────────────

#[test]
fn arrow_tip_sits_on_target_outline() {
    let model = login();
    let list = paint(&model, &Overlay::default());
    let arrow_color = model.edge(ElementId::intern("t_login")).unwrap().style.line_color;
    let tips: Vec<Point> = list.fills_in(arrow_color).into_iter().filter_map(first_point).collect();
    // s_auth is a 100×100 rounded rect at (260, 100); the arrow comes from the left
    assert_eq!(tips.first(), Some(&Point::new(260.0, 150.0)));
}

// ─── Selection & overlay ─────────────────────────────────────────────────

#[test]
fn selected_transition_is_highlighted() {
    let mut model = login();
    let t = ElementId::intern("t_accept");
    model.set_selected(Some(ElementRef::Edge(t)));
    let palette = Palette::default();
    let list = paint(&model, &Overlay::default());
    // Line and label plate outline
    assert_eq!(list.strokes_in(palette.selected_edge).len(), 2);
    assert_eq!(list.fills_in(palette.selected_edge).len(), 1);
}

#[test]
fn selection_recolors_line_and_label_plate() {
    let model = login();
    let line_color = model.edge(ElementId::intern("t_accept")).unwrap().style.line_color;
    let list = paint(&model, &Overlay::default());
    let unselected = list.strokes_in(line_color).len();

    let mut selected = login();
    selected.set_selected(Some(ElementRef::Edge(ElementId::intern("t_accept"))));
    let list = paint(&selected, &Overlay::default());
    assert_eq!(list.strokes_in(line_color).len(), unselected - 2);
}

#[test]
fn selected_state_uses_highlight_fill() {
    let mut model = login();
    model.set_selected(Some(ElementRef::Node(ElementId::intern("s_open"))));
    let list = paint(&model, &Overlay::default());
    assert_eq!(list.fills_in(Palette::default().selected_fill).len(), 1);
}

#[test]
fn selected_text_gets_dashed_frame() {
    let mut model = login();
    model.set_selected(Some(ElementRef::Text(ElementId::intern("txt_note"))));
    let palette = Palette::default();
    let list = paint(&model, &Overlay::default());
    let dashed: Vec<_> = list
        .strokes_in(palette.text_selection)
        .into_iter()
        .filter(|s| s.dash.is_some())
        .collect();
    assert_eq!(dashed.len(), 1);
    assert_eq!(dashed[0].dash, Some([5.0, 3.0]));
}

#[test]
fn pending_source_gets_a_ring() {
    let model = login();
    let overlay = Overlay {
        pending_source: Some(ElementId::intern("s_idle")),
    };
    let list = paint(&model, &overlay);
    let ring = list
        .strokes_in(Palette::default().pending_source)
        .into_iter()
        .filter(|s| s.dash.is_some())
        .count();
    assert_eq!(ring, 1);
}

// ─── SVG ─────────────────────────────────────────────────────────────────

#[test]
fn svg_export_contains_every_label() {
    let svg = render_svg(&login(), &Palette::default());
    for label in ["LOGIN_REQ", "IDLE", "PENDING", "Session setup"] {
        assert!(svg.contains(label), "missing {label} in\n{svg}");
    }
}
