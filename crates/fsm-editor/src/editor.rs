//! The embeddable editor: one diagram, one session, one configuration.
//!
//! [`EditorState`] is what a host page drives. It hit-tests pointer events,
//! hands them to the [`EditSession`], and exposes import/export, property
//! editing and the annotation panel. Several editors can live side by side;
//! nothing here is global.

use crate::config::EditorConfig;
use crate::inline::InlineEdit;
use crate::input::{InputEvent, Modifiers};
use crate::session::{EditSession, Outcome, ToolMode};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use fsm_core::kurbo::Size;
use fsm_core::{
    AnnotationTarget, ElementAnnotation, ElementId, ElementPatch, ElementRef, GraphError, GraphModel,
};
use fsm_render::{ApproxTextMeasure, Overlay, Surface, TextMeasure, locate, render, render_svg};
use serde_json::Value;

pub struct EditorState {
    graph: GraphModel,
    session: EditSession,
    config: EditorConfig,
    measure: Box<dyn TextMeasure>,
    viewport: Size,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_measure(config, Box::new(ApproxTextMeasure))
    }

    /// Use `measure` for text hit boxes, typically the drawing surface.
    pub fn with_measure(config: EditorConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            graph: GraphModel::new(),
            session: EditSession::new(),
            config,
            measure,
            viewport: Size::new(800.0, 600.0),
        }
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: InputEvent) -> Outcome {
        let hit = if event.needs_hit() {
            locate(
                &self.graph,
                self.measure.as_ref(),
                event.point(),
                &self.config.hit_options(),
            )
        } else {
            None
        };
        self.session.handle(&mut self.graph, &self.config, &event, hit)
    }

    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> Outcome {
        self.handle_event(InputEvent::PointerDown { x, y })
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> Outcome {
        self.handle_event(InputEvent::PointerMove { x, y })
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> Outcome {
        self.handle_event(InputEvent::PointerUp { x, y })
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> Outcome {
        self.handle_event(InputEvent::DoubleClick { x, y })
    }

    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Outcome {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Outcome::NONE;
        };
        // Keys typed into an open inline edit belong to it
        if self.session.inline_edit().is_some() && action != ShortcutAction::Cancel {
            return Outcome::NONE;
        }
        match action {
            ShortcutAction::ToolSelect => self.set_mode(ToolMode::Select),
            ShortcutAction::ToolAddNode => self.set_mode(ToolMode::AddNode),
            ShortcutAction::ToolAddEdge => self.set_mode(ToolMode::AddEdge),
            ShortcutAction::ToolAddText => self.set_mode(ToolMode::AddText),
            ShortcutAction::ToolDelete => self.set_mode(ToolMode::Delete),
            ShortcutAction::DeleteSelection => self.session.delete_selection(&mut self.graph),
            ShortcutAction::Cancel => self.session.cancel(),
        }
    }

    // ─── Modes & selection ───────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ToolMode) -> Outcome {
        self.session.set_mode(mode)
    }

    pub fn mode(&self) -> ToolMode {
        self.session.mode()
    }

    pub fn selection(&self) -> Option<ElementRef> {
        self.session.selection()
    }

    pub fn select(&mut self, target: Option<ElementRef>) -> Outcome {
        self.session.select(&mut self.graph, target)
    }

    pub fn delete_selected(&mut self) -> Outcome {
        self.session.delete_selection(&mut self.graph)
    }

    // ─── Inline edit ─────────────────────────────────────────────────────

    pub fn inline_edit(&self) -> Option<&InlineEdit> {
        self.session.inline_edit()
    }

    pub fn commit_inline_edit(&mut self, text: &str) -> Outcome {
        self.session.commit_inline_edit(&mut self.graph, text)
    }

    pub fn cancel_inline_edit(&mut self) -> Outcome {
        self.session.cancel_inline_edit()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, surface: &mut dyn Surface) {
        let overlay = Overlay {
            pending_source: self.session.pending_source(),
        };
        render(&self.graph, surface, &overlay, &self.config.palette);
    }

    pub fn export_svg(&self) -> String {
        render_svg(&self.graph, &self.config.palette)
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Outcome {
        let size = Size::new(width.max(0.0), height.max(0.0));
        if size == self.viewport {
            return Outcome::NONE;
        }
        self.viewport = size;
        Outcome::REPAINT
    }

    // ─── Import / export ─────────────────────────────────────────────────

    pub fn export_json(&self) -> Result<String, GraphError> {
        self.graph.to_json()
    }

    /// Replace the diagram. On error the current diagram is kept.
    pub fn import_json(&mut self, json: &str) -> Result<Outcome, GraphError> {
        let graph = GraphModel::from_json(json)?;
        self.graph = graph;
        self.session = EditSession::new();
        let selection = self.graph.selected();
        self.session.select(&mut self.graph, selection);
        log::info!(
            "imported diagram: {} states, {} transitions",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        Ok(Outcome::MODIFIED)
    }

    /// Start over with an empty diagram.
    pub fn reset(&mut self) -> Outcome {
        self.graph = GraphModel::new();
        self.session = EditSession::new();
        Outcome::MODIFIED
    }

    // ─── Property editor ─────────────────────────────────────────────────

    /// Apply one property-editor field, e.g. `style.fillColor = "#ff0000"`.
    pub fn update_property(&mut self, id: ElementId, path: &str, value: &Value) -> Result<Outcome, GraphError> {
        let kind = self.graph.kind_of(id).ok_or(GraphError::NotFound(id))?;
        let patch = ElementPatch::from_path(kind, path, value)?;
        self.graph.update_element(id, patch)?;
        Ok(Outcome::MODIFIED)
    }

    // ─── Annotations ─────────────────────────────────────────────────────

    /// Notes the panel should list for the current selection.
    pub fn annotation_panel(&self) -> Vec<&ElementAnnotation> {
        self.graph.panel(self.session.selection())
    }

    pub fn annotation(&self, element: ElementId, tag: &str) -> Option<&ElementAnnotation> {
        let target = AnnotationTarget::from_tag(tag, element)?;
        self.graph.annotation_for(target)
    }

    pub fn set_annotation(
        &mut self,
        element: ElementId,
        tag: &str,
        title: &str,
        content: &str,
    ) -> Result<ElementId, GraphError> {
        let target = AnnotationTarget::from_tag(tag, element)
            .ok_or_else(|| GraphError::InvalidPatch(format!("unknown annotation type {tag:?}")))?;
        self.graph.set_annotation(target, title, content)
    }

    /// The note of the selected state or transition, created on demand.
    pub fn selected_annotation(&mut self) -> Result<ElementId, GraphError> {
        let target = self
            .session
            .selection()
            .and_then(GraphModel::annotation_target)
            .ok_or_else(|| GraphError::InvalidPatch("select a state or transition first".into()))?;
        self.graph.ensure_annotation(target)
    }

    /// Clicking a note in the panel selects the element it describes.
    pub fn select_annotation_owner(&mut self, annotation: ElementId) -> Result<Outcome, GraphError> {
        let target = self
            .graph
            .annotation(annotation)
            .ok_or(GraphError::NotFound(annotation))?
            .target
            .element();
        Ok(self.session.select(&mut self.graph, Some(target)))
    }

    pub fn export_annotations(&self) -> Result<String, GraphError> {
        self.graph.annotations_to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn editor_with_two_states() -> (EditorState, ElementId, ElementId) {
        let mut ed = EditorState::default();
        ed.set_mode(ToolMode::AddNode);
        ed.handle_pointer_down(0.0, 0.0);
        ed.handle_pointer_down(200.0, 0.0);
        let ids: Vec<_> = ed.graph().nodes().map(|n| n.id).collect();
        (ed, ids[0], ids[1])
    }

    #[test]
    fn clicks_build_a_transition() {
        let (mut ed, a, b) = editor_with_two_states();
        ed.set_mode(ToolMode::AddEdge);
        ed.handle_pointer_down(30.0, 30.0);
        assert_eq!(ed.session().pending_source(), Some(a));
        assert_eq!(ed.handle_pointer_down(230.0, 30.0), Outcome::MODIFIED);
        let e = ed.graph().edges().next().unwrap();
        assert_eq!((e.source, e.target), (a, b));
        assert_eq!(ed.mode(), ToolMode::Select);
    }

    #[test]
    fn import_failure_keeps_diagram() {
        let (mut ed, a, _) = editor_with_two_states();
        let before = ed.export_json().unwrap();
        assert!(ed.import_json(r#"{"states": []}"#).is_err());
        assert_eq!(ed.export_json().unwrap(), before);
        assert!(ed.graph().node(a).is_some());
    }

    #[test]
    fn import_resets_session() {
        let (mut ed, _, _) = editor_with_two_states();
        ed.import_json(r#"{"states": [{"id": "ed_x"}], "transitions": []}"#).unwrap();
        assert_eq!(ed.selection(), None);
        assert_eq!(ed.mode(), ToolMode::Select);
        assert_eq!(ed.graph().node_count(), 1);
    }

    #[test]
    fn import_restores_saved_selection() {
        let (mut ed, _, _) = editor_with_two_states();
        ed.import_json(r#"{"states": [{"id": "ed_sel", "selected": true}], "transitions": []}"#)
            .unwrap();
        let sel = Some(ElementRef::Node(ElementId::intern("ed_sel")));
        assert_eq!(ed.selection(), sel);
        assert_eq!(ed.graph().selected(), sel);
    }

    #[test]
    fn update_property_routes_by_kind() {
        let (mut ed, a, _) = editor_with_two_states();
        ed.update_property(a, "style.fillColor", &json!("#ff0000")).unwrap();
        assert_eq!(ed.graph().node(a).unwrap().style.fill_color.to_hex(), "#FF0000");
        assert!(ed.update_property(a, "style.lineWidth", &json!(2)).is_err());
        let ghost = ElementId::intern("ed_ghost");
        assert_eq!(
            ed.update_property(ghost, "label", &json!("x")),
            Err(GraphError::NotFound(ghost))
        );
    }

    #[test]
    fn panel_follows_selection() {
        let (mut ed, a, b) = editor_with_two_states();
        // Both states were auto-annotated; `b` is selected
        assert_eq!(ed.annotation_panel().len(), 1);
        ed.select(None);
        assert_eq!(ed.annotation_panel().len(), 2);

        let note = ed.annotation(a, "stateDescription").unwrap().id;
        ed.select_annotation_owner(note).unwrap();
        assert_eq!(ed.selection(), Some(ElementRef::Node(a)));
        assert!(ed.graph().node(a).unwrap().selected);
        assert!(!ed.graph().node(b).unwrap().selected);
    }

    #[test]
    fn keyboard_switches_and_deletes() {
        let (mut ed, _, b) = editor_with_two_states();
        ed.handle_key("v", Modifiers::NONE);
        assert_eq!(ed.mode(), ToolMode::Select);
        assert_eq!(ed.selection(), Some(ElementRef::Node(b)));
        assert_eq!(ed.handle_key("Delete", Modifiers::NONE), Outcome::MODIFIED);
        assert!(ed.graph().node(b).is_none());
        assert_eq!(ed.handle_key("q", Modifiers::NONE), Outcome::NONE);
    }

    #[test]
    fn keys_do_not_leak_out_of_inline_edit() {
        let (mut ed, _, b) = editor_with_two_states();
        ed.handle_double_click(230.0, 30.0);
        assert!(ed.inline_edit().is_some());
        assert_eq!(ed.handle_key("Delete", Modifiers::NONE), Outcome::NONE);
        assert!(ed.graph().node(b).is_some());
        assert_eq!(ed.handle_key("Escape", Modifiers::NONE), Outcome::REPAINT);
        assert!(ed.inline_edit().is_none());
    }

    #[test]
    fn resize_reports_change_once() {
        let mut ed = EditorState::default();
        assert_eq!(ed.resize(1024.0, 768.0), Outcome::REPAINT);
        assert_eq!(ed.resize(1024.0, 768.0), Outcome::NONE);
        assert_eq!(ed.viewport(), Size::new(1024.0, 768.0));
    }
}
