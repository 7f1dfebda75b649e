//! WASM bridge for the FSM canvas: exposes the diagram editor to the page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the
//! `<canvas>`, forwards pointer and key events in canvas-local
//! coordinates, and repaints when a handler says so.

mod render2d;

use fsm_core::{ElementId, ElementRef};
use fsm_editor::{EditorConfig, EditorState, Modifiers, Outcome, ToolMode};
use render2d::{CanvasMeasure, CanvasSurface};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The page-facing editor.
///
/// Pointer and key handlers return `true` when the canvas needs a repaint.
/// Whether the diagram itself changed since the last check is reported by
/// [`FsmCanvas::take_modified`].
#[wasm_bindgen]
pub struct FsmCanvas {
    editor: EditorState,
    modified: bool,
}

#[wasm_bindgen]
impl FsmCanvas {
    /// Create an editor drawing on `ctx`. `config` is optional camelCase
    /// JSON, e.g. `{"edgeHitMode":"segment","autoAnnotate":false}`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
        config: Option<String>,
    ) -> Result<FsmCanvas, JsError> {
        init_logging();

        let config = match config.as_deref() {
            Some(json) => EditorConfig::from_json(json).map_err(js_error)?,
            None => EditorConfig::default(),
        };
        let mut editor = EditorState::with_measure(config, Box::new(CanvasMeasure::new(ctx)));
        editor.resize(width, height);
        log::debug!("editor created at {width}x{height}");
        Ok(Self {
            editor,
            modified: false,
        })
    }

    /// Same as the constructor with a required configuration.
    pub fn with_config(
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
        config: &str,
    ) -> Result<FsmCanvas, JsError> {
        Self::new(ctx, width, height, Some(config.to_string()))
    }

    /// Paint the diagram onto `ctx`.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let size = self.editor.viewport();
        let mut surface = CanvasSurface::new(ctx, size.width, size.height);
        self.editor.render(&mut surface);
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let outcome = self.editor.resize(width, height);
        self.track(outcome)
    }

    /// `true` if the diagram changed since the last call.
    pub fn take_modified(&mut self) -> bool {
        std::mem::take(&mut self.modified)
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        let outcome = self.editor.handle_pointer_down(x, y);
        self.track(outcome)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let outcome = self.editor.handle_pointer_move(x, y);
        self.track(outcome)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        let outcome = self.editor.handle_pointer_up(x, y);
        self.track(outcome)
    }

    /// Open an inline edit under the pointer. Returns the edit as JSON
    /// (`{"target":{"id","kind"},"anchor":{"x","y"},"original"}`) or
    /// `null` when nothing editable was hit.
    pub fn handle_double_click(&mut self, x: f64, y: f64) -> String {
        let outcome = self.editor.handle_double_click(x, y);
        self.track(outcome);
        self.get_inline_edit()
    }

    pub fn get_inline_edit(&self) -> String {
        to_json_or_null(self.editor.inline_edit())
    }

    pub fn commit_inline_edit(&mut self, text: &str) -> bool {
        let outcome = self.editor.commit_inline_edit(text);
        self.track(outcome)
    }

    pub fn cancel_inline_edit(&mut self) -> bool {
        let outcome = self.editor.cancel_inline_edit();
        self.track(outcome)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. Returns JSON:
    /// `{"repaint":bool,"modified":bool,"mode":"<mode>"}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let outcome = self.editor.handle_key(key, modifiers);
        self.track(outcome);
        key_result_json(outcome, self.editor.mode())
    }

    // ─── Modes & selection ───────────────────────────────────────────────

    /// Switch tool by name (`select`, `add-node`, `addState`, ...).
    /// Returns `false` for an unknown name.
    pub fn set_mode(&mut self, name: &str) -> bool {
        match ToolMode::parse(name) {
            Some(mode) => {
                let outcome = self.editor.set_mode(mode);
                self.track(outcome);
                true
            }
            None => {
                log::warn!("unknown tool mode {name:?}");
                false
            }
        }
    }

    pub fn get_mode(&self) -> String {
        self.editor.mode().to_string()
    }

    /// The selection as `{"id","kind"}`, or `null`.
    pub fn get_selected(&self) -> String {
        match self.editor.selection() {
            Some(r) => element_json(r),
            None => "null".to_string(),
        }
    }

    pub fn select_by_id(&mut self, id: &str) -> bool {
        let Some(target) = ElementId::lookup(id).and_then(|id| self.editor.graph().resolve(id)) else {
            return false;
        };
        let outcome = self.editor.select(Some(target));
        self.track(outcome)
    }

    pub fn delete_selected(&mut self) -> bool {
        let outcome = self.editor.delete_selected();
        self.track(outcome)
    }

    // ─── Import / export ─────────────────────────────────────────────────

    pub fn export_json(&self) -> Result<String, JsError> {
        self.editor.export_json().map_err(js_error)
    }

    /// Replace the diagram. On error the current diagram is kept.
    pub fn import_json(&mut self, json: &str) -> Result<(), JsError> {
        let outcome = self.editor.import_json(json).map_err(js_error)?;
        self.track(outcome);
        Ok(())
    }

    pub fn export_svg(&self) -> String {
        self.editor.export_svg()
    }

    pub fn reset(&mut self) {
        let outcome = self.editor.reset();
        self.track(outcome);
    }

    // ─── Property editor ─────────────────────────────────────────────────

    /// Set one field, e.g. `update_property("s_1", "style.fillColor", "\"#FF0000\"")`.
    /// `value` is JSON.
    pub fn update_property(&mut self, id: &str, path: &str, value: &str) -> Result<(), JsError> {
        let id = known_id(id)?;
        let value: serde_json::Value = serde_json::from_str(value).map_err(js_error)?;
        let outcome = self.editor.update_property(id, path, &value).map_err(js_error)?;
        self.track(outcome);
        Ok(())
    }

    // ─── Annotation panel ────────────────────────────────────────────────

    /// Notes the panel lists for the current selection, as a JSON array.
    pub fn get_annotation_panel(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.editor.annotation_panel()).map_err(js_error)
    }

    /// The note of `type` (`stateDescription` / `transitionDescription`)
    /// attached to `element_id`, or `null`.
    pub fn get_annotation(&self, element_id: &str, tag: &str) -> String {
        let note = ElementId::lookup(element_id).and_then(|id| self.editor.annotation(id, tag));
        to_json_or_null(note)
    }

    /// Create or replace a note. Returns its id.
    pub fn set_annotation(
        &mut self,
        element_id: &str,
        tag: &str,
        title: &str,
        content: &str,
    ) -> Result<String, JsError> {
        let element = known_id(element_id)?;
        let id = self
            .editor
            .set_annotation(element, tag, title, content)
            .map_err(js_error)?;
        self.modified = true;
        Ok(id.to_string())
    }

    /// The id of the selected element's note, created with defaults when
    /// it has none yet.
    pub fn edit_selected_annotation(&mut self) -> Result<String, JsError> {
        let before = self.editor.graph().annotations().len();
        let id = self.editor.selected_annotation().map_err(js_error)?;
        self.modified |= self.editor.graph().annotations().len() != before;
        Ok(id.to_string())
    }

    /// Select the element a panel note describes.
    pub fn select_annotation_owner(&mut self, annotation_id: &str) -> Result<bool, JsError> {
        let id = known_id(annotation_id)?;
        let outcome = self.editor.select_annotation_owner(id).map_err(js_error)?;
        Ok(self.track(outcome))
    }

    pub fn export_annotations(&self) -> Result<String, JsError> {
        self.editor.export_annotations().map_err(js_error)
    }
}

impl FsmCanvas {
    fn track(&mut self, outcome: Outcome) -> bool {
        self.modified |= outcome.modified;
        outcome.repaint
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Check a diagram document without loading it. Returns JSON:
/// `{"ok":true,"states":N,"transitions":N}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    validation_json(json)
}

fn validation_json(json: &str) -> String {
    match fsm_core::GraphModel::from_json(json) {
        Ok(graph) => serde_json::json!({
            "ok": true,
            "states": graph.node_count(),
            "transitions": graph.edge_count(),
        })
        .to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// Ids from the page are untrusted; never intern them.
fn known_id(s: &str) -> Result<ElementId, JsError> {
    ElementId::lookup(s).ok_or_else(|| JsError::new(&format!("element not found: {s}")))
}

fn to_json_or_null<T: serde::Serialize>(value: Option<T>) -> String {
    value
        .and_then(|v| serde_json::to_string(&v).ok())
        .unwrap_or_else(|| "null".to_string())
}

fn element_json(r: ElementRef) -> String {
    serde_json::json!({ "id": r.id().as_str(), "kind": r.kind().to_string() }).to_string()
}

fn key_result_json(outcome: Outcome, mode: ToolMode) -> String {
    format!(
        r#"{{"repaint":{},"modified":{},"mode":"{}"}}"#,
        outcome.repaint,
        outcome.modified,
        mode.as_str()
    )
}

// ─── Logging & panics ────────────────────────────────────────────────────

fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = console_log::init_with_level(log::Level::Debug);
        console_error_panic_hook::set_once();
    });
}
