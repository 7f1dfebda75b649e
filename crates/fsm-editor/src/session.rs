//! The interaction state machine.
//!
//! An [`EditSession`] interprets pointer events against the current tool
//! mode and the element under the pointer, and mutates the [`GraphModel`]
//! accordingly. Hit testing happens outside; the session receives its
//! result.
//!
//! | Mode | Pointer-down on element | Pointer-down on background |
//! |------|-------------------------|----------------------------|
//! | select | select, start drag (states/texts) | clear selection |
//! | add-node | select | place state |
//! | add-edge | state: pick source, then target; other: select | nothing |
//! | add-text | select | place text |
//! | delete | delete with cascade | nothing |

use crate::config::EditorConfig;
use crate::inline::InlineEdit;
use crate::input::InputEvent;
use fsm_core::kurbo::{Point, Vec2};
use fsm_core::{AnnotationTarget, Deleted, ElementId, ElementRef, GraphError, GraphModel};
use std::fmt;
use std::ops::BitOr;

// ─── Modes ───────────────────────────────────────────────────────────────

/// Tool mode as chosen from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    Select,
    AddNode,
    AddEdge,
    AddText,
    Delete,
}

impl ToolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::AddNode => "add-node",
            ToolMode::AddEdge => "add-edge",
            ToolMode::AddText => "add-text",
            ToolMode::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "select" => ToolMode::Select,
            "add-node" | "addState" => ToolMode::AddNode,
            "add-edge" | "addTransition" => ToolMode::AddEdge,
            "add-text" | "addText" => ToolMode::AddText,
            "delete" => ToolMode::Delete,
            _ => return None,
        })
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress through the two clicks that create a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeLink {
    AwaitingSource,
    AwaitingTarget(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Select,
    AddNode,
    AddEdge(EdgeLink),
    AddText,
    Delete,
}

impl Mode {
    fn entered(tool: ToolMode) -> Self {
        match tool {
            ToolMode::Select => Mode::Select,
            ToolMode::AddNode => Mode::AddNode,
            ToolMode::AddEdge => Mode::AddEdge(EdgeLink::AwaitingSource),
            ToolMode::AddText => Mode::AddText,
            ToolMode::Delete => Mode::Delete,
        }
    }

    fn tool(&self) -> ToolMode {
        match self {
            Mode::Select => ToolMode::Select,
            Mode::AddNode => ToolMode::AddNode,
            Mode::AddEdge(_) => ToolMode::AddEdge,
            Mode::AddText => ToolMode::AddText,
            Mode::Delete => ToolMode::Delete,
        }
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────────

/// What a handler did, so the host knows whether to repaint or re-export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub repaint: bool,
    pub modified: bool,
}

impl Outcome {
    pub const NONE: Outcome = Outcome {
        repaint: false,
        modified: false,
    };
    /// Selection or overlay changed; the diagram did not.
    pub const REPAINT: Outcome = Outcome {
        repaint: true,
        modified: false,
    };
    pub const MODIFIED: Outcome = Outcome {
        repaint: true,
        modified: true,
    };
}

impl BitOr for Outcome {
    type Output = Outcome;

    fn bitor(self, rhs: Outcome) -> Outcome {
        Outcome {
            repaint: self.repaint || rhs.repaint,
            modified: self.modified || rhs.modified,
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    target: ElementRef,
    /// Pointer position minus element position at pointer-down.
    offset: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    mode: Mode,
    selection: Option<ElementRef>,
    drag: Option<Drag>,
    inline: Option<InlineEdit>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            mode: Mode::Select,
            selection: None,
            drag: None,
            inline: None,
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode.tool()
    }

    pub fn selection(&self) -> Option<ElementRef> {
        self.selection
    }

    /// Source state picked in add-edge mode, awaiting a target.
    pub fn pending_source(&self) -> Option<ElementId> {
        match self.mode {
            Mode::AddEdge(EdgeLink::AwaitingTarget(id)) => Some(id),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn inline_edit(&self) -> Option<&InlineEdit> {
        self.inline.as_ref()
    }

    /// Switch tools. Drops a pending source and ends any drag.
    pub fn set_mode(&mut self, mode: ToolMode) -> Outcome {
        let had_pending = self.pending_source().is_some();
        self.mode = Mode::entered(mode);
        self.drag = None;
        log::debug!("mode → {mode}");
        if had_pending { Outcome::REPAINT } else { Outcome::NONE }
    }

    /// Make `target` the single selection, keeping element flags in sync.
    pub fn select(&mut self, graph: &mut GraphModel, target: Option<ElementRef>) -> Outcome {
        if self.selection == target {
            return Outcome::NONE;
        }
        self.selection = target;
        graph.set_selected(target);
        Outcome::REPAINT
    }

    /// Dispatch one pointer event. `hit` is the element under the pointer.
    pub fn handle(
        &mut self,
        graph: &mut GraphModel,
        config: &EditorConfig,
        event: &InputEvent,
        hit: Option<ElementRef>,
    ) -> Outcome {
        match *event {
            InputEvent::PointerDown { x, y } => self.pointer_down(graph, config, Point::new(x, y), hit),
            InputEvent::PointerMove { x, y } => self.pointer_move(graph, Point::new(x, y)),
            InputEvent::PointerUp { .. } => {
                self.drag = None;
                Outcome::NONE
            }
            InputEvent::DoubleClick { .. } => self.double_click(graph, hit),
        }
    }

    fn pointer_down(
        &mut self,
        graph: &mut GraphModel,
        config: &EditorConfig,
        p: Point,
        hit: Option<ElementRef>,
    ) -> Outcome {
        match (self.mode, hit) {
            (Mode::Delete, Some(target)) => self.delete(graph, target),
            (Mode::Delete, None) => Outcome::NONE,

            (Mode::AddNode, None) => {
                let id = graph.add_node(p);
                if config.node_label != fsm_core::DEFAULT_NODE_LABEL {
                    if let Err(e) = graph.set_text(ElementRef::Node(id), config.node_label.as_str()) {
                        log::debug!("configured node label not applied: {e}");
                    }
                }
                if config.auto_annotate {
                    annotate(graph, AnnotationTarget::State(id));
                }
                self.select(graph, Some(ElementRef::Node(id)));
                Outcome::MODIFIED
            }

            (Mode::AddText, None) => {
                let id = graph.add_text(p);
                if config.text_content != fsm_core::DEFAULT_TEXT_CONTENT {
                    if let Err(e) = graph.set_text(ElementRef::Text(id), config.text_content.as_str()) {
                        log::debug!("configured text content not applied: {e}");
                    }
                }
                self.select(graph, Some(ElementRef::Text(id)));
                Outcome::MODIFIED
            }

            (Mode::AddEdge(link), Some(ElementRef::Node(node))) => match link {
                EdgeLink::AwaitingSource => {
                    self.mode = Mode::AddEdge(EdgeLink::AwaitingTarget(node));
                    self.select(graph, Some(ElementRef::Node(node)));
                    Outcome::REPAINT
                }
                EdgeLink::AwaitingTarget(source) if source == node => Outcome::NONE,
                EdgeLink::AwaitingTarget(source) => match graph.add_edge(source, node) {
                    Ok(id) => {
                        if config.auto_annotate {
                            annotate(graph, AnnotationTarget::Transition(id));
                        }
                        self.select(graph, Some(ElementRef::Edge(id)));
                        self.mode = Mode::Select;
                        Outcome::MODIFIED
                    }
                    Err(e) => {
                        log::debug!("transition not created: {e}");
                        self.mode = Mode::AddEdge(EdgeLink::AwaitingSource);
                        Outcome::REPAINT
                    }
                },
            },
            (Mode::AddEdge(_), Some(other)) => self.select(graph, Some(other)),
            (Mode::AddEdge(_), None) => Outcome::NONE,

            (Mode::Select, Some(target)) => {
                let out = self.select(graph, Some(target));
                self.drag = drag_origin(graph, target).map(|origin| Drag {
                    target,
                    offset: p - origin,
                });
                out
            }
            (Mode::Select, None) => self.select(graph, None),

            (Mode::AddNode | Mode::AddText, Some(target)) => self.select(graph, Some(target)),
        }
    }

    fn pointer_move(&mut self, graph: &mut GraphModel, p: Point) -> Outcome {
        let Some(drag) = self.drag else {
            return Outcome::NONE;
        };
        let to = p - drag.offset;
        let moved = match drag.target {
            ElementRef::Node(id) => graph.move_node(id, to),
            ElementRef::Text(id) => graph.move_text(id, to),
            ElementRef::Edge(id) => Err(GraphError::NotFound(id)),
        };
        match moved {
            Ok(()) => Outcome::MODIFIED,
            Err(_) => {
                self.drag = None;
                Outcome::NONE
            }
        }
    }

    fn double_click(&mut self, graph: &GraphModel, hit: Option<ElementRef>) -> Outcome {
        let Some(target) = hit else {
            return Outcome::NONE;
        };
        self.drag = None;
        self.inline = InlineEdit::begin(graph, target);
        Outcome::REPAINT
    }

    /// Apply the open inline edit. A target deleted meanwhile is a no-op.
    pub fn commit_inline_edit(&mut self, graph: &mut GraphModel, text: &str) -> Outcome {
        let Some(edit) = self.inline.take() else {
            return Outcome::NONE;
        };
        if edit.original == text {
            return Outcome::NONE;
        }
        match edit.commit(graph, text) {
            Ok(()) => Outcome::MODIFIED,
            Err(e) => {
                log::debug!("inline edit dropped: {e}");
                Outcome::NONE
            }
        }
    }

    pub fn cancel_inline_edit(&mut self) -> Outcome {
        match self.inline.take() {
            Some(_) => Outcome::REPAINT,
            None => Outcome::NONE,
        }
    }

    /// Escape: close an inline edit, else drop a pending source and return
    /// to select mode.
    pub fn cancel(&mut self) -> Outcome {
        if self.inline.is_some() {
            return self.cancel_inline_edit();
        }
        self.set_mode(ToolMode::Select)
    }

    /// Delete the current selection, if any.
    pub fn delete_selection(&mut self, graph: &mut GraphModel) -> Outcome {
        match self.selection {
            Some(target) => self.delete(graph, target),
            None => Outcome::NONE,
        }
    }

    fn delete(&mut self, graph: &mut GraphModel, target: ElementRef) -> Outcome {
        match graph.delete_element(target.id()) {
            Ok(deleted) => {
                self.forget(&deleted);
                Outcome::MODIFIED
            }
            Err(e) => {
                log::debug!("delete ignored: {e}");
                Outcome::NONE
            }
        }
    }

    /// Drop every reference the session holds to removed elements.
    fn forget(&mut self, deleted: &Deleted) {
        if self.selection.is_some_and(|s| deleted.contains(s)) {
            self.selection = None;
        }
        if self.drag.is_some_and(|d| deleted.contains(d.target)) {
            self.drag = None;
        }
        if self
            .inline
            .as_ref()
            .is_some_and(|edit| deleted.contains(edit.target))
        {
            self.inline = None;
        }
        if let Some(source) = self.pending_source()
            && deleted.contains(ElementRef::Node(source))
        {
            self.mode = Mode::AddEdge(EdgeLink::AwaitingSource);
        }
    }
}

/// The point a drag offset is measured from, for draggable elements.
fn drag_origin(graph: &GraphModel, target: ElementRef) -> Option<Point> {
    match target {
        ElementRef::Node(id) => graph.node(id).map(|n| n.origin()),
        ElementRef::Text(id) => graph.text(id).map(|t| t.anchor()),
        ElementRef::Edge(_) => None,
    }
}

fn annotate(graph: &mut GraphModel, target: AnnotationTarget) {
    if let Err(e) = graph.ensure_annotation(target) {
        log::warn!("could not annotate {}: {e}", target.id());
    }
}
