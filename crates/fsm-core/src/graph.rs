//! The diagram graph: states, transitions, texts and their annotations.
//!
//! States and transitions live in a `StableDiGraph` so transition endpoints
//! are structural: a transition cannot exist without both of its states.
//! Insertion order is tracked separately because hit testing and painting
//! both depend on it (later elements sit on top), and `StableGraph` reuses
//! vacated indices.
//!
//! Every public mutation leaves the model consistent:
//! - each transition's source and target are live states;
//! - each annotation's target is a live state or transition;
//! - cached transition endpoints match the current state centers.

use crate::error::GraphError;
use crate::geometry::edge_points;
use crate::id::ElementId;
use crate::model::*;
use crate::patch::ElementPatch;
use kurbo::Point;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Label given to states placed on the canvas.
pub const DEFAULT_NODE_LABEL: &str = "State";
/// Content given to texts placed on the canvas.
pub const DEFAULT_TEXT_CONTENT: &str = "Double-click to edit";

/// What a successful `delete_element` removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deleted {
    pub element: Option<ElementRef>,
    /// Transitions removed because their state went away.
    pub edges: SmallVec<[ElementId; 4]>,
    pub annotations: SmallVec<[ElementId; 4]>,
}

impl Deleted {
    /// Whether `r` was removed by this deletion.
    pub fn contains(&self, r: ElementRef) -> bool {
        self.element == Some(r)
            || matches!(r, ElementRef::Edge(id) if self.edges.contains(&id))
    }
}

/// The complete diagram, and the unit of serialization.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    graph: StableDiGraph<Node, Edge>,
    node_index: HashMap<ElementId, NodeIndex>,
    edge_index: HashMap<ElementId, EdgeIndex>,
    node_order: Vec<ElementId>,
    edge_order: Vec<ElementId>,
    texts: Vec<TextAnnotation>,
    pub(crate) annotations: Vec<ElementAnnotation>,
    /// Suffix counter for generated ids.
    next_serial: u64,
}

impl GraphModel {
    /// Create an empty diagram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty() && self.texts.is_empty()
    }

    // ─── Lookup ──────────────────────────────────────────────────────────

    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn edge(&self, id: ElementId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn text(&self, id: ElementId) -> Option<&TextAnnotation> {
        self.texts.iter().find(|t| t.id == id)
    }

    /// States in insertion order (last = topmost).
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.node_order.iter().map(|id| &self.graph[self.node_index[id]])
    }

    /// Transitions in insertion order.
    pub fn edges(&self) -> impl DoubleEndedIterator<Item = &Edge> + '_ {
        self.edge_order.iter().map(|id| &self.graph[self.edge_index[id]])
    }

    /// Free texts in insertion order.
    pub fn texts(&self) -> &[TextAnnotation] {
        &self.texts
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// Resolve a bare id to a typed element reference.
    pub fn resolve(&self, id: ElementId) -> Option<ElementRef> {
        if self.node_index.contains_key(&id) {
            Some(ElementRef::Node(id))
        } else if self.edge_index.contains_key(&id) {
            Some(ElementRef::Edge(id))
        } else if self.text(id).is_some() {
            Some(ElementRef::Text(id))
        } else {
            None
        }
    }

    pub fn kind_of(&self, id: ElementId) -> Option<ElementKind> {
        self.resolve(id).map(|r| r.kind())
    }

    pub fn contains(&self, r: ElementRef) -> bool {
        self.resolve(r.id()) == Some(r)
    }

    /// Ids of every transition that starts or ends at `node_id`.
    pub fn edges_touching(&self, node_id: ElementId) -> SmallVec<[ElementId; 4]> {
        let Some(&idx) = self.node_index.get(&node_id) else {
            return SmallVec::new();
        };
        let mut ids: SmallVec<[ElementId; 4]> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        // A self-loop shows up in both directions
        ids.sort_by_key(|id| self.edge_order.iter().position(|e| e == id));
        ids.dedup();
        ids
    }

    /// The editable text of an element: state/transition label or text content.
    pub fn text_of(&self, r: ElementRef) -> Option<&str> {
        match r {
            ElementRef::Node(id) => self.node(id).map(|n| n.label.as_str()),
            ElementRef::Edge(id) => self.edge(id).map(|e| e.label.as_str()),
            ElementRef::Text(id) => self.text(id).map(|t| t.content.as_str()),
        }
    }

    // ─── Id generation ───────────────────────────────────────────────────

    /// Generate `<prefix>_<n>` not used by any element or annotation.
    pub fn fresh_id(&mut self, prefix: &str) -> ElementId {
        loop {
            self.next_serial += 1;
            let id = ElementId::intern(&format!("{prefix}_{}", self.next_serial));
            if !self.id_in_use(id) {
                return id;
            }
        }
    }

    pub(crate) fn id_in_use(&self, id: ElementId) -> bool {
        self.resolve(id).is_some() || self.annotations.iter().any(|a| a.id == id)
    }

    // ─── Insertion ───────────────────────────────────────────────────────

    /// Place a new state with its top-left corner at `at`.
    pub fn add_node(&mut self, at: Point) -> ElementId {
        let id = self.fresh_id("s");
        self.insert_node(Node::new(id, at.x, at.y, DEFAULT_NODE_LABEL));
        log::debug!("add state {id} at ({}, {})", at.x, at.y);
        id
    }

    /// Connect two states. Fails without touching the model if either is missing.
    pub fn add_edge(&mut self, source: ElementId, target: ElementId) -> Result<ElementId, GraphError> {
        if !self.node_index.contains_key(&source) {
            return Err(GraphError::UnknownNode(source));
        }
        if !self.node_index.contains_key(&target) {
            return Err(GraphError::UnknownNode(target));
        }
        let id = self.fresh_id("t");
        self.insert_edge(Edge::new(id, source, target))?;
        log::debug!("add transition {id}: {source} -> {target}");
        Ok(id)
    }

    /// Place a new free text with its baseline anchored at `at`.
    pub fn add_text(&mut self, at: Point) -> ElementId {
        let id = self.fresh_id("txt");
        self.texts
            .push(TextAnnotation::new(id, at.x, at.y, DEFAULT_TEXT_CONTENT));
        log::debug!("add text {id} at ({}, {})", at.x, at.y);
        id
    }

    /// Insert a fully-formed state (import path). The id must be unused.
    pub(crate) fn insert_node(&mut self, node: Node) {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.push(id);
    }

    /// Insert a fully-formed transition, recomputing its cached endpoints.
    pub(crate) fn insert_edge(&mut self, mut edge: Edge) -> Result<(), GraphError> {
        let (Some(&from), Some(&to)) = (
            self.node_index.get(&edge.source),
            self.node_index.get(&edge.target),
        ) else {
            let missing = if self.node_index.contains_key(&edge.source) {
                edge.target
            } else {
                edge.source
            };
            return Err(GraphError::UnknownNode(missing));
        };
        edge.points = edge_points(&self.graph[from], &self.graph[to]);
        let id = edge.id;
        let idx = self.graph.add_edge(from, to, edge);
        self.edge_index.insert(id, idx);
        self.edge_order.push(id);
        Ok(())
    }

    pub(crate) fn insert_text(&mut self, text: TextAnnotation) {
        self.texts.push(text);
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Merge a typed partial update into the element with `id`.
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> Result<(), GraphError> {
        let found = self.resolve(id).ok_or(GraphError::NotFound(id))?;
        if found.kind() != patch.kind() {
            return Err(GraphError::KindMismatch {
                id,
                expected: patch.kind(),
            });
        }
        match patch {
            ElementPatch::Node(p) => {
                let idx = self.node_index[&id];
                if p.apply(&mut self.graph[idx]) {
                    self.recompute_edge_geometry(id);
                }
            }
            ElementPatch::Edge(p) => {
                let idx = self.edge_index[&id];
                p.apply(&mut self.graph[idx]);
            }
            ElementPatch::Text(p) => {
                if let Some(t) = self.texts.iter_mut().find(|t| t.id == id) {
                    p.apply(t);
                }
            }
        }
        log::debug!("update {id}");
        Ok(())
    }

    /// Replace the editable text of an element (label or content).
    pub fn set_text(&mut self, r: ElementRef, text: impl Into<String>) -> Result<(), GraphError> {
        let text = text.into();
        match r {
            ElementRef::Node(id) => {
                let idx = *self.node_index.get(&id).ok_or(GraphError::NotFound(id))?;
                self.graph[idx].label = text;
            }
            ElementRef::Edge(id) => {
                let idx = *self.edge_index.get(&id).ok_or(GraphError::NotFound(id))?;
                self.graph[idx].label = text;
            }
            ElementRef::Text(id) => {
                let t = self
                    .texts
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or(GraphError::NotFound(id))?;
                t.content = text;
            }
        }
        Ok(())
    }

    /// Move a state's top-left corner, then refresh attached transitions.
    pub fn move_node(&mut self, id: ElementId, to: Point) -> Result<(), GraphError> {
        let idx = *self.node_index.get(&id).ok_or(GraphError::NotFound(id))?;
        let node = &mut self.graph[idx];
        node.x = to.x;
        node.y = to.y;
        self.recompute_edge_geometry(id);
        Ok(())
    }

    /// Move a free text's baseline anchor.
    pub fn move_text(&mut self, id: ElementId, to: Point) -> Result<(), GraphError> {
        let t = self
            .texts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(GraphError::NotFound(id))?;
        t.x = to.x;
        t.y = to.y;
        Ok(())
    }

    /// Refresh cached endpoints of every transition touching `node_id`.
    pub fn recompute_edge_geometry(&mut self, node_id: ElementId) {
        let Some(&idx) = self.node_index.get(&node_id) else {
            return;
        };
        let touching: SmallVec<[EdgeIndex; 4]> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        for eidx in touching {
            if let Some((from, to)) = self.graph.edge_endpoints(eidx) {
                let points = edge_points(&self.graph[from], &self.graph[to]);
                self.graph[eidx].points = points;
            }
        }
    }

    /// Remove an element and everything that depends on it.
    ///
    /// States take their transitions and every annotation on either with
    /// them; transitions take their annotations; texts stand alone.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Deleted, GraphError> {
        let element = self.resolve(id).ok_or(GraphError::NotFound(id))?;
        let mut deleted = Deleted {
            element: Some(element),
            ..Default::default()
        };
        match element {
            ElementRef::Node(_) => {
                deleted.edges = self.edges_touching(id);
                for edge_id in deleted.edges.clone() {
                    self.remove_edge(edge_id);
                }
                let idx = self.node_index.remove(&id).ok_or(GraphError::NotFound(id))?;
                self.graph.remove_node(idx);
                self.node_order.retain(|n| *n != id);
            }
            ElementRef::Edge(_) => self.remove_edge(id),
            ElementRef::Text(_) => self.texts.retain(|t| t.id != id),
        }

        let gone = |target: &AnnotationTarget| match target {
            AnnotationTarget::State(s) => element == ElementRef::Node(*s),
            AnnotationTarget::Transition(t) => {
                element == ElementRef::Edge(*t) || deleted.edges.contains(t)
            }
        };
        let mut removed_annotations = SmallVec::new();
        self.annotations.retain(|a| {
            let keep = !gone(&a.target);
            if !keep {
                removed_annotations.push(a.id);
            }
            keep
        });
        deleted.annotations = removed_annotations;

        log::debug!(
            "delete {id}: {} transitions, {} annotations cascaded",
            deleted.edges.len(),
            deleted.annotations.len()
        );
        Ok(deleted)
    }

    fn remove_edge(&mut self, id: ElementId) {
        if let Some(idx) = self.edge_index.remove(&id) {
            self.graph.remove_edge(idx);
            self.edge_order.retain(|e| *e != id);
        }
    }

    /// Make `selection` the only element with its `selected` flag set.
    pub fn set_selected(&mut self, selection: Option<ElementRef>) {
        for idx in self.graph.node_indices().collect::<Vec<_>>() {
            let id = self.graph[idx].id;
            self.graph[idx].selected = selection == Some(ElementRef::Node(id));
        }
        for idx in self.graph.edge_indices().collect::<Vec<_>>() {
            let id = self.graph[idx].id;
            self.graph[idx].selected = selection == Some(ElementRef::Edge(id));
        }
        for t in &mut self.texts {
            t.selected = selection == Some(ElementRef::Text(t.id));
        }
    }

    /// The element whose `selected` flag is set, if any.
    pub fn selected(&self) -> Option<ElementRef> {
        self.nodes()
            .find(|n| n.selected)
            .map(|n| ElementRef::Node(n.id))
            .or_else(|| self.edges().find(|e| e.selected).map(|e| ElementRef::Edge(e.id)))
            .or_else(|| {
                self.texts
                    .iter()
                    .find(|t| t.selected)
                    .map(|t| ElementRef::Text(t.id))
            })
    }

    /// Check the reference invariants. Used by tests and after import.
    pub fn check_integrity(&self) -> Result<(), GraphError> {
        for edge in self.edges() {
            for end in [edge.source, edge.target] {
                if !self.node_index.contains_key(&end) {
                    return Err(GraphError::UnknownNode(end));
                }
            }
        }
        for a in &self.annotations {
            if !self.contains(a.target.element()) {
                return Err(GraphError::NotFound(a.target.id()));
            }
        }
        Ok(())
    }
}

/// Structural equality: same elements, same order, same attributes.
impl PartialEq for GraphModel {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes())
            && self.edges().eq(other.edges())
            && self.texts == other.texts
            && self.annotations == other.annotations
    }
}
