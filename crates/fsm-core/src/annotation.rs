//! Descriptive notes bound to states and transitions.
//!
//! The annotation panel shows either every note in the diagram or, while a
//! state or transition is selected, only the notes bound to it. Notes are
//! kept inside [`GraphModel`] so a delete can cascade to them.

use crate::error::GraphError;
use crate::graph::GraphModel;
use crate::id::ElementId;
use crate::model::{AnnotationTarget, DisplayOrder, ElementAnnotation, ElementRef};

pub const STATE_NOTE_TITLE: &str = "State description";
pub const STATE_NOTE_CONTENT: &str = "Describe what this state does";
pub const TRANSITION_NOTE_TITLE: &str = "Transition description";

impl GraphModel {
    /// All notes in insertion order.
    pub fn annotations(&self) -> &[ElementAnnotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: ElementId) -> Option<&ElementAnnotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// The first note bound to `target`.
    pub fn annotation_for(&self, target: AnnotationTarget) -> Option<&ElementAnnotation> {
        self.annotations.iter().find(|a| a.target == target)
    }

    /// The target a selection can carry notes for. Texts carry none.
    pub fn annotation_target(selection: ElementRef) -> Option<AnnotationTarget> {
        match selection {
            ElementRef::Node(id) => Some(AnnotationTarget::State(id)),
            ElementRef::Edge(id) => Some(AnnotationTarget::Transition(id)),
            ElementRef::Text(_) => None,
        }
    }

    /// The panel projection, ordered by display hint.
    ///
    /// With no selection every note is listed; with one, only the notes of
    /// that element (an empty list for texts).
    pub fn panel(&self, selection: Option<ElementRef>) -> Vec<&ElementAnnotation> {
        let mut entries: Vec<&ElementAnnotation> = match selection {
            None => self.annotations.iter().collect(),
            Some(sel) => match Self::annotation_target(sel) {
                Some(target) => self.annotations.iter().filter(|a| a.target == target).collect(),
                None => Vec::new(),
            },
        };
        // Stable: equal hints keep insertion order
        entries.sort_by_key(|a| a.order);
        entries
    }

    /// The note a newly created element starts with.
    pub fn default_annotation(&self, target: AnnotationTarget) -> Result<(String, String), GraphError> {
        match target {
            AnnotationTarget::State(id) => {
                self.node(id).ok_or(GraphError::NotFound(id))?;
                Ok((STATE_NOTE_TITLE.to_string(), STATE_NOTE_CONTENT.to_string()))
            }
            AnnotationTarget::Transition(id) => {
                let edge = self.edge(id).ok_or(GraphError::NotFound(id))?;
                let label = |n| self.node(n).map(|n| n.label.as_str()).unwrap_or_default();
                Ok((
                    TRANSITION_NOTE_TITLE.to_string(),
                    format!(
                        "From: {}\nTo: {}\nCondition: describe the trigger",
                        label(edge.source),
                        label(edge.target)
                    ),
                ))
            }
        }
    }

    /// Return the note bound to `target`, creating the default one if absent.
    pub fn ensure_annotation(&mut self, target: AnnotationTarget) -> Result<ElementId, GraphError> {
        if let Some(existing) = self.annotation_for(target) {
            return Ok(existing.id);
        }
        let (title, content) = self.default_annotation(target)?;
        self.push_annotation(target, title, content)
    }

    /// Create or overwrite the note bound to `target`.
    pub fn set_annotation(
        &mut self,
        target: AnnotationTarget,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<ElementId, GraphError> {
        if !self.contains(target.element()) {
            return Err(GraphError::NotFound(target.id()));
        }
        if let Some(existing) = self.annotations.iter_mut().find(|a| a.target == target) {
            existing.title = title.into();
            existing.content = content.into();
            return Ok(existing.id);
        }
        self.push_annotation(target, title.into(), content.into())
    }

    pub fn remove_annotation(&mut self, id: ElementId) -> Result<ElementAnnotation, GraphError> {
        let pos = self
            .annotations
            .iter()
            .position(|a| a.id == id)
            .ok_or(GraphError::NotFound(id))?;
        Ok(self.annotations.remove(pos))
    }

    fn push_annotation(
        &mut self,
        target: AnnotationTarget,
        title: String,
        content: String,
    ) -> Result<ElementId, GraphError> {
        if !self.contains(target.element()) {
            return Err(GraphError::NotFound(target.id()));
        }
        let id = self.fresh_id("ann");
        let row = u32::try_from(self.annotations.len()).unwrap_or(u32::MAX);
        self.annotations.push(ElementAnnotation {
            id,
            target,
            title,
            content,
            order: DisplayOrder { row, col: 0 },
        });
        log::debug!("annotate {} with {id}", target.id());
        Ok(id)
    }

    /// Insert a fully-formed note (import path). Drops notes whose target
    /// is missing and reports whether it was kept.
    pub(crate) fn insert_annotation(&mut self, annotation: ElementAnnotation) -> bool {
        if !self.contains(annotation.target.element()) {
            log::warn!(
                "dropping annotation {}: {} {} does not exist",
                annotation.id,
                annotation.target.tag(),
                annotation.target.id()
            );
            return false;
        }
        self.annotations.push(annotation);
        true
    }
}
