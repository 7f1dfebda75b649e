//! JSON import/export of a [`GraphModel`].
//!
//! The document has four top-level arrays: `states`, `transitions`, `texts`
//! and `annotations`. Exports spell out every attribute; imports accept
//! documents with style and property fields missing and fill them in the
//! way the diagram has always been drawn.
//!
//! ```json
//! {
//!   "states": [{ "id": "s_1", "type": "state", "x": 40, "y": 40, "label": "IDLE",
//!                "style": { "shape": "circle", "fillColor": "#B3CDE4" } }],
//!   "transitions": [{ "id": "t_1", "type": "transition", "from": "s_1", "to": "s_1" }],
//!   "texts": [],
//!   "annotations": [{ "id": "ann_1", "type": "stateDescription", "stateId": "s_1",
//!                     "title": "Idle", "content": "...", "position": { "row": 0, "col": 0 } }]
//! }
//! ```

use crate::error::GraphError;
use crate::graph::GraphModel;
use crate::id::ElementId;
use crate::model::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ─── Wire records ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct WireDocument {
    #[serde(alias = "nodes", default)]
    states: Option<Vec<WireState>>,
    #[serde(alias = "edges", default)]
    transitions: Option<Vec<WireTransition>>,
    #[serde(default)]
    texts: Vec<WireText>,
    #[serde(default)]
    annotations: Vec<WireAnnotation>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireState {
    id: ElementId,
    #[serde(rename = "type", default)]
    tag: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default = "default_size")]
    width: f64,
    #[serde(default = "default_size")]
    height: f64,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    style: WireNodeStyle,
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    selected: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNodeStyle {
    fill_color: Option<Color>,
    border_color: Option<Color>,
    text_color: Option<Color>,
    font_size: Option<f64>,
    shape: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransition {
    id: ElementId,
    #[serde(rename = "type", default)]
    tag: Option<String>,
    from: ElementId,
    to: ElementId,
    #[serde(default)]
    label: String,
    /// Exported for consumers; recomputed on import.
    #[serde(default)]
    points: Vec<WirePoint>,
    #[serde(default)]
    style: WireEdgeStyle,
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    selected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEdgeStyle {
    line_color: Option<Color>,
    line_width: Option<f64>,
    text_color: Option<Color>,
    font_size: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireText {
    id: ElementId,
    #[serde(rename = "type", default)]
    tag: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    content: String,
    #[serde(default)]
    style: WireTextStyle,
    #[serde(default)]
    selected: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTextStyle {
    text_color: Option<Color>,
    font_size: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnnotation {
    #[serde(default)]
    id: Option<ElementId>,
    #[serde(rename = "type")]
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transition_id: Option<ElementId>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    position: DisplayOrder,
}

fn default_size() -> f64 {
    DEFAULT_NODE_SIZE
}

// ─── Model → wire ────────────────────────────────────────────────────────

impl From<&Node> for WireState {
    fn from(n: &Node) -> Self {
        WireState {
            id: n.id,
            tag: Some("state".into()),
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
            label: Some(n.label.clone()),
            style: WireNodeStyle {
                fill_color: Some(n.style.fill_color),
                border_color: Some(n.style.border_color),
                text_color: Some(n.style.text_color),
                font_size: Some(n.style.font_size),
                shape: Some(n.shape.as_str().into()),
            },
            properties: n.properties.clone(),
            selected: n.selected,
        }
    }
}

impl From<&Edge> for WireTransition {
    fn from(e: &Edge) -> Self {
        WireTransition {
            id: e.id,
            tag: Some("transition".into()),
            from: e.source,
            to: e.target,
            label: e.label.clone(),
            points: e.points.iter().map(|&(x, y)| WirePoint { x, y }).collect(),
            style: WireEdgeStyle {
                line_color: Some(e.style.line_color),
                line_width: Some(e.style.line_width),
                text_color: Some(e.style.text_color),
                font_size: Some(e.style.font_size),
            },
            properties: e.properties.clone(),
            selected: e.selected,
        }
    }
}

impl From<&TextAnnotation> for WireText {
    fn from(t: &TextAnnotation) -> Self {
        WireText {
            id: t.id,
            tag: Some("text".into()),
            x: t.x,
            y: t.y,
            content: t.content.clone(),
            style: WireTextStyle {
                text_color: Some(t.style.text_color),
                font_size: Some(t.style.font_size),
            },
            selected: t.selected,
        }
    }
}

impl From<&ElementAnnotation> for WireAnnotation {
    fn from(a: &ElementAnnotation) -> Self {
        let (state_id, transition_id) = match a.target {
            AnnotationTarget::State(id) => (Some(id), None),
            AnnotationTarget::Transition(id) => (None, Some(id)),
        };
        WireAnnotation {
            id: Some(a.id),
            tag: a.target.tag().into(),
            state_id,
            transition_id,
            title: a.title.clone(),
            content: a.content.clone(),
            position: a.order,
        }
    }
}

/// Annotations serialize in their wire shape, for the panel and side
/// channels that hand single notes to the page.
impl Serialize for ElementAnnotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireAnnotation::from(self).serialize(serializer)
    }
}

// ─── Wire → model ────────────────────────────────────────────────────────

impl WireState {
    fn into_node(self) -> Node {
        let defaults = NodeStyle::default();
        Node {
            label: self.label.unwrap_or_else(|| self.id.to_string()),
            id: self.id,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            shape: self
                .style
                .shape
                .as_deref()
                .and_then(NodeShape::parse)
                .unwrap_or_default(),
            style: NodeStyle {
                fill_color: self.style.fill_color.unwrap_or(defaults.fill_color),
                border_color: self.style.border_color.unwrap_or(defaults.border_color),
                text_color: self.style.text_color.unwrap_or(defaults.text_color),
                font_size: self.style.font_size.unwrap_or(defaults.font_size),
            },
            properties: self.properties,
            selected: self.selected,
        }
    }
}

impl WireTransition {
    fn into_edge(self) -> Edge {
        let defaults = EdgeStyle::default();
        Edge {
            id: self.id,
            source: self.from,
            target: self.to,
            label: self.label,
            points: [(0.0, 0.0); 2],
            style: EdgeStyle {
                line_color: self.style.line_color.unwrap_or(defaults.line_color),
                line_width: self.style.line_width.unwrap_or(defaults.line_width),
                text_color: self.style.text_color.unwrap_or(defaults.text_color),
                font_size: self.style.font_size.unwrap_or(defaults.font_size),
            },
            properties: self.properties,
            selected: self.selected,
        }
    }
}

impl WireText {
    fn into_text(self) -> TextAnnotation {
        let defaults = TextStyle::default();
        TextAnnotation {
            id: self.id,
            x: self.x,
            y: self.y,
            content: self.content,
            style: TextStyle {
                text_color: self.style.text_color.unwrap_or(defaults.text_color),
                font_size: self.style.font_size.unwrap_or(defaults.font_size),
            },
            selected: self.selected,
        }
    }
}

impl WireAnnotation {
    /// `None` when the tag is unknown or the matching target id is absent.
    fn target(&self) -> Option<AnnotationTarget> {
        let id = match self.tag.as_str() {
            "stateDescription" => self.state_id?,
            "transitionDescription" => self.transition_id?,
            _ => return None,
        };
        AnnotationTarget::from_tag(&self.tag, id)
    }
}

// ─── Public API ──────────────────────────────────────────────────────────

impl GraphModel {
    /// Serialize the whole diagram.
    pub fn to_json(&self) -> Result<String, GraphError> {
        let doc = WireDocument {
            states: Some(self.nodes().map(WireState::from).collect()),
            transitions: Some(self.edges().map(WireTransition::from).collect()),
            texts: self.texts().iter().map(WireText::from).collect(),
            annotations: self.annotations().iter().map(WireAnnotation::from).collect(),
        };
        serde_json::to_string_pretty(&doc).map_err(|e| GraphError::invalid_format(e.to_string()))
    }

    /// Serialize only the annotation list.
    pub fn annotations_to_json(&self) -> Result<String, GraphError> {
        let list: Vec<WireAnnotation> = self.annotations().iter().map(WireAnnotation::from).collect();
        serde_json::to_string_pretty(&list).map_err(|e| GraphError::invalid_format(e.to_string()))
    }

    /// Build a diagram from JSON. On error nothing is returned, so a
    /// caller's current model stays as it was.
    pub fn from_json(json: &str) -> Result<GraphModel, GraphError> {
        let doc: WireDocument =
            serde_json::from_str(json).map_err(|e| GraphError::invalid_format(e.to_string()))?;
        let states = doc
            .states
            .ok_or_else(|| GraphError::invalid_format("missing `states` array"))?;
        let transitions = doc
            .transitions
            .ok_or_else(|| GraphError::invalid_format("missing `transitions` array"))?;

        let mut model = GraphModel::new();
        let mut seen = HashSet::new();
        let mut claim = |id: ElementId| {
            if seen.insert(id) {
                Ok(())
            } else {
                Err(GraphError::invalid_format(format!("duplicate id {id}")))
            }
        };

        for state in states {
            claim(state.id)?;
            model.insert_node(state.into_node());
        }
        for transition in transitions {
            claim(transition.id)?;
            let id = transition.id;
            model.insert_edge(transition.into_edge()).map_err(|e| match e {
                GraphError::UnknownNode(n) => {
                    GraphError::invalid_format(format!("transition {id} references unknown state {n}"))
                }
                other => other,
            })?;
        }
        for text in doc.texts {
            claim(text.id)?;
            model.insert_text(text.into_text());
        }

        // Generated note ids must not collide with ids further down the list
        let reserved: HashSet<ElementId> = doc.annotations.iter().filter_map(|a| a.id).collect();
        let mut dropped = 0usize;
        for record in doc.annotations {
            let Some(target) = record.target() else {
                log::warn!("dropping annotation with unusable type {:?}", record.tag);
                dropped += 1;
                continue;
            };
            let id = match record.id {
                Some(id) => {
                    claim(id)?;
                    id
                }
                None => loop {
                    let id = model.fresh_id("ann");
                    if !reserved.contains(&id) {
                        break id;
                    }
                },
            };
            let kept = model.insert_annotation(ElementAnnotation {
                id,
                target,
                title: record.title,
                content: record.content,
                order: record.position,
            });
            if !kept {
                dropped += 1;
            }
        }

        // At most one element stays selected: the first flagged one
        let selection = model.selected();
        model.set_selected(selection);

        log::debug!(
            "imported {} states, {} transitions, {} texts, {} annotations ({dropped} dropped)",
            model.node_count(),
            model.edge_count(),
            model.texts().len(),
            model.annotations().len()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn missing_transitions_is_invalid() {
        let err = GraphModel::from_json(r#"{"states": []}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidFormat(ref m) if m.contains("transitions")));
        assert!(GraphModel::from_json("not json").is_err());
    }

    #[test]
    fn aliases_are_accepted() {
        let m = GraphModel::from_json(r#"{"nodes": [{"id": "a"}], "edges": []}"#).unwrap();
        assert_eq!(m.node_count(), 1);
    }

    #[test]
    fn back_fill_uses_renderer_fallbacks() {
        let m = GraphModel::from_json(
            r#"{"states": [{"id": "wire_a", "x": 5, "y": 6}], "transitions": [{"id": "wire_t", "from": "wire_a", "to": "wire_a"}]}"#,
        )
        .unwrap();
        let n = m.node(ElementId::intern("wire_a")).unwrap();
        assert_eq!(n.label, "wire_a");
        assert_eq!(n.shape, NodeShape::RoundedRect);
        assert_eq!((n.width, n.height), (60.0, 60.0));
        let e = m.edge(ElementId::intern("wire_t")).unwrap();
        assert_eq!(e.style, EdgeStyle::default());
        assert_eq!(e.points, [(35.0, 36.0), (35.0, 36.0)]);
    }

    #[test]
    fn dangling_transition_rejects_import() {
        let err = GraphModel::from_json(
            r#"{"states": [{"id": "wire_b"}], "transitions": [{"id": "wire_u", "from": "wire_b", "to": "wire_nowhere"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::InvalidFormat(ref m) if m.contains("wire_nowhere")));
    }

    #[test]
    fn duplicate_ids_and_bad_colors_reject_import() {
        assert!(GraphModel::from_json(r#"{"states": [{"id": "d"}, {"id": "d"}], "transitions": []}"#).is_err());
        assert!(GraphModel::from_json(
            r##"{"states": [{"id": "c", "style": {"fillColor": "blue"}}], "transitions": []}"##
        )
        .is_err());
    }

    #[test]
    fn orphaned_annotations_are_dropped() {
        let m = GraphModel::from_json(
            r#"{"states": [{"id": "wire_k"}], "transitions": [],
                "annotations": [
                  {"id": "wire_n1", "type": "stateDescription", "stateId": "wire_k", "title": "ok"},
                  {"id": "wire_n2", "type": "stateDescription", "stateId": "wire_gone"},
                  {"id": "wire_n3", "type": "sticky"}
                ]}"#,
        )
        .unwrap();
        assert_eq!(m.annotations().len(), 1);
        assert_eq!(m.annotations()[0].title, "ok");
    }

    #[test]
    fn generated_note_ids_avoid_later_records() {
        let m = GraphModel::from_json(
            r#"{"states": [{"id": "wire_q"}], "transitions": [],
                "annotations": [
                  {"type": "stateDescription", "stateId": "wire_q", "title": "first"},
                  {"id": "ann_1", "type": "stateDescription", "stateId": "wire_q", "title": "second"}
                ]}"#,
        )
        .unwrap();
        let ids: Vec<_> = m.annotations().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], "ann_1");
        assert_eq!(ids[1], "ann_1");
    }

    #[test]
    fn export_is_explicit() {
        let mut m = GraphModel::new();
        let a = m.add_node(Point::new(0.0, 0.0));
        m.add_edge(a, a).unwrap();
        let v: serde_json::Value = serde_json::from_str(&m.to_json().unwrap()).unwrap();
        assert_eq!(v["states"][0]["type"], "state");
        assert_eq!(v["states"][0]["style"]["shape"], "circle");
        assert_eq!(v["states"][0]["style"]["fillColor"], "#B3CDE4");
        assert_eq!(v["transitions"][0]["from"], a.as_str());
        assert_eq!(v["transitions"][0]["points"][1]["x"], 30.0);
        assert_eq!(v["texts"], serde_json::json!([]));
    }
}
