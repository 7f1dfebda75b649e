//! Non-blocking inline text editing.
//!
//! A double-click opens an edit on a state label, transition label or text
//! content. The host page shows an input at [`InlineEdit::anchor`] seeded
//! with [`InlineEdit::original`], then commits or cancels.

use fsm_core::kurbo::Point;
use fsm_core::{ElementRef, GraphError, GraphModel};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineEdit {
    #[serde(serialize_with = "serialize_target")]
    pub target: ElementRef,
    /// Where the input goes: state center, transition midpoint or the top
    /// left of a text.
    #[serde(serialize_with = "serialize_point")]
    pub anchor: Point,
    pub original: String,
}

impl InlineEdit {
    /// Open an edit on `target`, or `None` if it no longer exists.
    pub fn begin(graph: &GraphModel, target: ElementRef) -> Option<Self> {
        let anchor = match target {
            ElementRef::Node(id) => graph.node(id)?.center(),
            ElementRef::Edge(id) => graph.edge(id)?.midpoint(),
            ElementRef::Text(id) => {
                let t = graph.text(id)?;
                Point::new(t.x, t.y - t.style.font_size)
            }
        };
        Some(Self {
            target,
            anchor,
            original: graph.text_of(target)?.to_string(),
        })
    }

    pub fn commit(self, graph: &mut GraphModel, text: impl Into<String>) -> Result<(), GraphError> {
        graph.set_text(self.target, text)
    }
}

fn serialize_target<S: serde::Serializer>(target: &ElementRef, s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let mut st = s.serialize_struct("ElementRef", 2)?;
    st.serialize_field("id", target.id().as_str())?;
    st.serialize_field("kind", &target.kind().to_string())?;
    st.end()
}

fn serialize_point<S: serde::Serializer>(p: &Point, s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let mut st = s.serialize_struct("Point", 2)?;
    st.serialize_field("x", &p.x)?;
    st.serialize_field("y", &p.y)?;
    st.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_by_kind() {
        let mut g = GraphModel::new();
        let a = g.add_node(Point::new(0.0, 0.0));
        let b = g.add_node(Point::new(100.0, 0.0));
        let e = g.add_edge(a, b).unwrap();
        let t = g.add_text(Point::new(10.0, 50.0));

        assert_eq!(InlineEdit::begin(&g, ElementRef::Node(a)).unwrap().anchor, Point::new(30.0, 30.0));
        assert_eq!(InlineEdit::begin(&g, ElementRef::Edge(e)).unwrap().anchor, Point::new(80.0, 30.0));
        let text = InlineEdit::begin(&g, ElementRef::Text(t)).unwrap();
        assert_eq!(text.anchor, Point::new(10.0, 36.0));
        assert_eq!(text.original, fsm_core::DEFAULT_TEXT_CONTENT);
    }

    #[test]
    fn serializes_for_the_page() {
        let mut g = GraphModel::new();
        let a = g.add_node(Point::new(0.0, 0.0));
        let edit = InlineEdit::begin(&g, ElementRef::Node(a)).unwrap();
        let v = serde_json::to_value(&edit).unwrap();
        assert_eq!(v["target"]["id"], a.as_str());
        assert_eq!(v["target"]["kind"], "state");
        assert_eq!(v["anchor"]["x"], 30.0);
        assert_eq!(v["original"], "State");
    }
}
