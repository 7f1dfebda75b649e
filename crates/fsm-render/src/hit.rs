//! Hit testing: point → element lookup.
//!
//! States are tested first (topmost first), then free texts, then
//! transitions. Transitions lose to anything drawn on top of them, and a
//! state covering a transition's midpoint still wins the click.

use fsm_core::kurbo::Point;
use fsm_core::{ElementRef, GraphModel, TextAnnotation};
use serde::{Deserialize, Serialize};

/// Default pick radius for transitions, in pixels.
pub const EDGE_HIT_THRESHOLD: f64 = 20.0;

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed-ratio estimate for headless use: 0.6 × font size per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * 0.6
    }
}

/// How a transition is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeHitMode {
    /// Within the threshold of the line's midpoint.
    #[default]
    Midpoint,
    /// Within the threshold of any point on the segment.
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOptions {
    pub edge_threshold: f64,
    pub edge_mode: EdgeHitMode,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            edge_threshold: EDGE_HIT_THRESHOLD,
            edge_mode: EdgeHitMode::Midpoint,
        }
    }
}

/// Find the topmost element at `p`, or `None` for the background.
pub fn locate(
    model: &GraphModel,
    measure: &dyn TextMeasure,
    p: Point,
    options: &HitOptions,
) -> Option<ElementRef> {
    if let Some(node) = model.nodes().rev().find(|n| n.contains(p)) {
        return Some(ElementRef::Node(node.id));
    }

    if let Some(text) = model
        .texts()
        .iter()
        .rev()
        .find(|t| text_contains(t, measure, p))
    {
        return Some(ElementRef::Text(text.id));
    }

    model
        .edges()
        .rev()
        .find(|e| {
            let d = match options.edge_mode {
                EdgeHitMode::Midpoint => e.midpoint().distance(p),
                EdgeHitMode::Segment => e.distance_to(p),
            };
            d < options.edge_threshold
        })
        .map(|e| ElementRef::Edge(e.id))
}

/// The topmost state at `p`.
pub fn locate_node(model: &GraphModel, p: Point) -> Option<ElementRef> {
    model
        .nodes()
        .rev()
        .find(|n| n.contains(p))
        .map(|n| ElementRef::Node(n.id))
}

fn text_contains(text: &TextAnnotation, measure: &dyn TextMeasure, p: Point) -> bool {
    let width = measure.text_width(&text.content, text.style.font_size);
    let b = text.bounds(width);
    p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsm_core::NodeShape;

    fn model_with_edge() -> (GraphModel, fsm_core::ElementId, fsm_core::ElementId) {
        let mut m = GraphModel::new();
        let a = m.add_node(Point::new(0.0, 0.0));
        let b = m.add_node(Point::new(200.0, 0.0));
        let e = m.add_edge(a, b).unwrap();
        (m, a, e)
    }

    #[test]
    fn circle_hit_and_miss() {
        let mut m = GraphModel::new();
        let a = m.add_node(Point::new(70.0, 70.0));
        let opts = HitOptions::default();
        assert_eq!(
            locate(&m, &ApproxTextMeasure, Point::new(110.0, 110.0), &opts),
            Some(ElementRef::Node(a))
        );
        assert_eq!(
            locate(&m, &ApproxTextMeasure, Point::new(140.0, 140.0), &opts),
            None
        );
    }

    #[test]
    fn later_node_wins_overlap() {
        let mut m = GraphModel::new();
        m.add_node(Point::new(0.0, 0.0));
        let top = m.add_node(Point::new(20.0, 0.0));
        let hit = locate(&m, &ApproxTextMeasure, Point::new(40.0, 30.0), &HitOptions::default());
        assert_eq!(hit, Some(ElementRef::Node(top)));
    }

    #[test]
    fn rounded_rect_uses_box() {
        let mut m = GraphModel::new();
        let a = m.add_node(Point::new(0.0, 0.0));
        m.update_element(
            a,
            fsm_core::ElementPatch::Node(fsm_core::NodePatch {
                shape: Some(NodeShape::RoundedRect),
                ..Default::default()
            }),
        )
        .unwrap();
        assert_eq!(locate_node(&m, Point::new(2.0, 2.0)), Some(ElementRef::Node(a)));
    }

    #[test]
    fn text_box_sits_above_baseline() {
        let mut m = GraphModel::new();
        let t = m.add_text(Point::new(100.0, 100.0));
        let opts = HitOptions::default();
        assert_eq!(
            locate(&m, &ApproxTextMeasure, Point::new(105.0, 95.0), &opts),
            Some(ElementRef::Text(t))
        );
        assert_eq!(locate(&m, &ApproxTextMeasure, Point::new(105.0, 105.0), &opts), None);
    }

    #[test]
    fn edge_midpoint_mode() {
        let (m, _, e) = model_with_edge();
        let opts = HitOptions::default();
        // Midpoint is (130, 30)
        assert_eq!(
            locate(&m, &ApproxTextMeasure, Point::new(135.0, 40.0), &opts),
            Some(ElementRef::Edge(e))
        );
        // On the line but far from its midpoint
        assert_eq!(locate(&m, &ApproxTextMeasure, Point::new(80.0, 30.0), &opts), None);
    }

    #[test]
    fn edge_segment_mode() {
        let (m, _, e) = model_with_edge();
        let opts = HitOptions {
            edge_mode: EdgeHitMode::Segment,
            ..Default::default()
        };
        assert_eq!(
            locate(&m, &ApproxTextMeasure, Point::new(80.0, 35.0), &opts),
            Some(ElementRef::Edge(e))
        );
    }

    #[test]
    fn node_beats_edge() {
        let (m, a, _) = model_with_edge();
        let opts = HitOptions {
            edge_mode: EdgeHitMode::Segment,
            ..Default::default()
        };
        assert_eq!(
            locate(&m, &ApproxTextMeasure, Point::new(40.0, 30.0), &opts),
            Some(ElementRef::Node(a))
        );
    }
}
