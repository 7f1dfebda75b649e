//! GraphModel → surface drawing commands.
//!
//! The paint pass is surface-agnostic: it turns the diagram into kurbo
//! paths and text runs and hands them to a [`Surface`]. Transitions are
//! painted first, then states, then free texts, so states cover the line
//! ends and texts float above everything.

use crate::hit::TextMeasure;
use fsm_core::kurbo::{BezPath, Circle, Point, Rect, Shape};
use fsm_core::{Color, Edge, ElementId, GraphModel, Node, TextAnnotation};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Arrowhead side length.
pub const ARROW_LENGTH: f64 = 10.0;
/// Half the opening angle of the arrowhead.
pub const ARROW_HALF_ANGLE: f64 = PI / 6.0;

// ─── Surface ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
}

/// One line of text to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub at: Point,
    pub font_size: f64,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Dash pattern `[on, off]`; `None` for a solid line.
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f64, dash: [f64; 2]) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

/// A raster or vector sink the paint pass draws into.
pub trait Surface: TextMeasure {
    /// Clear to `background`, or to transparent when `None`.
    fn clear(&mut self, background: Option<Color>);
    fn fill_path(&mut self, path: &BezPath, color: Color);
    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke);
    fn fill_text(&mut self, run: &TextRun<'_>);
}

// ─── Palette & overlay ───────────────────────────────────────────────────

/// Colors that do not come from element styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    /// Canvas background; `None` leaves the surface transparent.
    pub background: Option<Color>,
    pub selected_fill: Color,
    pub selected_edge: Color,
    pub selected_border_width: f64,
    pub label_background: Color,
    pub text_selection: Color,
    pub pending_source: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: None,
            selected_fill: Color::rgb8(0x78, 0xA3, 0xCC),
            selected_edge: Color::rgb8(0xFF, 0x44, 0x44),
            selected_border_width: 3.0,
            label_background: Color::WHITE,
            text_selection: Color::rgb8(0x01, 0x4F, 0x9C),
            pending_source: Color::rgb8(0xFF, 0x44, 0x44),
        }
    }
}

/// Transient editor state drawn on top of the diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlay {
    /// Source state chosen in add-edge mode, awaiting its target.
    pub pending_source: Option<ElementId>,
}

// ─── Paint pass ──────────────────────────────────────────────────────────

/// Paint the whole diagram. Call once per frame.
pub fn render(model: &GraphModel, surface: &mut dyn Surface, overlay: &Overlay, palette: &Palette) {
    surface.clear(palette.background);

    for edge in model.edges() {
        let (Some(source), Some(target)) = (model.node(edge.source), model.node(edge.target)) else {
            log::debug!("skipping transition {} with unresolved endpoints", edge.id);
            continue;
        };
        paint_edge(surface, edge, source, target, palette);
    }

    for node in model.nodes() {
        paint_node(surface, node, palette);
    }

    for text in model.texts() {
        paint_text(surface, text, palette);
    }

    if let Some(node) = overlay.pending_source.and_then(|id| model.node(id)) {
        let ring = Circle::new(node.center(), node.radius().max(node.height / 2.0) + 6.0);
        surface.stroke_path(
            &ring.to_path(0.1),
            &Stroke::dashed(palette.pending_source, 1.5, [4.0, 3.0]),
        );
    }

    log::trace!(
        "painted {} states, {} transitions, {} texts",
        model.node_count(),
        model.edge_count(),
        model.texts().len()
    );
}

fn paint_edge(surface: &mut dyn Surface, edge: &Edge, source: &Node, target: &Node, palette: &Palette) {
    let color = if edge.selected {
        palette.selected_edge
    } else {
        edge.style.line_color
    };

    let mut line = BezPath::new();
    line.move_to(edge.start());
    line.line_to(edge.end());
    surface.stroke_path(&line, &Stroke::solid(color, edge.style.line_width));

    // A self-loop has no direction; its arrowhead would be degenerate
    if source.id != target.id {
        let tip = target.boundary_toward(source.center());
        surface.fill_path(&arrowhead(source.center(), tip), color);
    }

    if !edge.label.is_empty() {
        let mid = edge.midpoint();
        let width = surface.text_width(&edge.label, edge.style.font_size);
        let plate = Rect::new(mid.x - width / 2.0 - 5.0, mid.y - 15.0, mid.x + width / 2.0 + 5.0, mid.y + 5.0);
        let plate = plate.to_path(0.1);
        surface.fill_path(&plate, palette.label_background);
        surface.stroke_path(&plate, &Stroke::solid(color, 1.0));
        surface.fill_text(&TextRun {
            text: &edge.label,
            at: Point::new(mid.x, mid.y - 5.0),
            font_size: edge.style.font_size,
            color: edge.style.text_color,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        });
    }
}

/// Filled triangle with its tip at `tip`, pointing away from `from`.
pub fn arrowhead(from: Point, tip: Point) -> BezPath {
    let angle = (tip.y - from.y).atan2(tip.x - from.x);
    let wing = |a: f64| Point::new(tip.x - ARROW_LENGTH * a.cos(), tip.y - ARROW_LENGTH * a.sin());

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(wing(angle - ARROW_HALF_ANGLE));
    path.line_to(wing(angle + ARROW_HALF_ANGLE));
    path.close_path();
    path
}

fn paint_node(surface: &mut dyn Surface, node: &Node, palette: &Palette) {
    let outline = node.outline();
    let (fill, border_width) = if node.selected {
        (palette.selected_fill, palette.selected_border_width)
    } else {
        (node.style.fill_color, 2.0)
    };
    surface.fill_path(&outline, fill);
    surface.stroke_path(&outline, &Stroke::solid(node.style.border_color, border_width));

    let line_height = node.style.font_size + 2.0;
    let lines: Vec<&str> = node.label.split('\n').collect();
    let center = node.center();
    let first_y = center.y - (lines.len() - 1) as f64 * line_height / 2.0;
    for (i, line) in lines.iter().enumerate() {
        surface.fill_text(&TextRun {
            text: line,
            at: Point::new(center.x, first_y + i as f64 * line_height),
            font_size: node.style.font_size,
            color: node.style.text_color,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        });
    }
}

fn paint_text(surface: &mut dyn Surface, text: &TextAnnotation, palette: &Palette) {
    let size = text.style.font_size;
    if text.selected {
        let width = surface.text_width(&text.content, size);
        let frame = Rect::new(text.x - 2.0, text.y - size - 2.0, text.x + width + 2.0, text.y + 2.0);
        surface.stroke_path(
            &frame.to_path(0.1),
            &Stroke::dashed(palette.text_selection, 1.0, [5.0, 3.0]),
        );
    }
    surface.fill_text(&TextRun {
        text: &text.content,
        at: Point::new(text.x, text.y - size),
        font_size: size,
        color: text.style.text_color,
        align: TextAlign::Left,
        baseline: TextBaseline::Top,
    });
}

/// Bounding box of everything the paint pass would draw, if anything.
pub fn diagram_bounds(model: &GraphModel, measure: &dyn TextMeasure) -> Option<Rect> {
    let nodes = model.nodes().map(Node::bounds);
    let texts = model
        .texts()
        .iter()
        .map(|t| t.bounds(measure.text_width(&t.content, t.style.font_size)));
    let labels = model.edges().filter(|e| !e.label.is_empty()).map(|e| {
        let mid = e.midpoint();
        let half = measure.text_width(&e.label, e.style.font_size) / 2.0 + 5.0;
        Rect::new(mid.x - half, mid.y - 15.0, mid.x + half, mid.y + 5.0)
    });
    nodes.chain(texts).chain(labels).reduce(|a, b| a.union(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrowhead_tip_and_wings() {
        let path = arrowhead(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let pts: Vec<Point> = path.elements().iter().filter_map(|el| el.end_point()).collect();
        assert_eq!(pts[0], Point::new(100.0, 0.0));
        let dx = ARROW_LENGTH * ARROW_HALF_ANGLE.cos();
        let dy = ARROW_LENGTH * ARROW_HALF_ANGLE.sin();
        assert!((pts[1].x - (100.0 - dx)).abs() < 1e-9);
        assert!((pts[1].y - dy).abs() < 1e-9);
        assert!((pts[2].y + dy).abs() < 1e-9);
    }

    #[test]
    fn palette_overrides_are_partial() {
        let p: Palette = serde_json::from_str(r##"{"selectedEdge": "#00FF00"}"##).unwrap();
        assert_eq!(p.selected_edge, Color::rgb8(0, 0xFF, 0));
        assert_eq!(p.selected_fill, Palette::default().selected_fill);
    }
}
