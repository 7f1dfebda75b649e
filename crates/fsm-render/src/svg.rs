//! SVG export.
//!
//! [`SvgSurface`] receives the same paint pass as the canvas and writes
//! each command as an SVG element. [`render_svg`] frames the diagram with
//! a small margin.

use crate::hit::{ApproxTextMeasure, TextMeasure};
use crate::paint::{Overlay, Palette, Stroke, Surface, TextAlign, TextBaseline, TextRun, diagram_bounds, render};
use fsm_core::kurbo::{BezPath, Rect};
use fsm_core::{Color, GraphModel};
use std::fmt::Write;

const MARGIN: f64 = 16.0;

pub struct SvgSurface<M = ApproxTextMeasure> {
    view: Rect,
    body: String,
    measure: M,
}

impl SvgSurface {
    pub fn new(view: Rect) -> Self {
        Self::with_measure(view, ApproxTextMeasure)
    }
}

impl<M: TextMeasure> SvgSurface<M> {
    pub fn with_measure(view: Rect, measure: M) -> Self {
        Self {
            view,
            body: String::new(),
            measure,
        }
    }

    /// Close the document and return it.
    pub fn finish(self) -> String {
        let Rect { x0, y0, .. } = self.view;
        let (w, h) = (self.view.width(), self.view.height());
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"{x0} {y0} {w} {h}\">\n\
             <style>\n  text {{ font-family: Arial, sans-serif; }}\n</style>\n{}</svg>\n",
            self.body
        )
    }
}

impl<M: TextMeasure> TextMeasure for SvgSurface<M> {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.measure.text_width(text, font_size)
    }
}

impl<M: TextMeasure> Surface for SvgSurface<M> {
    fn clear(&mut self, background: Option<Color>) {
        self.body.clear();
        if let Some(bg) = background {
            let v = self.view;
            let _ = writeln!(
                self.body,
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
                v.x0,
                v.y0,
                v.width(),
                v.height(),
                bg.to_hex()
            );
        }
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let _ = writeln!(self.body, "  <path d=\"{}\" fill=\"{}\" />", path.to_svg(), color.to_hex());
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke) {
        let dash = stroke
            .dash
            .map(|[on, off]| format!(" stroke-dasharray=\"{on} {off}\""))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{dash} />",
            path.to_svg(),
            stroke.color.to_hex(),
            stroke.width
        );
    }

    fn fill_text(&mut self, run: &TextRun<'_>) {
        let anchor = match run.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
        };
        let baseline = match run.baseline {
            TextBaseline::Top => "hanging",
            TextBaseline::Middle => "central",
        };
        let _ = writeln!(
            self.body,
            "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"{baseline}\">{}</text>",
            run.at.x,
            run.at.y,
            run.font_size,
            run.color.to_hex(),
            escape(run.text)
        );
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the diagram to a standalone SVG document.
pub fn render_svg(model: &GraphModel, palette: &Palette) -> String {
    let view = diagram_bounds(model, &ApproxTextMeasure)
        .map(|b| b.inflate(MARGIN, MARGIN))
        .unwrap_or_else(|| Rect::new(0.0, 0.0, 800.0, 600.0));
    let mut surface = SvgSurface::new(view);
    render(model, &mut surface, &Overlay::default(), palette);
    surface.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsm_core::kurbo::Point;

    #[test]
    fn empty_diagram_has_default_frame() {
        let svg = render_svg(&GraphModel::new(), &Palette::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 800 600\""));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut m = GraphModel::new();
        let a = m.add_node(Point::new(0.0, 0.0));
        m.set_text(fsm_core::ElementRef::Node(a), "<A & B>").unwrap();
        let svg = render_svg(&m, &Palette::default());
        assert!(svg.contains("&lt;A &amp; B&gt;"));
        assert!(svg.contains("fill=\"#B3CDE4\""));
    }
}
