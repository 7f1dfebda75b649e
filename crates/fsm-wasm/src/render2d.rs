//! Canvas2D surface.
//!
//! Replays the paint pass onto an HTML `<canvas>` through
//! `CanvasRenderingContext2d`, and measures text with the same context so
//! hit boxes match what is on screen.

use fsm_core::Color;
use fsm_core::kurbo::{BezPath, PathEl};
use fsm_render::{Stroke, Surface, TextAlign, TextBaseline, TextMeasure, TextRun};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const FONT_FAMILY: &str = "Arial";

fn font(size: f64) -> String {
    format!("{size}px {FONT_FAMILY}")
}

fn measure_with(ctx: &CanvasRenderingContext2d, text: &str, font_size: f64) -> f64 {
    ctx.set_font(&font(font_size));
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        // Detached contexts cannot measure
        Err(_) => text.chars().count() as f64 * font_size * 0.6,
    }
}

/// Text measurement backed by a canvas context, for hit-testing outside
/// a paint pass.
pub struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
}

impl CanvasMeasure {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasMeasure {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.ctx.save();
        let width = measure_with(&self.ctx, text, font_size);
        self.ctx.restore();
        width
    }
}

/// One paint pass onto a canvas of the given size.
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self { ctx, width, height }
    }

    fn trace(&self, path: &BezPath) {
        let ctx = self.ctx;
        ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => ctx.close_path(),
            }
        }
    }
}

impl TextMeasure for CanvasSurface<'_> {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        measure_with(self.ctx, text, font_size)
    }
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self, background: Option<Color>) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        if let Some(bg) = background {
            self.ctx.set_fill_style_str(&bg.to_hex());
            self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        }
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.trace(path);
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ctx.fill();
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke) {
        let ctx = self.ctx;
        ctx.save();
        self.trace(path);
        ctx.set_stroke_style_str(&stroke.color.to_hex());
        ctx.set_line_width(stroke.width);
        if let Some([on, off]) = stroke.dash {
            let _ = ctx.set_line_dash(&js_sys::Array::of2(
                &JsValue::from_f64(on),
                &JsValue::from_f64(off),
            ));
        }
        ctx.stroke();
        ctx.restore();
    }

    fn fill_text(&mut self, run: &TextRun<'_>) {
        let ctx = self.ctx;
        ctx.set_font(&font(run.font_size));
        ctx.set_fill_style_str(&run.color.to_hex());
        ctx.set_text_align(match run.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        ctx.set_text_baseline(match run.baseline {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
        });
        let _ = ctx.fill_text(run.text, run.at.x, run.at.y);
    }
}
