//! A surface that records draw commands instead of rasterizing them.
//!
//! Used for headless rendering and to assert on what the paint pass emits.

use crate::hit::{ApproxTextMeasure, TextMeasure};
use crate::paint::{Stroke, Surface, TextAlign, TextBaseline, TextRun};
use fsm_core::Color;
use fsm_core::kurbo::{BezPath, Point};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Option<Color>),
    FillPath {
        path: BezPath,
        color: Color,
    },
    StrokePath {
        path: BezPath,
        stroke: Stroke,
    },
    FillText {
        text: String,
        at: Point,
        font_size: f64,
        color: Color,
        align: TextAlign,
        baseline: TextBaseline,
    },
}

#[derive(Debug, Default)]
pub struct DisplayList<M = ApproxTextMeasure> {
    commands: Vec<DrawCommand>,
    measure: M,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: TextMeasure> DisplayList<M> {
    pub fn with_measure(measure: M) -> Self {
        Self {
            commands: Vec::new(),
            measure,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text of every `FillText` command, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every stroke drawn with `color`.
    pub fn strokes_in(&self, color: Color) -> Vec<&Stroke> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokePath { stroke, .. } if stroke.color == color => Some(stroke),
                _ => None,
            })
            .collect()
    }

    /// Every path filled with `color`.
    pub fn fills_in(&self, color: Color) -> Vec<&BezPath> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPath { path, color: c } if *c == color => Some(path),
                _ => None,
            })
            .collect()
    }
}

impl<M: TextMeasure> TextMeasure for DisplayList<M> {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.measure.text_width(text, font_size)
    }
}

impl<M: TextMeasure> Surface for DisplayList<M> {
    fn clear(&mut self, background: Option<Color>) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(background));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
        });
    }

    fn fill_text(&mut self, run: &TextRun<'_>) {
        self.commands.push(DrawCommand::FillText {
            text: run.text.to_string(),
            at: run.at,
            font_size: run.font_size,
            color: run.color,
            align: run.align,
            baseline: run.baseline,
        });
    }
}
