//! Typed partial updates for diagram elements.
//!
//! The property editor submits sparse updates as a dotted path plus a JSON
//! value (`style.fillColor = "#ff0000"`). [`PropertyPath`] parses the path
//! with `winnow`, and [`ElementPatch::from_path`] turns path + value into a
//! patch for exactly one element kind, so a state can never receive a
//! transition-only field.

use crate::error::GraphError;
use crate::model::*;
use serde_json::Value;
use winnow::combinator::{alt, preceded};
use winnow::prelude::*;
use winnow::token::{rest, take_while};

// ─── Paths ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleField {
    Shape,
    FillColor,
    BorderColor,
    LineColor,
    LineWidth,
    TextColor,
    FontSize,
}

impl StyleField {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "shape" => StyleField::Shape,
            "fillColor" => StyleField::FillColor,
            "borderColor" => StyleField::BorderColor,
            "lineColor" => StyleField::LineColor,
            "lineWidth" => StyleField::LineWidth,
            "textColor" => StyleField::TextColor,
            "fontSize" => StyleField::FontSize,
            _ => return None,
        })
    }
}

/// A parsed property-editor path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyPath {
    Label,
    Content,
    Width,
    Height,
    Style(StyleField),
    /// `properties.<key>`; the key is everything after the first dot.
    Custom(String),
}

impl PropertyPath {
    pub fn parse(input: &str) -> Result<Self, GraphError> {
        parse_path
            .parse(input)
            .map_err(|_| GraphError::InvalidPatch(format!("unknown property path {input:?}")))
    }
}

fn parse_identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

fn parse_path(input: &mut &str) -> ModalResult<PropertyPath> {
    alt((
        preceded("style.", parse_identifier)
            .verify_map(StyleField::parse)
            .map(PropertyPath::Style),
        preceded("properties.", rest)
            .verify(|key: &str| !key.is_empty())
            .map(|key: &str| PropertyPath::Custom(key.to_string())),
        parse_identifier.verify_map(|name| match name {
            "label" => Some(PropertyPath::Label),
            "content" => Some(PropertyPath::Content),
            "width" => Some(PropertyPath::Width),
            "height" => Some(PropertyPath::Height),
            _ => None,
        }),
    ))
    .parse_next(input)
}

// ─── Patches ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub shape: Option<NodeShape>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fill_color: Option<Color>,
    pub border_color: Option<Color>,
    pub text_color: Option<Color>,
    pub font_size: Option<f64>,
    pub properties: Properties,
}

impl NodePatch {
    /// Merge into `node`. Returns `true` when the outline changed size, in
    /// which case attached transitions need new endpoints.
    pub fn apply(self, node: &mut Node) -> bool {
        let mut resized = false;
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(shape) = self.shape {
            node.shape = shape;
        }
        if let Some(w) = self.width {
            resized |= node.width != w;
            node.width = w;
        }
        if let Some(h) = self.height {
            resized |= node.height != h;
            node.height = h;
        }
        if let Some(c) = self.fill_color {
            node.style.fill_color = c;
        }
        if let Some(c) = self.border_color {
            node.style.border_color = c;
        }
        if let Some(c) = self.text_color {
            node.style.text_color = c;
        }
        if let Some(s) = self.font_size {
            node.style.font_size = s;
        }
        node.properties.extend(self.properties);
        resized
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub label: Option<String>,
    pub line_color: Option<Color>,
    pub line_width: Option<f64>,
    pub text_color: Option<Color>,
    pub font_size: Option<f64>,
    pub properties: Properties,
}

impl EdgePatch {
    pub fn apply(self, edge: &mut Edge) {
        if let Some(label) = self.label {
            edge.label = label;
        }
        if let Some(c) = self.line_color {
            edge.style.line_color = c;
        }
        if let Some(w) = self.line_width {
            edge.style.line_width = w;
        }
        if let Some(c) = self.text_color {
            edge.style.text_color = c;
        }
        if let Some(s) = self.font_size {
            edge.style.font_size = s;
        }
        edge.properties.extend(self.properties);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub content: Option<String>,
    pub text_color: Option<Color>,
    pub font_size: Option<f64>,
}

impl TextPatch {
    pub fn apply(self, text: &mut TextAnnotation) {
        if let Some(content) = self.content {
            text.content = content;
        }
        if let Some(c) = self.text_color {
            text.style.text_color = c;
        }
        if let Some(s) = self.font_size {
            text.style.font_size = s;
        }
    }
}

/// A partial update for one element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementPatch {
    Node(NodePatch),
    Edge(EdgePatch),
    Text(TextPatch),
}

impl ElementPatch {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementPatch::Node(_) => ElementKind::Node,
            ElementPatch::Edge(_) => ElementKind::Edge,
            ElementPatch::Text(_) => ElementKind::Text,
        }
    }

    /// Build a single-field patch for an element of `kind` from a property
    /// editor path and value.
    pub fn from_path(kind: ElementKind, path: &str, value: &Value) -> Result<Self, GraphError> {
        let path = PropertyPath::parse(path)?;
        let unsupported =
            || GraphError::InvalidPatch(format!("{path:?} does not apply to a {kind}"));

        match kind {
            ElementKind::Node => {
                let mut p = NodePatch::default();
                match &path {
                    PropertyPath::Label => p.label = Some(text_value(value)?),
                    PropertyPath::Width => p.width = Some(positive(value)?),
                    PropertyPath::Height => p.height = Some(positive(value)?),
                    PropertyPath::Style(StyleField::Shape) => {
                        let s = text_value(value)?;
                        p.shape = Some(NodeShape::parse(&s).ok_or_else(|| {
                            GraphError::InvalidPatch(format!("unknown shape {s:?}"))
                        })?);
                    }
                    PropertyPath::Style(StyleField::FillColor) => p.fill_color = Some(color(value)?),
                    PropertyPath::Style(StyleField::BorderColor) => {
                        p.border_color = Some(color(value)?)
                    }
                    PropertyPath::Style(StyleField::TextColor) => p.text_color = Some(color(value)?),
                    PropertyPath::Style(StyleField::FontSize) => p.font_size = Some(positive(value)?),
                    PropertyPath::Custom(key) => {
                        p.properties.insert(key.clone(), property(value)?);
                    }
                    _ => return Err(unsupported()),
                }
                Ok(ElementPatch::Node(p))
            }
            ElementKind::Edge => {
                let mut p = EdgePatch::default();
                match &path {
                    PropertyPath::Label => p.label = Some(text_value(value)?),
                    PropertyPath::Style(StyleField::LineColor) => p.line_color = Some(color(value)?),
                    PropertyPath::Style(StyleField::LineWidth) => p.line_width = Some(positive(value)?),
                    PropertyPath::Style(StyleField::TextColor) => p.text_color = Some(color(value)?),
                    PropertyPath::Style(StyleField::FontSize) => p.font_size = Some(positive(value)?),
                    PropertyPath::Custom(key) => {
                        p.properties.insert(key.clone(), property(value)?);
                    }
                    _ => return Err(unsupported()),
                }
                Ok(ElementPatch::Edge(p))
            }
            ElementKind::Text => {
                let mut p = TextPatch::default();
                match &path {
                    PropertyPath::Content | PropertyPath::Label => {
                        p.content = Some(text_value(value)?)
                    }
                    PropertyPath::Style(StyleField::TextColor) => p.text_color = Some(color(value)?),
                    PropertyPath::Style(StyleField::FontSize) => p.font_size = Some(positive(value)?),
                    _ => return Err(unsupported()),
                }
                Ok(ElementPatch::Text(p))
            }
        }
    }
}

// ─── Value coercion ──────────────────────────────────────────────────────

fn text_value(value: &Value) -> Result<String, GraphError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(GraphError::InvalidPatch(format!("expected text, got {other}"))),
    }
}

/// Form inputs deliver numbers as strings, so both are accepted.
fn positive(value: &Value) -> Result<f64, GraphError> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|v: &f64| v.is_finite() && *v > 0.0)
        .ok_or_else(|| GraphError::InvalidPatch(format!("expected a positive number, got {value}")))
}

fn color(value: &Value) -> Result<Color, GraphError> {
    value
        .as_str()
        .and_then(Color::from_hex)
        .ok_or_else(|| GraphError::InvalidPatch(format!("expected a hex color, got {value}")))
}

fn property(value: &Value) -> Result<PropertyValue, GraphError> {
    match value {
        Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
        Value::Number(n) => n
            .as_f64()
            .map(PropertyValue::Number)
            .ok_or_else(|| GraphError::InvalidPatch(format!("number out of range: {n}"))),
        Value::String(s) => Ok(PropertyValue::Text(s.clone())),
        other => Err(GraphError::InvalidPatch(format!(
            "custom properties hold text, numbers or booleans, got {other}"
        ))),
    }
}
