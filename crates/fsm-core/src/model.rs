//! Core data model for FSM diagrams.
//!
//! A diagram holds states (nodes), transitions (directed edges between
//! states), free-floating text annotations, and descriptive notes bound to a
//! state or transition. Positions are surface-local pixels; a node's `(x, y)`
//! is its top-left corner, a text's `(x, y)` is the left end of its baseline.

use crate::id::ElementId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Side length of a freshly placed state.
pub const DEFAULT_NODE_SIZE: f64 = 60.0;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb8(0xFF, 0xFF, 0xFF);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (channel(self.r), channel(self.g), channel(self.b), channel(self.a));
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("malformed color {s:?}")))
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Outline of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeShape {
    #[serde(rename = "circle")]
    Circle,
    /// Imported states without an explicit shape draw as rounded rectangles.
    #[default]
    #[serde(rename = "roundrect", alias = "rect", alias = "roundRect")]
    RoundedRect,
}

impl NodeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeShape::Circle => "circle",
            NodeShape::RoundedRect => "roundrect",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "circle" => Some(NodeShape::Circle),
            "roundrect" | "roundRect" | "rect" => Some(NodeShape::RoundedRect),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub fill_color: Color,
    pub border_color: Color,
    pub text_color: Color,
    pub font_size: f64,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill_color: Color::rgb8(0xB3, 0xCD, 0xE4),
            border_color: Color::rgb8(0x01, 0x4F, 0x9C),
            text_color: Color::rgb8(0x01, 0x4F, 0x9C),
            font_size: 12.0,
        }
    }
}

/// Transition styling.
///
/// `Default` holds the values used when an imported transition omits a field;
/// [`EdgeStyle::created`] holds the lighter look of transitions drawn by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub line_color: Color,
    pub line_width: f64,
    pub text_color: Color,
    pub font_size: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            line_color: Color::rgb8(0x01, 0x4F, 0x9C),
            line_width: 2.0,
            text_color: Color::rgb8(0x01, 0x4F, 0x9C),
            font_size: 12.0,
        }
    }
}

impl EdgeStyle {
    pub fn created() -> Self {
        Self {
            line_color: Color::rgb8(0x5D, 0x5D, 0x5D),
            line_width: 1.2,
            text_color: Color::rgb8(0x33, 0x33, 0x33),
            font_size: 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub text_color: Color,
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_color: Color::rgb8(0x01, 0x4F, 0x9C),
            font_size: 14.0,
        }
    }
}

// ─── Custom properties ───────────────────────────────────────────────────

/// A user-defined property value shown in the property editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// User-defined key/values; ordered so exports are deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

// ─── Elements ────────────────────────────────────────────────────────────

/// A state.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// May contain `\n`; each line is drawn separately.
    pub label: String,
    pub shape: NodeShape,
    pub style: NodeStyle,
    pub properties: Properties,
    pub selected: bool,
}

impl Node {
    /// A hand-placed state: circle, default size and palette.
    pub fn new(id: ElementId, x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            width: DEFAULT_NODE_SIZE,
            height: DEFAULT_NODE_SIZE,
            label: label.into(),
            shape: NodeShape::Circle,
            style: NodeStyle::default(),
            properties: Properties::new(),
            selected: false,
        }
    }
}

/// A transition between two states.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    pub label: String,
    /// Cached `[source center, target center]`, kept current by the model.
    pub points: [(f64, f64); 2],
    pub style: EdgeStyle,
    pub properties: Properties,
    pub selected: bool,
}

impl Edge {
    pub fn new(id: ElementId, source: ElementId, target: ElementId) -> Self {
        Self {
            id,
            source,
            target,
            label: String::new(),
            points: [(0.0, 0.0); 2],
            style: EdgeStyle::created(),
            properties: Properties::new(),
            selected: false,
        }
    }
}

/// Free-floating text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub style: TextStyle,
    pub selected: bool,
}

impl TextAnnotation {
    pub fn new(id: ElementId, x: f64, y: f64, content: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            content: content.into(),
            style: TextStyle::default(),
            selected: false,
        }
    }
}

/// What an element annotation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    State(ElementId),
    Transition(ElementId),
}

impl AnnotationTarget {
    pub fn id(&self) -> ElementId {
        match self {
            AnnotationTarget::State(id) | AnnotationTarget::Transition(id) => *id,
        }
    }

    /// Wire type tag.
    pub fn tag(&self) -> &'static str {
        match self {
            AnnotationTarget::State(_) => "stateDescription",
            AnnotationTarget::Transition(_) => "transitionDescription",
        }
    }

    /// Build a target from a wire type tag and element id.
    pub fn from_tag(tag: &str, id: ElementId) -> Option<Self> {
        match tag {
            "stateDescription" => Some(AnnotationTarget::State(id)),
            "transitionDescription" => Some(AnnotationTarget::Transition(id)),
            _ => None,
        }
    }

    /// The element this target points at.
    pub fn element(&self) -> ElementRef {
        match *self {
            AnnotationTarget::State(id) => ElementRef::Node(id),
            AnnotationTarget::Transition(id) => ElementRef::Edge(id),
        }
    }
}

/// Panel ordering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOrder {
    pub row: u32,
    pub col: u32,
}

/// A descriptive note attached to a state or transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAnnotation {
    pub id: ElementId,
    pub target: AnnotationTarget,
    pub title: String,
    pub content: String,
    pub order: DisplayOrder,
}

// ─── Element references ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Edge,
    Text,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Node => "state",
            ElementKind::Edge => "transition",
            ElementKind::Text => "text",
        })
    }
}

/// A typed handle to one element of the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Node(ElementId),
    Edge(ElementId),
    Text(ElementId),
}

impl ElementRef {
    pub fn id(&self) -> ElementId {
        match self {
            ElementRef::Node(id) | ElementRef::Edge(id) | ElementRef::Text(id) => *id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Node(_) => ElementKind::Node,
            ElementRef::Edge(_) => ElementKind::Edge,
            ElementRef::Text(_) => ElementKind::Text,
        }
    }

    /// States and texts can be dragged; transitions follow their states.
    pub fn is_draggable(&self) -> bool {
        !matches!(self, ElementRef::Edge(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#b3cde4").unwrap();
        assert_eq!(c.to_hex(), "#B3CDE4");
        assert_eq!(Color::from_hex(&c.to_hex()), Some(c));

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9);
    }

    #[test]
    fn color_short_forms() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("f00f").map(|c| c.to_hex()), Some("#FF0000".into()));
        assert_eq!(Color::from_hex("white"), None);
        assert_eq!(Color::from_hex("#12345"), None);
    }

    #[test]
    fn property_values_keep_their_json_type() {
        let bag: Properties = serde_json::from_str(r#"{"initial":true,"timeout":30,"note":"x"}"#).unwrap();
        assert_eq!(bag["initial"], PropertyValue::Bool(true));
        assert_eq!(bag["timeout"], PropertyValue::Number(30.0));
        assert_eq!(bag["note"], PropertyValue::Text("x".into()));
    }

    #[test]
    fn annotation_tags() {
        let id = ElementId::intern("s_1");
        let target = AnnotationTarget::from_tag("stateDescription", id).unwrap();
        assert_eq!(target, AnnotationTarget::State(id));
        assert_eq!(target.tag(), "stateDescription");
        assert_eq!(target.element(), ElementRef::Node(id));
        assert!(AnnotationTarget::from_tag("note", id).is_none());
    }
}
