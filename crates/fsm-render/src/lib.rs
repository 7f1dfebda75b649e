pub mod display_list;
pub mod hit;
pub mod paint;
pub mod svg;

pub use display_list::{DisplayList, DrawCommand};
pub use hit::{ApproxTextMeasure, EDGE_HIT_THRESHOLD, EdgeHitMode, HitOptions, TextMeasure, locate, locate_node};
pub use paint::{Overlay, Palette, Stroke, Surface, TextAlign, TextBaseline, TextRun, render};
pub use svg::{SvgSurface, render_svg};
