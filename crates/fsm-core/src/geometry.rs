//! Geometric queries on diagram elements.
//!
//! Pure functions over the model: centers, containment, boundary points and
//! distances. Hit testing and painting both build on these.

use crate::model::{Edge, Node, NodeShape, TextAnnotation};
use kurbo::{Circle, Line, ParamCurveNearest, Point, Rect, Shape, Vec2};

/// Corner radius used for rounded-rectangle states.
pub const CORNER_RADIUS: f64 = 5.0;

impl Node {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Radius of the circle drawn for `NodeShape::Circle`.
    pub fn radius(&self) -> f64 {
        self.width / 2.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Whether `p` falls inside the state's outline.
    pub fn contains(&self, p: Point) -> bool {
        match self.shape {
            NodeShape::Circle => self.center().distance(p) <= self.radius(),
            NodeShape::RoundedRect => {
                let b = self.bounds();
                p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
            }
        }
    }

    /// Where the ray from the center toward `toward` leaves the outline.
    ///
    /// Falls back to the center when `toward` coincides with it.
    pub fn boundary_toward(&self, toward: Point) -> Point {
        let c = self.center();
        let d = toward - c;
        let len = d.hypot();
        if len < f64::EPSILON {
            return c;
        }
        match self.shape {
            NodeShape::Circle => c + d * (self.radius() / len),
            NodeShape::RoundedRect => {
                let (hw, hh) = (self.width / 2.0, self.height / 2.0);
                let tx = if d.x.abs() > f64::EPSILON { hw / d.x.abs() } else { f64::INFINITY };
                let ty = if d.y.abs() > f64::EPSILON { hh / d.y.abs() } else { f64::INFINITY };
                c + d * tx.min(ty)
            }
        }
    }

    /// Outline as a path, for painting.
    pub fn outline(&self) -> kurbo::BezPath {
        match self.shape {
            NodeShape::Circle => Circle::new(self.center(), self.radius()).to_path(0.1),
            NodeShape::RoundedRect => self
                .bounds()
                .to_rounded_rect(CORNER_RADIUS.min(self.width / 2.0).min(self.height / 2.0))
                .to_path(0.1),
        }
    }
}

impl Edge {
    pub fn start(&self) -> Point {
        Point::from(self.points[0])
    }

    pub fn end(&self) -> Point {
        Point::from(self.points[1])
    }

    pub fn line(&self) -> Line {
        Line::new(self.start(), self.end())
    }

    /// Label anchor and the point used by midpoint hit testing.
    pub fn midpoint(&self) -> Point {
        self.start().midpoint(self.end())
    }

    /// Shortest distance from `p` to the straight segment.
    pub fn distance_to(&self, p: Point) -> f64 {
        let line = self.line();
        if line.p0.distance(line.p1) < f64::EPSILON {
            return line.p0.distance(p);
        }
        line.nearest(p, 1e-6).distance_sq.sqrt()
    }
}

impl TextAnnotation {
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Box covering the glyphs, given the measured advance width.
    /// The anchor sits on the baseline, so the box extends upward.
    pub fn bounds(&self, text_width: f64) -> Rect {
        Rect::new(
            self.x,
            self.y - self.style.font_size,
            self.x + text_width,
            self.y,
        )
    }
}

/// Unit direction from `from` to `to`, or zero for coincident points.
pub fn direction(from: Point, to: Point) -> Vec2 {
    let d = to - from;
    let len = d.hypot();
    if len < f64::EPSILON { Vec2::ZERO } else { d / len }
}

/// Endpoints cached on an edge: the centers of its two states.
pub fn edge_points(source: &Node, target: &Node) -> [(f64, f64); 2] {
    let (a, b) = (source.center(), target.center());
    [(a.x, a.y), (b.x, b.y)]
}
