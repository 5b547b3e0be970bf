//! Pixel-space geometry primitives
//!
//! All coordinates are display pixels on the current image or frame.
//! Functions here are pure and never fail.

use serde::{Deserialize, Serialize};

/// Point in display pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Segment being drawn by a drag; `end` is `None` until the pointer moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Option<Point>,
}

impl Segment {
    /// Start a segment anchored at `start`
    pub fn anchored(start: Point) -> Self {
        Self { start, end: None }
    }

    /// Create a completed segment
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end: Some(end) }
    }

    /// Pixel length, or `None` while the end is still open
    pub fn length(&self) -> Option<f64> {
        self.end.map(|end| distance(self.start, end))
    }

    /// Midpoint, used to anchor a label next to the segment
    pub fn midpoint(&self) -> Option<Point> {
        self.end.map(|end| self.start.midpoint(&end))
    }

    pub fn is_complete(&self) -> bool {
        self.end.is_some()
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Area of a closed polygon using the shoelace formula.
///
/// Vertices are taken in order and the last one connects back to the first.
/// The winding direction is discarded, so the result is never negative.
/// Callers must pass at least three vertices; shorter inputs yield `0.0`.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x * points[j].y;
        twice_area -= points[j].x * points[i].y;
    }

    twice_area.abs() / 2.0
}

/// Vertex average, used to place an area label inside the outline
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Some(Point::new(sum_x / n, sum_y / n))
}
