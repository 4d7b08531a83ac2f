//! Edge curve geometry.
//!
//! Every edge is drawn as a single horizontal-biased cubic bezier. The control
//! points are pushed horizontally away from both endpoints by the same offset,
//! so the curve leaves a source to the right and enters a sink from the left.

use crate::geometry::{Point, Rect};

/// Parameters that shape an edge curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveShape {
    /// Fraction of the horizontal endpoint distance used as control offset (0..1).
    pub factor: f32,
    /// Lower bound for the control offset.
    pub min_dist: f32,
    /// Optional upper bound for the control offset. `None` means unbounded.
    pub max_dist: Option<f32>,
}

impl Default for CurveShape {
    fn default() -> Self {
        Self { factor: 0.5, min_dist: 0.0, max_dist: None }
    }
}

impl CurveShape {
    /// Horizontal control point offset for the given endpoints.
    ///
    /// `offset = max(min_dist, factor * |stop.x - start.x|)`, then clamped to
    /// `max_dist` when one is configured.
    pub fn offset(&self, start: Point, stop: Point) -> f32 {
        let dx = if start.x <= stop.x { stop.x - start.x } else { start.x - stop.x };
        let offset = self.min_dist.max(dx * self.factor);
        match self.max_dist {
            Some(max) => offset.min(max),
            None => offset,
        }
    }
}

/// Cubic bezier curve from `p0` through control points `p1`, `p2` to `p3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    /// Build the edge curve for the given endpoints.
    ///
    /// This is a pure function of its inputs: identical arguments always
    /// produce identical control points.
    pub fn from_endpoints(start: Point, stop: Point, shape: &CurveShape) -> Self {
        let offset = shape.offset(start, stop);
        CubicBezier {
            p0: start,
            p1: Point::new(start.x + offset, start.y),
            p2: Point::new(stop.x - offset, stop.y),
            p3: stop,
        }
    }

    /// Evaluate the curve at parameter `t` (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x;
        let y = mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y;

        Point::new(x, y)
    }

    /// Bounding box of the control polygon. The curve always lies inside it,
    /// which is enough for repaint regions.
    pub fn control_bounds(&self) -> Rect {
        let xs = [self.p0.x, self.p1.x, self.p2.x, self.p3.x];
        let ys = [self.p0.y, self.p1.y, self.p2.y, self.p3.y];
        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// SVG path command for this curve, as consumed by Slint's `Path` element.
    ///
    /// e.g. `"M 10 20 C 60 20 90 80 140 80"`
    pub fn to_path_commands(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: Point, a: Point, b: Point) -> f32 {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (point.x - a.x, point.y - a.y);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);
    let closest = (a.x + t * ab.0, a.y + t * ab.1);

    let dx = point.x - closest.0;
    let dy = point.y - closest.1;
    dx * dx + dy * dy
}

/// Minimum distance from a point to a cubic bezier curve.
///
/// The curve is flattened into `num_samples` segments (20 when 0 is passed).
pub fn distance_to_bezier(point: Point, bezier: &CubicBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = bezier.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = bezier.eval(t);

        let dist_sq = distance_to_line_segment_sq(point, prev_point, curr_point);
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
        }

        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
