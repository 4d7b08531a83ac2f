//! Geometry primitives shared by the scene, the hit-tester and the controller.
//!
//! Points and sizes are Slint's logical types so values can be handed to
//! `.slint` components without conversion. All scene coordinates are logical
//! units; node-local coordinates have their origin at the node's top-left
//! corner, socket-local coordinates at the socket anchor.

use slint::{LogicalPosition, LogicalSize};

/// A point in logical coordinates.
pub type Point = LogicalPosition;

/// A size in logical coordinates.
pub type Size = LogicalSize;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// `p + (dx, dy)`
pub fn offset(p: Point, dx: f32, dy: f32) -> Point {
    Point::new(p.x + dx, p.y + dy)
}

/// Vector from `from` to `to`.
pub fn delta(from: Point, to: Point) -> (f32, f32) {
    (to.x - from.x, to.y - from.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
        assert!(!r.contains(Point::new(9.9, 12.0)));
    }

    #[test]
    fn test_rect_translated_keeps_size() {
        let r = Rect::new(0.0, 0.0, 4.0, 3.0).translated(5.0, -2.0);
        assert_eq!(r, Rect::new(5.0, -2.0, 4.0, 3.0));
        assert_eq!(r.right(), 9.0);
        assert_eq!(r.bottom(), 1.0);
    }

    #[test]
    fn test_delta_and_offset_are_inverse() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(-1.0, 10.0);
        let (dx, dy) = delta(a, b);
        assert_eq!(offset(a, dx, dy), b);
    }
}
