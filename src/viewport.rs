//! Zoom and pan between view (widget) and scene coordinates.
//!
//! `view = scene * zoom + pan`. The scene itself is zoom/pan invariant; only
//! pointer input and painting go through this transform.

use crate::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    fn safe_zoom(&self) -> f32 {
        if self.zoom > 0.0 { self.zoom } else { 1.0 }
    }

    pub fn to_scene(&self, view: Point) -> Point {
        let z = self.safe_zoom();
        Point::new((view.x - self.pan_x) / z, (view.y - self.pan_y) / z)
    }

    pub fn to_view(&self, scene: Point) -> Point {
        let z = self.safe_zoom();
        Point::new(scene.x * z + self.pan_x, scene.y * z + self.pan_y)
    }

    /// Scene-space rectangle visible in a view of `size`.
    pub fn visible_rect(&self, size: Size) -> Rect {
        let z = self.safe_zoom();
        let origin = self.to_scene(Point::new(0.0, 0.0));
        Rect::new(origin.x, origin.y, size.width / z, size.height / z)
    }

    /// Shift the view by a view-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, clamped to the range spanned by `min`
    /// and `max` (in either order), keeping the scene point under `anchor`
    /// (view coordinates) in place.
    pub fn zoom_at(&mut self, factor: f32, anchor: Point, min: f32, max: f32) {
        let fixed = self.to_scene(anchor);
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.zoom = (self.safe_zoom() * factor).clamp(lo, hi);
        self.pan_x = anchor.x - fixed.x * self.zoom;
        self.pan_y = anchor.y - fixed.y * self.zoom;
    }

    /// Pan so that `scene` shows at the centre of a view of `size`.
    pub fn center_on(&mut self, scene: Point, size: Size) {
        let z = self.safe_zoom();
        self.pan_x = size.width / 2.0 - scene.x * z;
        self.pan_y = size.height / 2.0 - scene.y * z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_identity_by_default() {
        let vp = Viewport::default();
        assert_eq!(vp.to_scene(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
        assert_eq!(vp.to_view(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_view_scene_round_trip() {
        let vp = Viewport::new(2.0, 100.0, -50.0);
        let scene = Point::new(10.0, 20.0);
        assert_eq!(vp.to_view(scene), Point::new(120.0, -10.0));
        assert!(close(vp.to_scene(vp.to_view(scene)), scene));
    }

    #[test]
    fn test_zero_zoom_is_treated_as_one() {
        let vp = Viewport::new(0.0, 10.0, 10.0);
        assert_eq!(vp.to_scene(Point::new(20.0, 20.0)), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = Viewport::new(1.0, 30.0, 40.0);
        let anchor = Point::new(200.0, 150.0);
        let before = vp.to_scene(anchor);
        vp.zoom_at(1.25, anchor, 0.1, 10.0);
        assert_eq!(vp.zoom, 1.25);
        assert!(close(vp.to_scene(anchor), before));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = Viewport::default();
        vp.zoom_at(100.0, Point::new(0.0, 0.0), 0.1, 4.0);
        assert_eq!(vp.zoom, 4.0);
        vp.zoom_at(0.0001, Point::new(0.0, 0.0), 0.1, 4.0);
        assert_eq!(vp.zoom, 0.1);
    }

    #[test]
    fn test_reversed_zoom_range() {
        let mut vp = Viewport::default();
        vp.zoom_at(100.0, Point::new(0.0, 0.0), 4.0, 0.5);
        assert_eq!(vp.zoom, 4.0);
        vp.zoom_at(0.0001, Point::new(0.0, 0.0), 4.0, 0.5);
        assert_eq!(vp.zoom, 0.5);
    }

    #[test]
    fn test_center_on() {
        let mut vp = Viewport::default();
        vp.center_on(Point::new(350.0, 250.0), Size::new(800.0, 600.0));
        assert_eq!((vp.pan_x, vp.pan_y), (50.0, 50.0));
        assert_eq!(vp.to_scene(Point::new(400.0, 300.0)), Point::new(350.0, 250.0));
    }

    #[test]
    fn test_visible_rect() {
        let vp = Viewport::new(2.0, 0.0, 0.0);
        assert_eq!(vp.visible_rect(Size::new(800.0, 600.0)), Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_pan_by() {
        let mut vp = Viewport::default();
        vp.pan_by(5.0, -3.0);
        assert_eq!(vp.to_scene(Point::new(5.0, -3.0)), Point::new(0.0, 0.0));
    }
}
