//! Pan/zoom transform between screen space and content space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level shown as "100%" in the toolbar.
pub const BASE_ZOOM: f64 = 1.0;

/// View transform applied to the diagram's content layer.
///
/// Entities store their positions in content space; pointer events arrive in
/// screen space. The camera converts between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen-space translation of the content origin.
    pub offset: Vec2,
    /// Current scale factor.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with explicit zoom limits.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Content-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-content transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_content(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn content_to_screen(&self, content_point: Point) -> Point {
        self.transform() * content_point
    }

    /// Convert a screen-space distance (e.g. a hit tolerance in pixels) to
    /// content units at the current zoom.
    pub fn screen_distance_to_content(&self, distance: f64) -> f64 {
        distance / self.zoom
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping `screen_point` fixed on screen.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_content(screen_point);
        self.zoom = new_zoom;
        let moved = self.content_to_screen(anchor);
        self.offset += screen_point - moved;
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = BASE_ZOOM;
    }

    /// Frame `bounds` inside a viewport of the given size.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let usable = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale_x = usable.width / bounds.width();
        let scale_y = usable.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let center = bounds.center();
        self.offset = Vec2::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_by_default() {
        let camera = Camera::new();
        let p = Point::new(40.0, 70.0);
        assert_eq!(camera.screen_to_content(p), p);
    }

    #[test]
    fn test_pan_shifts_content() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(25.0, -10.0));
        let content = camera.screen_to_content(Point::new(125.0, 90.0));
        assert!((content.x - 100.0).abs() < f64::EPSILON);
        assert!((content.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(30.0, 15.0));
        let anchor = Point::new(200.0, 150.0);
        let before = camera.screen_to_content(anchor);

        camera.zoom_at(anchor, 2.0);

        let after = camera.screen_to_content(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::with_limits(0.5, 4.0);
        camera.zoom_at(Point::ZERO, 0.01);
        assert!((camera.zoom - 0.5).abs() < f64::EPSILON);
        camera.zoom_at(Point::ZERO, 100.0);
        assert!((camera.zoom - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_distance_scales_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        assert!((camera.screen_distance_to_content(12.0) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut camera = Camera::new();
        let bounds = Rect::new(0.0, 0.0, 400.0, 200.0);
        camera.fit_to_bounds(bounds, Size::new(800.0, 600.0), 0.0);

        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
        let center = camera.content_to_screen(bounds.center());
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }
}
