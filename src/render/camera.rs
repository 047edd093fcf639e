use kurbo::{Point, Rect};

use crate::foundation::core::{Canvas, FRAME_HEIGHT};

/// Mapping from y-up world units to y-down device pixels.
///
/// The world frame is always [`FRAME_HEIGHT`] units tall regardless of canvas
/// resolution, so the same scene renders identically at 720p and 1080p up to
/// pixel scale.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    canvas: Canvas,
    px_per_unit: f64,
}

impl Camera {
    /// Camera for a canvas.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            px_per_unit: f64::from(canvas.height) / FRAME_HEIGHT,
        }
    }

    /// Pixels per world unit.
    pub fn px_per_unit(&self) -> f64 {
        self.px_per_unit
    }

    /// World point to pixel point (origin top-left, y down).
    pub fn to_px_point(&self, p: Point) -> Point {
        let fw = self.canvas.frame_width();
        Point::new(
            (p.x + fw / 2.0) * self.px_per_unit,
            (FRAME_HEIGHT / 2.0 - p.y) * self.px_per_unit,
        )
    }

    /// World length to pixel length.
    pub fn to_px_len(&self, units: f64) -> f64 {
        units * self.px_per_unit
    }

    /// World rect to pixel rect.
    pub fn to_px_rect(&self, r: Rect) -> Rect {
        let a = self.to_px_point(Point::new(r.min_x(), r.max_y()));
        let b = self.to_px_point(Point::new(r.max_x(), r.min_y()));
        Rect::from_points(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Canvas {
            width: 1280,
            height: 720,
        })
    }

    #[test]
    fn origin_maps_to_canvas_center() {
        let c = camera();
        let p = c.to_px_point(Point::ZERO);
        assert!((p.x - 640.0).abs() < 1e-9);
        assert!((p.y - 360.0).abs() < 1e-9);
    }

    #[test]
    fn y_axis_flips() {
        let c = camera();
        let top = c.to_px_point(Point::new(0.0, 4.0));
        assert!((top.y - 0.0).abs() < 1e-9);
        let bottom = c.to_px_point(Point::new(0.0, -4.0));
        assert!((bottom.y - 720.0).abs() < 1e-9);
    }

    #[test]
    fn rect_mapping_preserves_area_scale() {
        let c = camera();
        let r = c.to_px_rect(Rect::new(-1.0, -1.0, 1.0, 1.0));
        assert!((r.width() - 180.0).abs() < 1e-9);
        assert!((r.height() - 180.0).abs() < 1e-9);
        assert!(r.min_y() < r.max_y());
    }

    #[test]
    fn px_per_unit_scales_with_resolution() {
        let hd = Camera::new(Canvas {
            width: 1920,
            height: 1080,
        });
        assert!((hd.px_per_unit() - 135.0).abs() < 1e-9);
        assert!((camera().px_per_unit() - 90.0).abs() < 1e-9);
    }
}
