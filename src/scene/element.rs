use kurbo::{Point, Rect, Vec2};

use crate::foundation::core::Rgba8;
use crate::scene::layout::Layout;
use crate::scene::text::TextBlock;

/// Stroke style. Widths are device pixels and are not scaled by the camera.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Rgba8,
    /// Stroke width in device pixels.
    pub width_px: f64,
}

impl StrokeStyle {
    /// Stroke with `color` and a width in device pixels.
    pub fn new(color: Rgba8, width_px: f64) -> Self {
        Self { color, width_px }
    }
}

/// Geometric payload of an element, in absolute world coordinates.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle, optionally rounded.
    Rect {
        /// Center point.
        center: Point,
        /// Width in world units.
        width: f64,
        /// Height in world units.
        height: f64,
        /// Corner radius in world units (0 for sharp corners).
        corner_radius: f64,
    },
    /// Straight segment.
    Line {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
    },
    /// Straight arrow with a filled triangular tip at `end`.
    Arrow {
        /// Tail point.
        start: Point,
        /// Tip point.
        end: Point,
        /// Tip length in world units.
        tip_length: f64,
    },
    /// Curly brace spanning `start..end`, bulging perpendicular to the span
    /// (to the clockwise side of `end - start`).
    Brace {
        /// First anchor point.
        start: Point,
        /// Second anchor point.
        end: Point,
        /// Bulge depth in world units.
        depth: f64,
    },
    /// Monospace text centered on `center`.
    Text {
        /// Text content and metrics.
        block: TextBlock,
        /// Center of the text block.
        center: Point,
    },
}

/// One visual primitive: a shape plus stroke/fill styling.
///
/// Elements are created once per scene, positioned with [`Layout`] ops, and
/// never mutated after the scene is handed to the compiler.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Element {
    /// Stable name used in timeline dumps and error messages.
    pub name: String,
    /// Geometry.
    pub shape: Shape,
    /// Outline style, if stroked.
    pub stroke: Option<StrokeStyle>,
    /// Solid fill, if filled. Arrow tips fill with the stroke color instead.
    pub fill: Option<Rgba8>,
}

impl Element {
    /// Rectangle of `width` x `height` centered on the origin.
    pub fn rect(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Rect {
                center: Point::ZERO,
                width,
                height,
                corner_radius: 0.0,
            },
            stroke: None,
            fill: None,
        }
    }

    /// Straight line between two points.
    pub fn line(name: impl Into<String>, start: Point, end: Point) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Line { start, end },
            stroke: None,
            fill: None,
        }
    }

    /// Arrow from `start` to `end` with the tip at `end`.
    pub fn arrow(name: impl Into<String>, start: Point, end: Point, tip_length: f64) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Arrow {
                start,
                end,
                tip_length,
            },
            stroke: None,
            fill: None,
        }
    }

    /// Curly brace between two points, bulging to the clockwise side of
    /// `end - start` (left-to-right span bulges downward).
    pub fn brace(name: impl Into<String>, start: Point, end: Point, depth: f64) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Brace { start, end, depth },
            stroke: None,
            fill: None,
        }
    }

    /// Text block centered on the origin.
    pub fn text(name: impl Into<String>, block: TextBlock) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Text {
                block,
                center: Point::ZERO,
            },
            stroke: None,
            fill: None,
        }
    }

    /// Set the corner radius (rects only; ignored otherwise).
    pub fn rounded(mut self, radius: f64) -> Self {
        if let Shape::Rect { corner_radius, .. } = &mut self.shape {
            *corner_radius = radius;
        }
        self
    }

    /// Set the stroke style.
    pub fn stroked(mut self, color: Rgba8, width_px: f64) -> Self {
        self.stroke = Some(StrokeStyle::new(color, width_px));
        self
    }

    /// Set a solid fill.
    pub fn filled(mut self, color: Rgba8) -> Self {
        self.fill = Some(color);
        self
    }

    /// Direction of the brace bulge / arrow tip, where meaningful.
    pub(crate) fn brace_normal(start: Point, end: Point) -> Vec2 {
        let span = end - start;
        let len = span.hypot();
        if len == 0.0 {
            return Vec2::ZERO;
        }
        // Clockwise perpendicular in y-up space.
        Vec2::new(span.y / len, -span.x / len)
    }
}

impl Layout for Element {
    fn bbox(&self) -> Rect {
        match &self.shape {
            Shape::Rect {
                center,
                width,
                height,
                ..
            } => Rect::new(
                center.x - width / 2.0,
                center.y - height / 2.0,
                center.x + width / 2.0,
                center.y + height / 2.0,
            ),
            Shape::Line { start, end } => Rect::from_points(*start, *end),
            Shape::Arrow { start, end, .. } => Rect::from_points(*start, *end),
            Shape::Brace { start, end, depth } => {
                let normal = Self::brace_normal(*start, *end);
                let mid = start.midpoint(*end) + normal * *depth;
                Rect::from_points(*start, *end).union_pt(mid)
            }
            Shape::Text { block, center } => Rect::new(
                center.x - block.width() / 2.0,
                center.y - block.height() / 2.0,
                center.x + block.width() / 2.0,
                center.y + block.height() / 2.0,
            ),
        }
    }

    fn translate_by(&mut self, delta: Vec2) {
        match &mut self.shape {
            Shape::Rect { center, .. } | Shape::Text { center, .. } => *center += delta,
            Shape::Line { start, end }
            | Shape::Arrow { start, end, .. }
            | Shape::Brace { start, end, .. } => {
                *start += delta;
                *end += delta;
            }
        }
    }

    fn scale_about(&mut self, factor: f64, about: Point) {
        let scale_pt = |p: Point| about + (p - about) * factor;
        match &mut self.shape {
            Shape::Rect {
                center,
                width,
                height,
                corner_radius,
            } => {
                *center = scale_pt(*center);
                *width *= factor;
                *height *= factor;
                *corner_radius *= factor;
            }
            Shape::Line { start, end } => {
                *start = scale_pt(*start);
                *end = scale_pt(*end);
            }
            Shape::Arrow {
                start,
                end,
                tip_length,
            } => {
                *start = scale_pt(*start);
                *end = scale_pt(*end);
                *tip_length *= factor;
            }
            Shape::Brace { start, end, depth } => {
                *start = scale_pt(*start);
                *end = scale_pt(*end);
                *depth *= factor;
            }
            Shape::Text { block, center } => {
                *center = scale_pt(*center);
                block.em *= factor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::layout::Dir;

    const INK: Rgba8 = Rgba8::rgb(0, 0, 0);

    #[test]
    fn rect_bbox_is_centered() {
        let r = Element::rect("r", 3.6, 4.5).move_to(Point::new(1.8, 0.0));
        let b = r.bbox();
        assert_eq!(b.center(), Point::new(1.8, 0.0));
        assert!((b.width() - 3.6).abs() < 1e-12);
        assert!((b.height() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn text_bbox_tracks_metrics() {
        let t = Element::text("t", TextBlock::line("EBP", 0.4, INK));
        let b = t.bbox();
        assert!((b.width() - 3.0 * 0.6 * 0.4).abs() < 1e-12);
        assert!((b.height() - 1.25 * 0.4).abs() < 1e-12);
    }

    #[test]
    fn scaling_text_scales_em() {
        let t = Element::text("t", TextBlock::line("EBP", 0.4, INK)).scale(0.5);
        let Shape::Text { block, .. } = &t.shape else {
            panic!("expected text shape");
        };
        assert!((block.em - 0.2).abs() < 1e-12);
    }

    #[test]
    fn arrow_endpoints_translate_together() {
        let a = Element::arrow("a", Point::new(0.0, 1.0), Point::new(0.0, -1.0), 0.2)
            .shift(Vec2::new(2.0, 0.0));
        let Shape::Arrow { start, end, .. } = a.shape else {
            panic!("expected arrow shape");
        };
        assert_eq!(start, Point::new(2.0, 1.0));
        assert_eq!(end, Point::new(2.0, -1.0));
    }

    #[test]
    fn horizontal_brace_bulges_downward() {
        let b = Element::brace("b", Point::new(-0.9, 0.0), Point::new(0.9, 0.0), 0.25);
        let bb = b.bbox();
        assert!((bb.min_y() - -0.25).abs() < 1e-12);
        assert!((bb.max_y() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn label_next_to_cell_touches_gap() {
        let cell = Element::rect("cell", 3.6, 0.5).move_to(Point::new(0.0, 1.0));
        let label = Element::text("lbl", TextBlock::line("Parameters", 0.33, INK)).next_to(
            cell.bbox(),
            Dir::Left,
            0.35,
        );
        assert!((label.bbox().max_x() - (cell.bbox().min_x() - 0.35)).abs() < 1e-12);
        assert!((label.center().y - 1.0).abs() < 1e-12);
    }
}
