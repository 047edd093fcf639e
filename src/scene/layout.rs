use kurbo::{Point, Rect, Vec2};

/// Axis-aligned direction in y-up world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Dir {
    /// Toward the top of the frame (+y).
    Up,
    /// Toward the bottom of the frame (-y).
    Down,
    /// Toward the left edge (-x).
    Left,
    /// Toward the right edge (+x).
    Right,
}

impl Dir {
    /// Unit vector for this direction.
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, 1.0),
            Self::Down => Vec2::new(0.0, -1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Signed distance from the origin to `rect`'s edge in direction `dir`.
fn edge_coord(rect: Rect, dir: Dir) -> f64 {
    match dir {
        Dir::Up => rect.max_y(),
        Dir::Down => rect.min_y(),
        Dir::Left => rect.min_x(),
        Dir::Right => rect.max_x(),
    }
}

/// Relative-positioning vocabulary shared by elements, groups and diagram
/// builders.
///
/// Implementors provide a bounding box and rigid transforms; everything else
/// is derived. All provided combinators consume and return `Self` so call
/// sites read as placement chains, mirroring the declarative layout style of
/// the scene directors. Positions are always expressed relative to a
/// previously placed bbox (or the frame rect for top-level anchors), never as
/// raw screen coordinates.
pub trait Layout: Sized {
    /// Bounding box in world units (y-up).
    fn bbox(&self) -> Rect;

    /// Move by `delta`.
    fn translate_by(&mut self, delta: Vec2);

    /// Uniformly scale geometry by `factor` about `center`.
    fn scale_about(&mut self, factor: f64, center: Point);

    /// Center of the bounding box.
    fn center(&self) -> Point {
        self.bbox().center()
    }

    /// Midpoint of the bbox edge facing `dir`.
    fn edge_point(&self, dir: Dir) -> Point {
        let b = self.bbox();
        let c = b.center();
        match dir {
            Dir::Up => Point::new(c.x, b.max_y()),
            Dir::Down => Point::new(c.x, b.min_y()),
            Dir::Left => Point::new(b.min_x(), c.y),
            Dir::Right => Point::new(b.max_x(), c.y),
        }
    }

    /// Move so the bbox center lands on `target`.
    fn move_to(mut self, target: Point) -> Self {
        let delta = target - self.center();
        self.translate_by(delta);
        self
    }

    /// Shift by `delta`.
    fn shift(mut self, delta: Vec2) -> Self {
        self.translate_by(delta);
        self
    }

    /// Place adjacent to `anchor` in direction `dir` with gap `buff`,
    /// centered along the orthogonal axis.
    fn next_to(mut self, anchor: Rect, dir: Dir, buff: f64) -> Self {
        let own = self.bbox();
        let anchor_center = anchor.center();
        let delta = if dir.is_horizontal() {
            let target_edge = edge_coord(anchor, dir) + dir.unit().x * buff;
            let own_edge = edge_coord(own, opposite(dir));
            Vec2::new(target_edge - own_edge, anchor_center.y - own.center().y)
        } else {
            let target_edge = edge_coord(anchor, dir) + dir.unit().y * buff;
            let own_edge = edge_coord(own, opposite(dir));
            Vec2::new(anchor_center.x - own.center().x, target_edge - own_edge)
        };
        self.translate_by(delta);
        self
    }

    /// Move along one axis so the bbox sits `buff` inside `frame`'s edge in
    /// direction `dir`. The other axis is unchanged.
    fn to_edge(mut self, frame: Rect, dir: Dir, buff: f64) -> Self {
        let own = self.bbox();
        let target = edge_coord(frame, dir) - dir.unit().x * buff - dir.unit().y * buff;
        let delta = match dir {
            Dir::Left | Dir::Right => Vec2::new(target - edge_coord(own, dir), 0.0),
            Dir::Up | Dir::Down => Vec2::new(0.0, target - edge_coord(own, dir)),
        };
        self.translate_by(delta);
        self
    }

    /// Move along one axis so this bbox's `dir` edge coincides with
    /// `anchor`'s `dir` edge.
    fn align_to(mut self, anchor: Rect, dir: Dir) -> Self {
        let own = self.bbox();
        let delta = edge_coord(anchor, dir) - edge_coord(own, dir);
        let delta = if dir.is_horizontal() {
            Vec2::new(delta, 0.0)
        } else {
            Vec2::new(0.0, delta)
        };
        self.translate_by(delta);
        self
    }

    /// Move so the bbox center's x coordinate equals `x`.
    fn set_x(mut self, x: f64) -> Self {
        let delta = Vec2::new(x - self.center().x, 0.0);
        self.translate_by(delta);
        self
    }

    /// Move so the bbox center's y coordinate equals `y`.
    fn set_y(mut self, y: f64) -> Self {
        let delta = Vec2::new(0.0, y - self.center().y);
        self.translate_by(delta);
        self
    }

    /// Uniformly scale about the current center.
    fn scale(mut self, factor: f64) -> Self {
        let center = self.center();
        self.scale_about(factor, center);
        self
    }
}

fn opposite(dir: Dir) -> Dir {
    match dir {
        Dir::Up => Dir::Down,
        Dir::Down => Dir::Up,
        Dir::Left => Dir::Right,
        Dir::Right => Dir::Left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal Layout implementor for exercising the provided combinators.
    #[derive(Clone, Debug)]
    struct Box2 {
        rect: Rect,
    }

    impl Box2 {
        fn new(w: f64, h: f64) -> Self {
            Self {
                rect: Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0),
            }
        }
    }

    impl Layout for Box2 {
        fn bbox(&self) -> Rect {
            self.rect
        }

        fn translate_by(&mut self, delta: Vec2) {
            self.rect = self.rect + delta;
        }

        fn scale_about(&mut self, factor: f64, center: Point) {
            let scale_pt = |p: Point| center + (p - center) * factor;
            let p0 = scale_pt(Point::new(self.rect.min_x(), self.rect.min_y()));
            let p1 = scale_pt(Point::new(self.rect.max_x(), self.rect.max_y()));
            self.rect = Rect::from_points(p0, p1);
        }
    }

    #[test]
    fn move_to_centers_on_target() {
        let b = Box2::new(2.0, 1.0).move_to(Point::new(3.0, -2.0));
        assert_eq!(b.center(), Point::new(3.0, -2.0));
        assert_eq!(b.bbox().width(), 2.0);
    }

    #[test]
    fn next_to_left_leaves_a_gap_and_centers_vertically() {
        let anchor = Rect::new(0.0, -1.0, 4.0, 1.0);
        let b = Box2::new(2.0, 0.5).move_to(Point::new(9.0, 9.0)).next_to(
            anchor,
            Dir::Left,
            0.35,
        );
        assert!((b.bbox().max_x() - (0.0 - 0.35)).abs() < 1e-12);
        assert!((b.center().y - 0.0).abs() < 1e-12);
    }

    #[test]
    fn next_to_up_sits_above() {
        let anchor = Rect::new(-1.0, -1.0, 1.0, 1.0);
        let b = Box2::new(1.0, 0.3).next_to(anchor, Dir::Up, 0.15);
        assert!((b.bbox().min_y() - 1.15).abs() < 1e-12);
        assert!((b.center().x - 0.0).abs() < 1e-12);
    }

    #[test]
    fn to_edge_only_moves_one_axis() {
        let frame = Rect::new(-7.0, -4.0, 7.0, 4.0);
        let b = Box2::new(2.0, 1.0)
            .move_to(Point::new(1.0, 2.0))
            .to_edge(frame, Dir::Left, 0.5);
        assert!((b.bbox().min_x() - -6.5).abs() < 1e-12);
        assert!((b.center().y - 2.0).abs() < 1e-12);

        let t = Box2::new(2.0, 1.0)
            .move_to(Point::new(1.0, 2.0))
            .to_edge(frame, Dir::Up, 0.4);
        assert!((t.bbox().max_y() - 3.6).abs() < 1e-12);
        assert!((t.center().x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn align_to_matches_edges() {
        let anchor = Rect::new(-3.0, 0.0, 3.0, 2.0);
        let b = Box2::new(1.0, 1.0).move_to(Point::new(5.0, 5.0)).align_to(anchor, Dir::Left);
        assert!((b.bbox().min_x() - -3.0).abs() < 1e-12);
        assert!((b.center().y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn scale_preserves_center() {
        let b = Box2::new(2.0, 1.0).move_to(Point::new(1.0, 1.0)).scale(0.5);
        assert_eq!(b.center(), Point::new(1.0, 1.0));
        assert!((b.bbox().width() - 1.0).abs() < 1e-12);
    }
}
