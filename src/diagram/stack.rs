use kurbo::{Point, Rect, Vec2};

use crate::foundation::error::{StackshowError, StackshowResult};
use crate::scene::element::{Element, StrokeStyle};
use crate::scene::group::Group;
use crate::scene::layout::{Dir, Layout};
use crate::scene::text::TextBlock;

/// Construction parameters for a stack diagram.
#[derive(Clone, Copy, Debug)]
pub struct StackSpec {
    /// Number of cells, top to bottom.
    pub rows: usize,
    /// Cell width in world units.
    pub cell_w: f64,
    /// Cell height in world units.
    pub cell_h: f64,
    /// Outer frame stroke.
    pub frame_stroke: StrokeStyle,
    /// Per-cell grid stroke.
    pub cell_stroke: StrokeStyle,
}

/// The visual stack: an outer frame subdivided into equal fixed-height cells,
/// with labels attached at specific cell indices.
///
/// Cell index 0 is the topmost cell (highest address); addresses decrease
/// toward the bottom, which is where the stack grows.
#[derive(Clone, Debug)]
pub struct StackDiagram {
    spec: StackSpec,
    frame: Element,
    cells: Vec<Element>,
    labels: Vec<Element>,
}

impl StackDiagram {
    /// Build a diagram centered on the origin.
    pub fn build(spec: StackSpec) -> StackshowResult<Self> {
        if spec.rows == 0 {
            return Err(StackshowError::validation("stack diagram needs rows > 0"));
        }
        if spec.cell_w <= 0.0 || spec.cell_h <= 0.0 {
            return Err(StackshowError::validation(
                "stack cell dimensions must be > 0",
            ));
        }

        let height = spec.rows as f64 * spec.cell_h;
        let frame = Element::rect("stack.frame", spec.cell_w, height)
            .stroked(spec.frame_stroke.color, spec.frame_stroke.width_px);

        let top = height / 2.0;
        let cells = (0..spec.rows)
            .map(|i| {
                let center_y = top - (i as f64 + 0.5) * spec.cell_h;
                Element::rect(format!("stack.cell{i}"), spec.cell_w, spec.cell_h)
                    .stroked(spec.cell_stroke.color, spec.cell_stroke.width_px)
                    .move_to(Point::new(0.0, center_y))
            })
            .collect();

        Ok(Self {
            spec,
            frame,
            cells,
            labels: Vec::new(),
        })
    }

    /// Number of cells.
    pub fn rows(&self) -> usize {
        self.spec.rows
    }

    /// Bounding box of the outer frame (labels excluded).
    pub fn frame_bbox(&self) -> Rect {
        self.frame.bbox()
    }

    /// Bounding box of the cell at `idx`.
    pub fn cell_bbox(&self, idx: usize) -> StackshowResult<Rect> {
        self.cells
            .get(idx)
            .map(Layout::bbox)
            .ok_or_else(|| self.bad_index(idx))
    }

    /// Put a value label in the middle of cell `idx`.
    pub fn label_cell(&mut self, idx: usize, block: TextBlock) -> StackshowResult<()> {
        let cell = self.cell_bbox(idx)?;
        let name = format!("stack.value{idx}");
        self.labels
            .push(Element::text(name, block).move_to(cell.center()));
        Ok(())
    }

    /// Put an annotation beside cell `idx`, `buff` units away on `side`.
    pub fn annotate_cell(
        &mut self,
        idx: usize,
        block: TextBlock,
        side: Dir,
        buff: f64,
    ) -> StackshowResult<()> {
        let cell = self.cell_bbox(idx)?;
        let name = format!("stack.note{idx}");
        self.labels
            .push(Element::text(name, block).next_to(cell, side, buff));
        Ok(())
    }

    /// A "High memory" / "Low memory" style marker above or below the frame.
    ///
    /// Returned rather than stored so directors can stage its entrance
    /// separately from the diagram body.
    pub fn memory_marker(&self, block: TextBlock, side: Dir, buff: f64) -> Element {
        let name = match side {
            Dir::Up => "stack.high".to_owned(),
            _ => "stack.low".to_owned(),
        };
        Element::text(name, block).next_to(self.frame_bbox(), side, buff)
    }

    /// The growth-direction arrow: straight down the middle of the frame,
    /// overshooting the top and bottom edges. Addresses decrease along it.
    pub fn address_arrow(
        &self,
        overshoot_top: f64,
        overshoot_bottom: f64,
        stroke: StrokeStyle,
        tip_length: f64,
    ) -> Element {
        let frame = self.frame_bbox();
        let x = frame.center().x;
        let start = Point::new(x, frame.max_y() + overshoot_top);
        let end = Point::new(x, frame.min_y() - overshoot_bottom);
        Element::arrow("stack.grow", start, end, tip_length)
            .stroked(stroke.color, stroke.width_px)
    }

    /// Flatten into a group (frame first, cells, then labels).
    pub fn into_group(self) -> Group {
        let mut g = Group::new();
        g.push(self.frame);
        for cell in self.cells {
            g.push(cell);
        }
        for label in self.labels {
            g.push(label);
        }
        g
    }

    fn bad_index(&self, idx: usize) -> StackshowError {
        StackshowError::validation(format!(
            "cell index {idx} out of range for {} rows",
            self.spec.rows
        ))
    }
}

impl Layout for StackDiagram {
    fn bbox(&self) -> Rect {
        let mut acc = self.frame.bbox();
        for el in self.cells.iter().chain(&self.labels) {
            acc = acc.union(el.bbox());
        }
        acc
    }

    fn translate_by(&mut self, delta: Vec2) {
        self.frame.translate_by(delta);
        for el in self.cells.iter_mut().chain(&mut self.labels) {
            el.translate_by(delta);
        }
    }

    fn scale_about(&mut self, factor: f64, center: Point) {
        self.frame.scale_about(factor, center);
        for el in self.cells.iter_mut().chain(&mut self.labels) {
            el.scale_about(factor, center);
        }
    }
}
