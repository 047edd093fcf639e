use kurbo::{Point, Rect, Vec2};

use crate::scene::element::Element;
use crate::scene::layout::Layout;

/// Ordered composite of elements manipulated as one unit.
///
/// Translating or scaling a group applies the same rigid transform to every
/// member, so relative offsets between members are preserved.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Group {
    elements: Vec<Element>,
}

impl Group {
    /// Empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one element.
    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Append all elements of `other`, preserving order.
    pub fn extend(&mut self, other: Group) {
        self.elements.extend(other.elements);
    }

    /// Number of member elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Return `true` when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Borrow the members in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Consume into the member list.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

impl From<Vec<Element>> for Group {
    fn from(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

impl Layout for Group {
    /// Union of member bboxes. An empty group degenerates to a zero rect at
    /// the origin.
    fn bbox(&self) -> Rect {
        let mut iter = self.elements.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(first.bbox(), |acc, el| acc.union(el.bbox()))
    }

    fn translate_by(&mut self, delta: Vec2) {
        for el in &mut self.elements {
            el.translate_by(delta);
        }
    }

    fn scale_about(&mut self, factor: f64, center: Point) {
        for el in &mut self.elements {
            el.scale_about(factor, center);
        }
    }
}
