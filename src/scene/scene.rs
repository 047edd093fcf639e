use kurbo::{Rect, Vec2};

use crate::animation::entrance::EntranceKind;
use crate::foundation::core::{Canvas, Rgba8};
use crate::scene::element::Element;
use crate::scene::group::Group;

/// Handle to an element owned by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ElementId(pub(crate) usize);

/// One entrance request inside a `play` step.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Entrance {
    /// Elements revealed by this entrance.
    pub targets: Vec<ElementId>,
    /// Reveal style.
    pub kind: EntranceKind,
    /// Stagger between consecutive targets as a fraction of the step
    /// duration. 0 reveals all targets in lockstep.
    pub lag_ratio: f64,
}

impl Entrance {
    /// Fade targets in with a slide offset.
    pub fn fade_in(targets: Vec<ElementId>, shift: Vec2) -> Self {
        Self {
            targets,
            kind: EntranceKind::FadeIn { shift },
            lag_ratio: 0.0,
        }
    }

    /// Fade targets in with a per-target stagger.
    pub fn fade_in_lagged(targets: Vec<ElementId>, shift: Vec2, lag_ratio: f64) -> Self {
        Self {
            targets,
            kind: EntranceKind::FadeIn { shift },
            lag_ratio,
        }
    }

    /// Progressively draw a stroked element.
    pub fn create(target: ElementId) -> Self {
        Self {
            targets: vec![target],
            kind: EntranceKind::Create,
            lag_ratio: 0.0,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) enum StepKind {
    Play(Vec<Entrance>),
    Wait,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct Step {
    pub(crate) kind: StepKind,
    pub(crate) secs: f64,
}

/// A complete scene: canvas, background, element store and the ordered
/// animation script.
///
/// Directors build every element up front with relative layout ops, add them
/// to the scene, then record a strictly ordered sequence of `play`/`wait`
/// steps. There is no branching and no randomness; the same director always
/// produces the same scene.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Scene name as registered with the CLI.
    pub name: String,
    /// Output canvas in pixels; fixes the world frame aspect.
    pub canvas: Canvas,
    /// Background clear color.
    pub background: Rgba8,
    pub(crate) elements: Vec<Element>,
    pub(crate) steps: Vec<Step>,
}

impl Scene {
    /// New empty scene.
    pub fn new(name: impl Into<String>, canvas: Canvas, background: Rgba8) -> Self {
        Self {
            name: name.into(),
            canvas,
            background,
            elements: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// The visible world frame (y-up, centered on the origin).
    pub fn frame(&self) -> Rect {
        self.canvas.frame_rect()
    }

    /// Add a positioned element; returns its handle.
    pub fn add(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    /// Add every member of a positioned group, in order.
    pub fn add_group(&mut self, group: Group) -> Vec<ElementId> {
        group.into_elements().into_iter().map(|el| self.add(el)).collect()
    }

    /// Borrow an element by handle.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// Number of elements added so far.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Append an animation step running `entrances` in parallel over `secs`
    /// seconds.
    pub fn play(&mut self, entrances: Vec<Entrance>, secs: f64) {
        self.steps.push(Step {
            kind: StepKind::Play(entrances),
            secs,
        });
    }

    /// Append a hold of `secs` seconds.
    pub fn wait(&mut self, secs: f64) {
        self.steps.push(Step {
            kind: StepKind::Wait,
            secs,
        });
    }

    /// Total scripted duration in seconds.
    pub fn total_secs(&self) -> f64 {
        self.steps.iter().map(|s| s.secs).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::layout::Layout as _;

    fn canvas() -> Canvas {
        Canvas {
            width: 1280,
            height: 720,
        }
    }

    #[test]
    fn add_hands_out_sequential_ids() {
        let mut scene = Scene::new("t", canvas(), Rgba8::rgb(0, 0, 0));
        let a = scene.add(Element::rect("a", 1.0, 1.0));
        let b = scene.add(Element::rect("b", 1.0, 1.0));
        assert_eq!(a, ElementId(0));
        assert_eq!(b, ElementId(1));
        assert_eq!(scene.element(b).unwrap().name, "b");
    }

    #[test]
    fn add_group_preserves_member_order() {
        let mut scene = Scene::new("t", canvas(), Rgba8::rgb(0, 0, 0));
        let mut g = Group::new();
        g.push(Element::rect("outer", 2.0, 2.0));
        g.push(Element::rect("cell", 2.0, 0.5));
        let ids = scene.add_group(g);
        assert_eq!(ids.len(), 2);
        assert_eq!(scene.element(ids[0]).unwrap().name, "outer");
        assert_eq!(scene.element(ids[1]).unwrap().name, "cell");
    }

    #[test]
    fn total_secs_sums_plays_and_waits() {
        let mut scene = Scene::new("t", canvas(), Rgba8::rgb(255, 255, 255));
        let id = scene.add(Element::rect("r", 1.0, 1.0));
        scene.play(vec![Entrance::fade_in(vec![id], Vec2::ZERO)], 0.6);
        scene.wait(1.8);
        assert!((scene.total_secs() - 2.4).abs() < 1e-12);
    }

    #[test]
    fn frame_matches_canvas_aspect() {
        let scene = Scene::new("t", canvas(), Rgba8::rgb(0, 0, 0));
        let f = scene.frame();
        assert!((f.height() - 8.0).abs() < 1e-12);
        assert!(f.width() > 14.2 && f.width() < 14.3);
        // frame() is the anchor for to_edge placement
        let title = Element::rect("title", 4.0, 0.5).to_edge(f, crate::scene::layout::Dir::Up, 0.4);
        assert!((title.bbox().max_y() - (4.0 - 0.4)).abs() < 1e-12);
    }
}
