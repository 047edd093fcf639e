use std::collections::HashMap;

use crate::animation::ease::Ease;
use crate::animation::entrance::{self, EntranceKind, EntranceState};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8};
use crate::foundation::error::{StackshowError, StackshowResult};
use crate::scene::element::Element;
use crate::scene::scene::{Scene, StepKind};

/// All entrances ride the same smooth ease-in/out ramp.
const ENTRANCE_EASE: Ease = Ease::InOutCubic;

/// Resolved entrance of one element.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Enter {
    /// Frames during which the entrance runs.
    pub window: FrameRange,
    /// Reveal style.
    pub kind: EntranceKind,
    /// Easing applied to entrance progress.
    pub ease: Ease,
}

/// One element with its resolved visibility window.
///
/// Cues are ordered by scene insertion order, which is also the paint order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Cue {
    /// The element to draw.
    pub element: Element,
    /// Entrance window; `None` means visible from frame 0.
    pub enter: Option<Enter>,
}

impl Cue {
    /// Visibility state of this cue at `frame`.
    pub fn state_at(&self, frame: FrameIndex) -> EntranceState {
        match self.enter {
            None => EntranceState::settled(),
            Some(enter) => entrance::sample(enter.kind, enter.window, enter.ease, frame),
        }
    }
}

/// A compiled scene: fixed canvas, fps, duration and per-element cues.
///
/// Compilation is pure; the same scene and fps always produce an identical
/// timeline.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Scene name.
    pub name: String,
    /// Output canvas in pixels.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Background clear color.
    pub background: Rgba8,
    /// Total frame count.
    pub duration: FrameIndex,
    /// Elements in paint order.
    pub cues: Vec<Cue>,
}

impl Timeline {
    /// Full timeline range `[0, duration)`.
    pub fn full_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: self.duration,
        }
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.duration.0)
    }
}

/// Resolve a scene's scripted steps into per-element frame windows.
pub fn compile(scene: &Scene, fps: Fps) -> StackshowResult<Timeline> {
    if scene.canvas.width == 0 || scene.canvas.height == 0 {
        return Err(StackshowError::validation("canvas width/height must be > 0"));
    }
    if scene.steps.is_empty() {
        return Err(StackshowError::timeline(format!(
            "scene '{}' has no steps",
            scene.name
        )));
    }

    let mut enters: HashMap<usize, Enter> = HashMap::new();
    let mut cursor: u64 = 0;

    for (step_idx, step) in scene.steps.iter().enumerate() {
        if !step.secs.is_finite() || step.secs <= 0.0 {
            return Err(StackshowError::timeline(format!(
                "step {step_idx} of scene '{}' has non-positive duration",
                scene.name
            )));
        }
        // A sub-frame duration still occupies one frame.
        let frames = fps.secs_to_frames(step.secs).max(1);
        let step_end = cursor + frames;

        if let StepKind::Play(entrances) = &step.kind {
            for entrance in entrances {
                if entrance.targets.is_empty() {
                    return Err(StackshowError::timeline(format!(
                        "step {step_idx} of scene '{}' has an entrance with no targets",
                        scene.name
                    )));
                }
                if !(0.0..1.0).contains(&entrance.lag_ratio) {
                    return Err(StackshowError::timeline(format!(
                        "step {step_idx} of scene '{}' has lag_ratio outside [0, 1)",
                        scene.name
                    )));
                }
                for (i, id) in entrance.targets.iter().enumerate() {
                    let Some(element) = scene.element(*id) else {
                        return Err(StackshowError::timeline(format!(
                            "step {step_idx} of scene '{}' targets unknown element id {}",
                            scene.name, id.0
                        )));
                    };
                    if enters.contains_key(&id.0) {
                        return Err(StackshowError::timeline(format!(
                            "element '{}' has more than one entrance",
                            element.name
                        )));
                    }
                    let lag = (i as f64 * entrance.lag_ratio * frames as f64).floor() as u64;
                    let start = (cursor + lag).min(step_end - 1);
                    enters.insert(
                        id.0,
                        Enter {
                            window: FrameRange {
                                start: FrameIndex(start),
                                end: FrameIndex(step_end),
                            },
                            kind: entrance.kind,
                            ease: ENTRANCE_EASE,
                        },
                    );
                }
            }
        }

        cursor = step_end;
    }

    let cues = scene
        .elements
        .iter()
        .enumerate()
        .map(|(idx, element)| Cue {
            element: element.clone(),
            enter: enters.get(&idx).copied(),
        })
        .collect();

    tracing::debug!(scene = %scene.name, frames = cursor, "compiled timeline");

    Ok(Timeline {
        name: scene.name.clone(),
        canvas: scene.canvas,
        fps,
        background: scene.background,
        duration: FrameIndex(cursor),
        cues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::element::Element;
    use crate::scene::scene::{ElementId, Entrance};
    use kurbo::Vec2;

    fn canvas() -> Canvas {
        Canvas {
            width: 1280,
            height: 720,
        }
    }

    fn fps30() -> Fps {
        Fps::new(30, 1).unwrap()
    }

    fn scene_with(n: usize) -> (Scene, Vec<ElementId>) {
        let mut scene = Scene::new("t", canvas(), Rgba8::rgb(0, 0, 0));
        let ids = (0..n)
            .map(|i| scene.add(Element::rect(format!("r{i}"), 1.0, 1.0)))
            .collect();
        (scene, ids)
    }

    #[test]
    fn steps_map_to_frame_windows() {
        let (mut scene, ids) = scene_with(2);
        scene.play(vec![Entrance::fade_in(vec![ids[0]], Vec2::ZERO)], 0.6);
        scene.play(vec![Entrance::create(ids[1])], 0.8);
        scene.wait(1.0);

        let tl = compile(&scene, fps30()).unwrap();
        assert_eq!(tl.duration, FrameIndex(18 + 24 + 30));

        let w0 = tl.cues[0].enter.unwrap().window;
        assert_eq!((w0.start, w0.end), (FrameIndex(0), FrameIndex(18)));
        let w1 = tl.cues[1].enter.unwrap().window;
        assert_eq!((w1.start, w1.end), (FrameIndex(18), FrameIndex(42)));
    }

    #[test]
    fn lag_ratio_staggers_starts_not_ends() {
        let (mut scene, ids) = scene_with(3);
        scene.play(
            vec![Entrance::fade_in_lagged(ids.clone(), Vec2::ZERO, 0.1)],
            1.0,
        );
        let tl = compile(&scene, fps30()).unwrap();

        let windows: Vec<FrameRange> = tl.cues.iter().map(|c| c.enter.unwrap().window).collect();
        assert_eq!(windows[0].start, FrameIndex(0));
        assert_eq!(windows[1].start, FrameIndex(3));
        assert_eq!(windows[2].start, FrameIndex(6));
        assert!(windows.iter().all(|w| w.end == FrameIndex(30)));
    }

    #[test]
    fn untargeted_elements_are_visible_from_frame_zero() {
        let (mut scene, ids) = scene_with(2);
        scene.play(vec![Entrance::create(ids[1])], 0.5);
        let tl = compile(&scene, fps30()).unwrap();
        assert!(tl.cues[0].enter.is_none());
        assert_eq!(
            tl.cues[0].state_at(FrameIndex(0)),
            EntranceState::settled()
        );
    }

    #[test]
    fn double_entrance_is_rejected() {
        let (mut scene, ids) = scene_with(1);
        scene.play(vec![Entrance::fade_in(vec![ids[0]], Vec2::ZERO)], 0.5);
        scene.play(vec![Entrance::create(ids[0])], 0.5);
        let err = compile(&scene, fps30()).unwrap_err();
        assert!(err.to_string().contains("more than one entrance"));
    }

    #[test]
    fn unknown_target_is_rejected() {
        let (mut scene, _) = scene_with(1);
        let mut foreign = Scene::new("other", canvas(), Rgba8::rgb(0, 0, 0));
        let f0 = foreign.add(Element::rect("f0", 1.0, 1.0));
        let f1 = foreign.add(Element::rect("f1", 1.0, 1.0));
        let _ = f0;
        scene.play(vec![Entrance::create(f1)], 0.5);
        assert!(compile(&scene, fps30()).is_err());
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        let (mut scene, ids) = scene_with(1);
        scene.play(vec![Entrance::create(ids[0])], 0.0);
        assert!(compile(&scene, fps30()).is_err());

        let (mut scene, _) = scene_with(1);
        scene.wait(f64::NAN);
        assert!(compile(&scene, fps30()).is_err());
    }

    #[test]
    fn empty_scene_is_rejected() {
        let (scene, _) = scene_with(1);
        assert!(compile(&scene, fps30()).is_err());
    }

    #[test]
    fn compilation_is_deterministic() {
        let build = || {
            let (mut scene, ids) = scene_with(3);
            scene.play(
                vec![Entrance::fade_in_lagged(ids, Vec2::new(0.0, 0.2), 0.03)],
                0.9,
            );
            scene.wait(1.0);
            compile(&scene, fps30()).unwrap()
        };
        let a = serde_json::to_string(&build()).unwrap();
        let b = serde_json::to_string(&build()).unwrap();
        assert_eq!(a, b);
    }
}
