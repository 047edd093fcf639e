use kurbo::Vec2;

use crate::animation::ease::Ease;
use crate::foundation::core::{FrameIndex, FrameRange};

/// How an element is revealed by its entrance step.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum EntranceKind {
    /// Opacity 0 -> 1 while sliding in by `shift` (world units).
    ///
    /// The element starts at `position - shift` and lands on its final
    /// position, matching the original scripts' `FadeIn(..., shift=...)`.
    FadeIn {
        /// Slide-in offset; the zero vector gives a plain fade.
        shift: Vec2,
    },
    /// Progressive draw of stroked geometry, front to back by arclength.
    Create,
}

/// Per-frame visibility state of an element with an entrance window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntranceState {
    /// Opacity multiplier in `[0, 1]`.
    pub alpha: f64,
    /// World-space offset to apply to the element's geometry.
    pub offset: Vec2,
    /// Draw progress in `[0, 1]`; only `Create` reveals partially.
    pub progress: f64,
}

impl EntranceState {
    /// Fully settled state (entrance finished or element never animated).
    pub fn settled() -> Self {
        Self {
            alpha: 1.0,
            offset: Vec2::ZERO,
            progress: 1.0,
        }
    }

    /// Fully hidden state (entrance not yet started).
    pub fn hidden() -> Self {
        Self {
            alpha: 0.0,
            offset: Vec2::ZERO,
            progress: 0.0,
        }
    }
}

/// Sample an entrance at `frame`.
///
/// Within the window, progress runs over `[0, 1]` so the final frame of the
/// window shows the fully revealed element.
pub fn sample(kind: EntranceKind, window: FrameRange, ease: Ease, frame: FrameIndex) -> EntranceState {
    if frame.0 < window.start.0 {
        return EntranceState::hidden();
    }
    if frame.0 >= window.end.0 {
        return EntranceState::settled();
    }

    let len = window.len_frames();
    let t = if len <= 1 {
        1.0
    } else {
        (frame.0 - window.start.0) as f64 / (len - 1) as f64
    };
    let e = ease.apply(t);

    match kind {
        EntranceKind::FadeIn { shift } => EntranceState {
            alpha: e,
            offset: shift * (e - 1.0),
            progress: 1.0,
        },
        EntranceKind::Create => EntranceState {
            alpha: 1.0,
            offset: Vec2::ZERO,
            progress: e,
        },
    }
}
