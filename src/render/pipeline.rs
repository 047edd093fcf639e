use crate::compile::timeline::Timeline;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{StackshowError, StackshowResult};
use crate::render::cpu::{CpuRenderer, FrameRGBA};

/// Aggregated rendering counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames rendered and pushed to the sink.
    pub frames_rendered: u64,
}

/// Render a single timeline frame.
pub fn render_frame(
    renderer: &mut CpuRenderer,
    timeline: &Timeline,
    frame: FrameIndex,
) -> StackshowResult<FrameRGBA> {
    if !timeline.full_range().contains(frame) {
        return Err(StackshowError::validation(format!(
            "frame {} out of range (timeline has {} frames)",
            frame.0, timeline.duration.0
        )));
    }
    renderer.render_frame(timeline, frame)
}

/// Render `range` in strictly increasing order into `sink`.
///
/// The sink sees `begin`, one `push_frame` per frame, then `end`. Rendering
/// is synchronous and single-threaded; each frame blocks until the sink has
/// consumed it.
#[tracing::instrument(skip(renderer, timeline, sink), fields(scene = %timeline.name))]
pub fn render_range(
    renderer: &mut CpuRenderer,
    timeline: &Timeline,
    range: FrameRange,
    sink: &mut dyn FrameSink,
) -> StackshowResult<RenderStats> {
    if range.is_empty() {
        return Err(StackshowError::validation("render range must be non-empty"));
    }
    if range.end.0 > timeline.duration.0 {
        return Err(StackshowError::validation(
            "render range exceeds timeline duration",
        ));
    }

    sink.begin(SinkConfig {
        width: timeline.canvas.width,
        height: timeline.canvas.height,
        fps: timeline.fps,
    })?;

    let mut stats = RenderStats::default();
    for f in range.start.0..range.end.0 {
        let frame = renderer.render_frame(timeline, FrameIndex(f))?;
        sink.push_frame(FrameIndex(f), &frame)?;
        stats.frames_rendered += 1;
    }

    sink.end()?;
    tracing::debug!(frames = stats.frames_rendered, "render range complete");
    Ok(stats)
}
