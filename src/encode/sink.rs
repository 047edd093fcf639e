use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StackshowError, StackshowResult};
use crate::render::cpu::FrameRGBA;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing
/// `FrameIndex` order within the requested render range.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StackshowResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StackshowResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> StackshowResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StackshowResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StackshowResult<()> {
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(StackshowError::encode(
                "sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StackshowResult<()> {
        Ok(())
    }
}

/// Sink that writes each frame as `frame_NNNNN.png` inside a directory.
#[derive(Debug)]
pub struct PngDirSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
}

impl PngDirSink {
    /// Create a sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
        }
    }
}

impl FrameSink for PngDirSink {
    fn begin(&mut self, cfg: SinkConfig) -> StackshowResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            StackshowError::encode(format!(
                "failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StackshowResult<()> {
        if self.cfg.is_none() {
            return Err(StackshowError::encode("png sink not started"));
        }
        let path = self.dir.join(format!("frame_{:05}.png", idx.0));
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| StackshowError::encode(format!("write png '{}': {e}", path.display())))?;
        Ok(())
    }

    fn end(&mut self) -> StackshowResult<()> {
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32) -> FrameRGBA {
        FrameRGBA {
            width: w,
            height: h,
            data: vec![0u8; (w * h * 4) as usize],
            premultiplied: true,
        }
    }

    fn cfg() -> SinkConfig {
        SinkConfig {
            width: 4,
            height: 2,
            fps: Fps::new(30, 1).unwrap(),
        }
    }

    #[test]
    fn in_memory_sink_keeps_frames_in_order() {
        let mut sink = InMemorySink::new();
        sink.begin(cfg()).unwrap();
        sink.push_frame(FrameIndex(0), &frame(4, 2)).unwrap();
        sink.push_frame(FrameIndex(1), &frame(4, 2)).unwrap();
        sink.end().unwrap();
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.config().unwrap().width, 4);
    }

    #[test]
    fn in_memory_sink_rejects_out_of_order_frames() {
        let mut sink = InMemorySink::new();
        sink.begin(cfg()).unwrap();
        sink.push_frame(FrameIndex(5), &frame(4, 2)).unwrap();
        assert!(sink.push_frame(FrameIndex(5), &frame(4, 2)).is_err());
        assert!(sink.push_frame(FrameIndex(4), &frame(4, 2)).is_err());
    }

    #[test]
    fn begin_resets_captured_frames() {
        let mut sink = InMemorySink::new();
        sink.begin(cfg()).unwrap();
        sink.push_frame(FrameIndex(0), &frame(4, 2)).unwrap();
        sink.begin(cfg()).unwrap();
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn png_sink_requires_begin() {
        let mut sink = PngDirSink::new("target/test-png-sink-unstarted");
        assert!(sink.push_frame(FrameIndex(0), &frame(4, 2)).is_err());
    }
}
