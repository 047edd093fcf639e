//! Stackshow renders short educational animations about x86 stack-frame
//! layout: geometric stack diagrams, verbatim code panels and timed entrance
//! animations, rasterized on the CPU and encoded through the system `ffmpeg`.
//!
//! # Pipeline overview
//!
//! 1. **Direct**: a scene director builds elements with relative layout ops
//!    and scripts `play`/`wait` steps ([`Scene`])
//! 2. **Compile**: seconds become frame windows ([`compile`] -> [`Timeline`])
//! 3. **Render**: each frame is rasterized by the CPU backend
//!    ([`CpuRenderer`] -> [`FrameRGBA`])
//! 4. **Encode** (optional): frames stream to the system `ffmpeg` binary for
//!    MP4 output ([`FfmpegSink`])
//!
//! Everything is deterministic: identical inputs produce identical timelines
//! and identical pixels.
#![forbid(unsafe_code)]

pub mod animation;
pub mod compile;
pub mod diagram;
pub mod encode;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod scenes;

pub use animation::ease::Ease;
pub use animation::entrance::{EntranceKind, EntranceState};
pub use compile::timeline::{Cue, Timeline, compile};
pub use diagram::panel::{CodePanel, PanelFrame, PanelStyle};
pub use diagram::stack::{StackDiagram, StackSpec};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use encode::sink::{FrameSink, InMemorySink, PngDirSink, SinkConfig};
pub use foundation::core::{Canvas, FRAME_HEIGHT, Fps, FrameIndex, FrameRange, Rgba8};
pub use foundation::error::{StackshowError, StackshowResult};
pub use render::camera::Camera;
pub use render::cpu::{CpuRenderer, CpuRendererOpts, FontSpec, FrameRGBA};
pub use render::pipeline::{RenderStats, render_frame, render_range};
pub use scene::element::{Element, Shape, StrokeStyle};
pub use scene::group::Group;
pub use scene::layout::{Dir, Layout};
pub use scene::scene::{ElementId, Entrance, Scene};
pub use scene::text::{FontWeight, TextAlign, TextBlock};
