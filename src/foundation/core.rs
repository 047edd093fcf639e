use crate::foundation::error::{StackshowError, StackshowResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Height of the visible world frame in scene units.
///
/// The world coordinate system is y-up with the origin at the canvas center;
/// the visible frame is always exactly this tall, and `FRAME_HEIGHT * aspect`
/// wide. All element geometry and text sizes are expressed in these units.
pub const FRAME_HEIGHT: f64 = 8.0;

/// Absolute 0-based frame index in timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> StackshowResult<Self> {
        if start.0 > end.0 {
            return Err(StackshowError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> StackshowResult<Self> {
        if den == 0 {
            return Err(StackshowError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StackshowError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Convert seconds to a frame count, rounding to the nearest frame.
    ///
    /// Rounding (rather than flooring) keeps step boundaries stable for the
    /// short sub-second durations scene directors use (0.4 s at 30 fps is
    /// exactly 12 frames, not 11).
    pub fn secs_to_frames(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Width/height ratio.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Width of the visible world frame in scene units.
    pub fn frame_width(self) -> f64 {
        FRAME_HEIGHT * self.aspect()
    }

    /// The visible world frame as a y-up rect centered on the origin.
    pub fn frame_rect(self) -> Rect {
        let fw = self.frame_width();
        Rect::new(-fw / 2.0, -FRAME_HEIGHT / 2.0, fw / 2.0, FRAME_HEIGHT / 2.0)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (straight, not premultiplied).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a `#rrggbb` or `#rrggbbaa` hex string.
    pub fn from_hex(s: &str) -> StackshowResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return Err(StackshowError::validation(format!(
                "invalid hex color '{s}'"
            )));
        }
        let parse = |i: usize| -> StackshowResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| StackshowError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self {
                r: parse(0)?,
                g: parse(2)?,
                b: parse(4)?,
                a: 255,
            }),
            8 => Ok(Self {
                r: parse(0)?,
                g: parse(2)?,
                b: parse(4)?,
                a: parse(6)?,
            }),
            _ => Err(StackshowError::validation(format!(
                "hex color '{s}' must have 6 or 8 digits"
            ))),
        }
    }

    /// Return this color with its alpha scaled by `factor` in `[0, 1]`.
    pub fn with_alpha_factor(self, factor: f64) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            a: (f64::from(self.a) * f).round() as u8,
            ..self
        }
    }

    /// Straight RGBA8 as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_range_rejects_inverted_bounds() {
        assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
        let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
        assert_eq!(r.len_frames(), 3);
        assert!(r.contains(FrameIndex(2)));
        assert!(r.contains(FrameIndex(4)));
        assert!(!r.contains(FrameIndex(5)));
    }

    #[test]
    fn fps_round_trips_step_durations() {
        let fps = Fps::new(30, 1).unwrap();
        assert_eq!(fps.secs_to_frames(0.4), 12);
        assert_eq!(fps.secs_to_frames(1.0), 30);
        assert_eq!(fps.secs_to_frames(1.8), 54);
        assert!((fps.frames_to_secs(12) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn fps_rejects_zero() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(30, 0).is_err());
    }

    #[test]
    fn canvas_world_frame_is_eight_units_tall() {
        let canvas = Canvas {
            width: 1280,
            height: 720,
        };
        let frame = canvas.frame_rect();
        assert!((frame.height() - 8.0).abs() < 1e-12);
        assert!((frame.width() - 8.0 * 1280.0 / 720.0).abs() < 1e-12);
        assert_eq!(frame.center(), Point::new(0.0, 0.0));
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(
            Rgba8::from_hex("#0b0e10").unwrap(),
            Rgba8::rgb(0x0b, 0x0e, 0x10)
        );
        assert_eq!(
            Rgba8::from_hex("151a1fff").unwrap(),
            Rgba8::rgb(0x15, 0x1a, 0x1f)
        );
        assert!(Rgba8::from_hex("#abc").is_err());
        assert!(Rgba8::from_hex("#zzzzzz").is_err());
    }
}
