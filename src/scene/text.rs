use crate::foundation::core::Rgba8;
use crate::foundation::error::{StackshowError, StackshowResult};

/// Horizontal advance per column, as a fraction of the em size.
///
/// Layout-time extents use fixed monospace ratios instead of querying font
/// files, so positions are deterministic and testable without font IO. The
/// raster backend centers the shaped glyphs inside the measured block and the
/// panel padding absorbs the residual difference.
pub const MONO_ADVANCE_EM: f64 = 0.6;

/// Default baseline-to-baseline distance as a multiple of the em size.
pub const DEFAULT_LINE_ADVANCE_EM: f64 = 1.25;

/// Font weight selector; maps to the regular/bold font files at raster time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FontWeight {
    /// Regular weight.
    Regular,
    /// Bold weight.
    Bold,
}

/// Horizontal alignment of lines within a multi-line block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextAlign {
    /// Lines share a left edge (code listings).
    Left,
    /// Lines are centered (labels, titles).
    Center,
}

/// A block of verbatim monospace text with deterministic extents.
///
/// Content is never reflowed; embedded indentation and comment characters are
/// part of the visual content.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextBlock {
    /// Lines, rendered verbatim top to bottom.
    pub lines: Vec<String>,
    /// Em size in world units.
    pub em: f64,
    /// Baseline-to-baseline distance as a multiple of `em`.
    pub line_advance: f64,
    /// Text color.
    pub color: Rgba8,
    /// Weight selector.
    pub weight: FontWeight,
    /// Line alignment.
    pub align: TextAlign,
}

impl TextBlock {
    /// Build a block from `\n`-separated text. A single trailing newline is
    /// not a line of its own.
    pub fn new(text: &str, em: f64, color: Rgba8) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
        if lines.last().is_some_and(|l| l.is_empty()) && lines.len() > 1 {
            lines.pop();
        }
        Self {
            lines,
            em,
            line_advance: DEFAULT_LINE_ADVANCE_EM,
            color,
            weight: FontWeight::Regular,
            align: TextAlign::Center,
        }
    }

    /// Single-line label.
    pub fn line(text: &str, em: f64, color: Rgba8) -> Self {
        Self::new(text, em, color)
    }

    /// Use the bold font file.
    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    /// Left-align lines (code listings).
    pub fn left_aligned(mut self) -> Self {
        self.align = TextAlign::Left;
        self
    }

    /// Override the baseline-to-baseline multiple.
    pub fn line_advance(mut self, advance: f64) -> Self {
        self.line_advance = advance;
        self
    }

    /// Number of columns in the widest line.
    pub fn max_cols(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }

    /// Block width in world units.
    pub fn width(&self) -> f64 {
        self.max_cols() as f64 * MONO_ADVANCE_EM * self.em
    }

    /// Block height in world units.
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_advance * self.em
    }

    /// Rescale the em size so the block is exactly `width` units wide.
    pub fn set_width(mut self, width: f64) -> StackshowResult<Self> {
        let cols = self.max_cols();
        if cols == 0 {
            return Err(StackshowError::validation(
                "cannot set width of an empty text block",
            ));
        }
        if !(width.is_finite() && width > 0.0) {
            return Err(StackshowError::validation(
                "text block width must be finite and > 0",
            ));
        }
        self.em = width / (cols as f64 * MONO_ADVANCE_EM);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba8 = Rgba8::rgb(0, 0, 0);

    #[test]
    fn extents_follow_mono_metrics() {
        let block = TextBlock::new("push    ebp\nret", 0.4, INK);
        assert_eq!(block.lines.len(), 2);
        assert_eq!(block.max_cols(), 11);
        assert!((block.width() - 11.0 * 0.6 * 0.4).abs() < 1e-12);
        assert!((block.height() - 2.0 * 1.25 * 0.4).abs() < 1e-12);
    }

    #[test]
    fn trailing_newline_is_not_a_line() {
        let block = TextBlock::new("leave\nret\n", 0.3, INK);
        assert_eq!(block.lines, vec!["leave".to_owned(), "ret".to_owned()]);
    }

    #[test]
    fn height_grows_linearly_with_line_count() {
        let two = TextBlock::new("a\nb", 0.36, INK);
        let nine = TextBlock::new("a\nb\nc\nd\ne\nf\ng\nh\ni", 0.36, INK);
        let delta = nine.height() - two.height();
        assert!((delta - 7.0 * DEFAULT_LINE_ADVANCE_EM * 0.36).abs() < 1e-12);
    }

    #[test]
    fn set_width_rescales_em() {
        let block = TextBlock::new("0123456789", 1.0, INK).set_width(3.0).unwrap();
        assert!((block.width() - 3.0).abs() < 1e-12);
        assert!((block.em - 0.5).abs() < 1e-12);
        assert!(TextBlock::new("", 1.0, INK).set_width(3.0).is_err());
    }

    #[test]
    fn unicode_counts_as_one_column() {
        let block = TextBlock::line("addresses decrease ↓", 0.33, INK);
        assert_eq!(block.max_cols(), 20);
    }
}
