use kurbo::{Point, Rect, Vec2};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StackshowError, StackshowResult};
use crate::scene::element::{Element, StrokeStyle};
use crate::scene::group::Group;
use crate::scene::layout::{Dir, Layout};
use crate::scene::text::TextBlock;

/// Background styling for a framed panel.
#[derive(Clone, Copy, Debug)]
pub struct PanelFrame {
    /// Background fill.
    pub fill: Rgba8,
    /// Background outline.
    pub stroke: StrokeStyle,
    /// Background corner radius in world units.
    pub corner_radius: f64,
}

/// Layout and styling knobs shared by both panel variants.
#[derive(Clone, Copy, Debug)]
pub struct PanelStyle {
    /// Code em size in world units; overridden by `target_width` if set.
    pub code_em: f64,
    /// If set, rescale the code block to exactly this width.
    pub target_width: Option<f64>,
    /// Baseline-to-baseline distance as a multiple of the em size.
    pub line_advance: f64,
    /// Horizontal/vertical padding between text and background edges.
    pub padding: Vec2,
    /// Title em size in world units.
    pub title_em: f64,
    /// Gap between the title and the panel body.
    pub title_buff: f64,
    /// Code color.
    pub code_color: Rgba8,
    /// Title color.
    pub title_color: Rgba8,
    /// Render the title with the bold font.
    pub title_bold: bool,
}

/// A bordered (or bare), titled box containing a verbatim block of source or
/// assembly text.
///
/// The background is a deterministic function of the text extents and the
/// padding constants: it always encloses the text bbox plus `padding` on each
/// side, so a longer listing yields a taller panel.
#[derive(Clone, Debug)]
pub struct CodePanel {
    background: Option<Element>,
    code: Element,
    title: Element,
}

impl CodePanel {
    /// Panel with a rounded background behind the code.
    pub fn framed(
        name: &str,
        source: &str,
        title: &str,
        style: &PanelStyle,
        frame: PanelFrame,
    ) -> StackshowResult<Self> {
        let code = Self::code_element(name, source, style)?;
        let text_bbox = code.bbox();

        let background = Element::rect(
            format!("{name}.bg"),
            text_bbox.width() + 2.0 * style.padding.x,
            text_bbox.height() + 2.0 * style.padding.y,
        )
        .rounded(frame.corner_radius)
        .filled(frame.fill)
        .stroked(frame.stroke.color, frame.stroke.width_px)
        .move_to(text_bbox.center());

        let title = Self::title_element(name, title, style, background.bbox());
        Ok(Self {
            background: Some(background),
            code,
            title,
        })
    }

    /// Title + text only, no background (the second script's variant).
    pub fn bare(name: &str, source: &str, title: &str, style: &PanelStyle) -> StackshowResult<Self> {
        let code = Self::code_element(name, source, style)?;
        let title = Self::title_element(name, title, style, code.bbox());
        Ok(Self {
            background: None,
            code,
            title,
        })
    }

    fn code_element(name: &str, source: &str, style: &PanelStyle) -> StackshowResult<Element> {
        if source.trim().is_empty() {
            return Err(StackshowError::validation(format!(
                "panel '{name}' has no code"
            )));
        }
        let mut block = TextBlock::new(source, style.code_em, style.code_color)
            .left_aligned()
            .line_advance(style.line_advance);
        if let Some(w) = style.target_width {
            block = block.set_width(w)?;
        }
        Ok(Element::text(format!("{name}.code"), block))
    }

    fn title_element(name: &str, title: &str, style: &PanelStyle, body: Rect) -> Element {
        let mut block = TextBlock::line(title, style.title_em, style.title_color);
        if style.title_bold {
            block = block.bold();
        }
        Element::text(format!("{name}.title"), block)
            .next_to(body, Dir::Up, style.title_buff)
            .align_to(body, Dir::Left)
    }

    /// Background element, if framed.
    pub fn background(&self) -> Option<&Element> {
        self.background.as_ref()
    }

    /// The code block element.
    pub fn code(&self) -> &Element {
        &self.code
    }

    /// The title element.
    pub fn title(&self) -> &Element {
        &self.title
    }

    /// Bounding box of the panel body (background if framed, code otherwise).
    pub fn body_bbox(&self) -> Rect {
        match &self.background {
            Some(bg) => bg.bbox(),
            None => self.code.bbox(),
        }
    }

    /// Flatten into a group (background, code, title).
    pub fn into_group(self) -> Group {
        let mut g = Group::new();
        if let Some(bg) = self.background {
            g.push(bg);
        }
        g.push(self.code);
        g.push(self.title);
        g
    }
}

impl Layout for CodePanel {
    fn bbox(&self) -> Rect {
        let mut acc = self.code.bbox().union(self.title.bbox());
        if let Some(bg) = &self.background {
            acc = acc.union(bg.bbox());
        }
        acc
    }

    fn translate_by(&mut self, delta: Vec2) {
        if let Some(bg) = &mut self.background {
            bg.translate_by(delta);
        }
        self.code.translate_by(delta);
        self.title.translate_by(delta);
    }

    fn scale_about(&mut self, factor: f64, center: Point) {
        if let Some(bg) = &mut self.background {
            bg.scale_about(factor, center);
        }
        self.code.scale_about(factor, center);
        self.title.scale_about(factor, center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FG: Rgba8 = Rgba8::rgb(255, 255, 255);
    const MUTED: Rgba8 = Rgba8::rgb(0xbb, 0xbb, 0xbb);

    fn style() -> PanelStyle {
        PanelStyle {
            code_em: 0.2,
            target_width: None,
            line_advance: 1.25,
            padding: Vec2::new(0.25, 0.25),
            title_em: 0.3,
            title_buff: 0.18,
            code_color: FG,
            title_color: MUTED,
            title_bold: false,
        }
    }

    fn frame() -> PanelFrame {
        PanelFrame {
            fill: Rgba8::rgb(0x15, 0x1a, 0x1f),
            stroke: StrokeStyle::new(Rgba8::rgb(0x44, 0x44, 0x44), 1.5),
            corner_radius: 0.08,
        }
    }

    #[test]
    fn background_encloses_text_plus_padding() {
        let p = CodePanel::framed("cpp", "int c;\nreturn c;", "C++", &style(), frame()).unwrap();
        let bg = p.background().unwrap().bbox();
        let code = p.code().bbox();
        assert!((bg.width() - (code.width() + 0.5)).abs() < 1e-12);
        assert!((bg.height() - (code.height() + 0.5)).abs() < 1e-12);
        assert_eq!(bg.center(), code.center());
        assert!(bg.width() >= code.width() + 2.0 * 0.25);
        assert!(bg.height() >= code.height() + 2.0 * 0.25);
    }

    #[test]
    fn panel_grows_with_the_listing() {
        let s = style();
        let two = CodePanel::framed("p", "a\nb", "t", &s, frame()).unwrap();
        let nine = CodePanel::framed("p", "a\nb\nc\nd\ne\nf\ng\nh\ni", "t", &s, frame()).unwrap();
        let delta = nine.background().unwrap().bbox().height()
            - two.background().unwrap().bbox().height();
        assert!((delta - 7.0 * s.line_advance * s.code_em).abs() < 1e-12);
    }

    #[test]
    fn title_sits_above_the_top_left_corner() {
        let p = CodePanel::framed("asm", "push    ebp\nret", "Assembly", &style(), frame())
            .unwrap();
        let bg = p.background().unwrap().bbox();
        let title = p.title().bbox();
        assert!((title.min_y() - (bg.max_y() + 0.18)).abs() < 1e-12);
        assert!((title.min_x() - bg.min_x()).abs() < 1e-12);
    }

    #[test]
    fn bare_panel_anchors_title_to_the_code() {
        let p = CodePanel::bare("asm", "push    ebp", "Assembly", &style()).unwrap();
        assert!(p.background().is_none());
        let code = p.code().bbox();
        let title = p.title().bbox();
        assert!((title.min_y() - (code.max_y() + 0.18)).abs() < 1e-12);
        assert!((title.min_x() - code.min_x()).abs() < 1e-12);
    }

    #[test]
    fn target_width_pins_the_code_width() {
        let mut s = style();
        s.target_width = Some(5.2);
        let p = CodePanel::framed("p", "mov     ebp, esp\nleave\nret", "t", &s, frame()).unwrap();
        assert!((p.code().bbox().width() - 5.2).abs() < 1e-12);
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(CodePanel::framed("p", "   \n  ", "t", &style(), frame()).is_err());
    }

    #[test]
    fn moving_the_panel_keeps_title_offset() {
        let p = CodePanel::framed("p", "a\nb", "t", &style(), frame()).unwrap();
        let before = p.title().bbox().min_y() - p.body_bbox().max_y();
        let p = p.shift(Vec2::new(-3.0, 0.4));
        let after = p.title().bbox().min_y() - p.body_bbox().max_y();
        assert!((before - after).abs() < 1e-12);
    }
}
