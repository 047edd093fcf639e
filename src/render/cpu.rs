use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathSeg, Point, Shape as _, Vec2};

use crate::compile::timeline::Timeline;
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{StackshowError, StackshowResult};
use crate::render::camera::Camera;
use crate::scene::element::{Element, Shape, StrokeStyle};
use crate::scene::text::{FontWeight, TextAlign, TextBlock};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Font files used for text. Both scenes assume a monospace face;
/// proportional fonts will render but drift from the layout metrics.
#[derive(Clone, Debug)]
pub struct FontSpec {
    /// Regular weight font file.
    pub regular: PathBuf,
    /// Bold weight font file; falls back to `regular` when missing.
    pub bold: PathBuf,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::in_dir("assets/fonts")
    }
}

impl FontSpec {
    /// The conventional JetBrains Mono pair inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            regular: dir.join("JetBrainsMono-Regular.ttf"),
            bold: dir.join("JetBrainsMono-Bold.ttf"),
        }
    }
}

/// Options for [`CpuRenderer`].
#[derive(Clone, Debug, Default)]
pub struct CpuRendererOpts {
    /// Font files for text rasterization.
    pub fonts: FontSpec,
}

/// Arrow tips resolve once the progressive draw is mostly done.
const ARROW_TIP_THRESHOLD: f64 = 0.85;

/// Flattening/arclength accuracy in device pixels.
const PATH_ACCURACY: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

struct FontAsset {
    bytes: Vec<u8>,
    font: vello_cpu::peniko::FontData,
}

type LayoutKey = (String, u32, FontWeight, [u8; 4]);

/// CPU raster backend powered by `vello_cpu` for vector/text rasterization.
///
/// The renderer owns the parley contexts and a per-line layout cache; it
/// performs no IO after construction.
pub struct CpuRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    regular: FontAsset,
    bold: FontAsset,
    layout_cache: HashMap<LayoutKey, Arc<parley::Layout<TextBrush>>>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("ctx", &self.ctx.is_some())
            .field("layout_cache_len", &self.layout_cache.len())
            .finish_non_exhaustive()
    }
}

impl CpuRenderer {
    /// Load fonts and construct a renderer.
    pub fn new(opts: CpuRendererOpts) -> StackshowResult<Self> {
        let regular = load_font(&opts.fonts.regular)?;
        let bold = match load_font(&opts.fonts.bold) {
            Ok(font) => font,
            Err(_) => {
                tracing::warn!(
                    path = %opts.fonts.bold.display(),
                    "bold font not found, falling back to regular"
                );
                load_font(&opts.fonts.regular)?
            }
        };
        Ok(Self {
            ctx: None,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            regular,
            bold,
            layout_cache: HashMap::new(),
        })
    }

    /// Rasterize one timeline frame.
    pub fn render_frame(
        &mut self,
        timeline: &Timeline,
        frame: FrameIndex,
    ) -> StackshowResult<FrameRGBA> {
        let width = timeline.canvas.width;
        let height = timeline.canvas.height;
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| StackshowError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| StackshowError::render("canvas height exceeds u16"))?;

        let camera = Camera::new(timeline.canvas);

        self.with_ctx_mut(width_u16, height_u16, |this, ctx| {
            // Opaque background first; everything composites over it.
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(timeline.background, 1.0));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));

            for cue in &timeline.cues {
                let state = cue.state_at(frame);
                if state.alpha <= 0.0 {
                    continue;
                }
                this.draw_element(
                    ctx,
                    &camera,
                    &cue.element,
                    state.alpha,
                    state.offset,
                    state.progress,
                )?;
            }

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width,
                height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> StackshowResult<R>,
    ) -> StackshowResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_element(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        camera: &Camera,
        element: &Element,
        alpha: f64,
        offset: Vec2,
        progress: f64,
    ) -> StackshowResult<()> {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let layered = alpha < 1.0;
        if layered {
            ctx.push_opacity_layer(alpha as f32);
        }

        match &element.shape {
            Shape::Rect {
                center,
                width,
                height,
                corner_radius,
            } => {
                let world = kurbo::Rect::new(
                    center.x - width / 2.0 + offset.x,
                    center.y - height / 2.0 + offset.y,
                    center.x + width / 2.0 + offset.x,
                    center.y + height / 2.0 + offset.y,
                );
                let px = camera.to_px_rect(world);
                let path = if *corner_radius > 0.0 {
                    kurbo::RoundedRect::from_rect(px, camera.to_px_len(*corner_radius))
                        .to_path(PATH_ACCURACY)
                } else {
                    px.to_path(PATH_ACCURACY)
                };
                let cpu_path = bezpath_to_cpu(&path);
                if let Some(fill) = element.fill {
                    ctx.set_paint(color_to_cpu(fill, 1.0));
                    ctx.fill_path(&cpu_path);
                }
                if let Some(stroke) = element.stroke {
                    stroke_cpu_path(ctx, &cpu_path, stroke);
                }
            }
            Shape::Line { start, end } => {
                let mut path = BezPath::new();
                path.move_to(camera.to_px_point(*start + offset));
                path.line_to(camera.to_px_point(*end + offset));
                stroke_revealed(ctx, element.stroke, &path, progress);
            }
            Shape::Arrow {
                start,
                end,
                tip_length,
            } => {
                draw_arrow(
                    ctx,
                    camera,
                    element.stroke,
                    *start + offset,
                    *end + offset,
                    *tip_length,
                    progress,
                );
            }
            Shape::Brace { start, end, depth } => {
                let path = brace_path_px(camera, *start + offset, *end + offset, *depth);
                stroke_revealed(ctx, element.stroke, &path, progress);
            }
            Shape::Text { block, center } => {
                self.draw_text(ctx, camera, block, *center + offset)?;
            }
        }

        if layered {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        camera: &Camera,
        block: &TextBlock,
        center: Point,
    ) -> StackshowResult<()> {
        let size_px = (block.em * camera.px_per_unit()) as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StackshowError::render("text em must be finite and > 0"));
        }
        let line_advance_px = camera.to_px_len(block.line_advance * block.em);
        let block_w_px = camera.to_px_len(block.width());
        let block_h_px = camera.to_px_len(block.height());
        let center_px = camera.to_px_point(center);
        let top_left = Point::new(center_px.x - block_w_px / 2.0, center_px.y - block_h_px / 2.0);

        let brush = TextBrush {
            r: block.color.r,
            g: block.color.g,
            b: block.color.b,
            a: block.color.a,
        };
        let font = match block.weight {
            FontWeight::Regular => self.regular.font.clone(),
            FontWeight::Bold => self.bold.font.clone(),
        };

        for (i, line) in block.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let layout = self.line_layout(line, size_px, block.weight, brush)?;
            let line_w = f64::from(layout.width());
            let line_h = f64::from(layout.height());
            let x = match block.align {
                TextAlign::Left => top_left.x,
                TextAlign::Center => center_px.x - line_w / 2.0,
            };
            let y = top_left.y + i as f64 * line_advance_px + (line_advance_px - line_h) / 2.0;

            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let b = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn line_layout(
        &mut self,
        line: &str,
        size_px: f32,
        weight: FontWeight,
        brush: TextBrush,
    ) -> StackshowResult<Arc<parley::Layout<TextBrush>>> {
        let key = (
            line.to_owned(),
            size_px.to_bits(),
            weight,
            [brush.r, brush.g, brush.b, brush.a],
        );
        if let Some(layout) = self.layout_cache.get(&key) {
            return Ok(layout.clone());
        }

        let bytes = match weight {
            FontWeight::Regular => self.regular.bytes.clone(),
            FontWeight::Bold => self.bold.bytes.clone(),
        };
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StackshowError::render("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StackshowError::render("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, line, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(line);
        layout.break_all_lines(None);

        let layout = Arc::new(layout);
        self.layout_cache.insert(key, layout.clone());
        Ok(layout)
    }
}

fn load_font(path: &Path) -> StackshowResult<FontAsset> {
    let bytes = std::fs::read(path).map_err(|e| {
        StackshowError::render(format!("failed to read font '{}': {e}", path.display()))
    })?;
    let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.clone()), 0);
    Ok(FontAsset { bytes, font })
}

fn stroke_cpu_path(
    ctx: &mut vello_cpu::RenderContext,
    path: &vello_cpu::kurbo::BezPath,
    stroke: StrokeStyle,
) {
    ctx.set_paint(color_to_cpu(stroke.color, 1.0));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke.width_px));
    ctx.stroke_path(path);
}

fn stroke_revealed(
    ctx: &mut vello_cpu::RenderContext,
    stroke: Option<StrokeStyle>,
    px_path: &BezPath,
    progress: f64,
) {
    let Some(stroke) = stroke else {
        return;
    };
    if progress <= 0.0 {
        return;
    }
    let path = if progress < 1.0 {
        trim_path(px_path, progress)
    } else {
        px_path.clone()
    };
    stroke_cpu_path(ctx, &bezpath_to_cpu(&path), stroke);
}

#[allow(clippy::too_many_arguments)]
fn draw_arrow(
    ctx: &mut vello_cpu::RenderContext,
    camera: &Camera,
    stroke: Option<StrokeStyle>,
    start: Point,
    end: Point,
    tip_length: f64,
    progress: f64,
) {
    let Some(stroke) = stroke else {
        return;
    };
    let span = end - start;
    let len = span.hypot();
    if len <= 0.0 {
        return;
    }
    let dir = span / len;
    let tip_len = tip_length.min(len);
    let base = end - dir * tip_len;

    let mut shaft = BezPath::new();
    shaft.move_to(camera.to_px_point(start));
    shaft.line_to(camera.to_px_point(base));
    stroke_revealed(ctx, Some(stroke), &shaft, progress);

    if progress >= ARROW_TIP_THRESHOLD {
        let perp = Vec2::new(-dir.y, dir.x) * (tip_len * 0.45);
        let mut tip = BezPath::new();
        tip.move_to(camera.to_px_point(end));
        tip.line_to(camera.to_px_point(base + perp));
        tip.line_to(camera.to_px_point(base - perp));
        tip.close_path();
        ctx.set_paint(color_to_cpu(stroke.color, 1.0));
        ctx.fill_path(&bezpath_to_cpu(&tip));
    }
}

fn color_to_cpu(c: Rgba8, alpha: f64) -> vello_cpu::peniko::Color {
    let c = c.with_alpha_factor(alpha);
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Curly-brace path between two world points, bulging toward the clockwise
/// side of `end - start`, mapped to pixel space.
fn brace_path_px(camera: &Camera, start: Point, end: Point, depth: f64) -> BezPath {
    let span = end - start;
    let len = span.hypot();
    let mut path = BezPath::new();
    if len <= 0.0 {
        return path;
    }
    let t = span / len;
    let n = Element::brace_normal(start, end);
    let mid = start.midpoint(end);
    let tip = mid + n * depth;
    let quarter = t * (len * 0.25);

    path.move_to(camera.to_px_point(start));
    path.curve_to(
        camera.to_px_point(start + n * depth * 0.9),
        camera.to_px_point(tip - quarter),
        camera.to_px_point(tip),
    );
    path.curve_to(
        camera.to_px_point(tip + quarter),
        camera.to_px_point(end + n * depth * 0.9),
        camera.to_px_point(end),
    );
    path
}

/// Keep the leading `t` fraction (by arclength) of a stroked path.
fn trim_path(path: &BezPath, t: f64) -> BezPath {
    let t = t.clamp(0.0, 1.0);
    if t >= 1.0 {
        return path.clone();
    }
    let segments: Vec<PathSeg> = path.segments().collect();
    let total: f64 = segments.iter().map(|s| s.arclen(PATH_ACCURACY)).sum();
    if total <= 0.0 || t <= 0.0 {
        return BezPath::new();
    }

    let mut remaining = t * total;
    let mut kept: Vec<PathSeg> = Vec::with_capacity(segments.len());
    for seg in segments {
        let len = seg.arclen(PATH_ACCURACY);
        if len <= remaining {
            kept.push(seg);
            remaining -= len;
            if remaining <= 0.0 {
                break;
            }
        } else {
            let cut = seg.inv_arclen(remaining, PATH_ACCURACY);
            if cut > 0.0 {
                kept.push(seg.subsegment(0.0..cut));
            }
            break;
        }
    }
    BezPath::from_path_segments(kept.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Canvas;

    fn camera() -> Camera {
        Camera::new(Canvas {
            width: 1280,
            height: 720,
        })
    }

    #[test]
    fn trim_keeps_the_leading_fraction() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));

        let half = trim_path(&path, 0.5);
        let len: f64 = half.segments().map(|s| s.arclen(PATH_ACCURACY)).sum();
        assert!((len - 10.0).abs() < 0.05);

        let full = trim_path(&path, 1.0);
        assert_eq!(full.elements().len(), path.elements().len());

        let none = trim_path(&path, 0.0);
        assert_eq!(none.segments().count(), 0);
    }

    #[test]
    fn trim_cuts_inside_a_segment() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((8.0, 0.0));
        let part = trim_path(&path, 0.25);
        let len: f64 = part.segments().map(|s| s.arclen(PATH_ACCURACY)).sum();
        assert!((len - 2.0).abs() < 0.05);
    }

    #[test]
    fn brace_path_spans_its_anchors() {
        let cam = camera();
        let path = brace_path_px(&cam, Point::new(-0.9, -2.2), Point::new(0.9, -2.2), 0.25);
        let bbox = path.bounding_box();
        let left = cam.to_px_point(Point::new(-0.9, -2.2));
        let right = cam.to_px_point(Point::new(0.9, -2.2));
        assert!((bbox.min_x() - left.x).abs() < 1.0);
        assert!((bbox.max_x() - right.x).abs() < 1.0);
        // bulge is downward in pixel space (larger y)
        assert!(bbox.max_y() > left.y + 1.0);
    }

    #[test]
    fn degenerate_brace_is_empty() {
        let cam = camera();
        let p = Point::new(1.0, 1.0);
        assert_eq!(brace_path_px(&cam, p, p, 0.2).elements().len(), 0);
    }

    #[test]
    fn font_spec_defaults_to_assets_dir() {
        let spec = FontSpec::default();
        assert!(spec.regular.ends_with("JetBrainsMono-Regular.ttf"));
        assert!(spec.bold.ends_with("JetBrainsMono-Bold.ttf"));
    }

    #[test]
    fn missing_font_file_is_a_render_error() {
        let err = CpuRenderer::new(CpuRendererOpts {
            fonts: FontSpec::in_dir("does/not/exist"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("render error:"));
    }
}
