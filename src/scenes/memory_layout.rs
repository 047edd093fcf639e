//! Dark-themed overview: where the stack sits between high and low memory,
//! alongside the C++ source and the compiled listing.

use kurbo::{Point, Vec2};

use crate::diagram::panel::{CodePanel, PanelFrame, PanelStyle};
use crate::diagram::stack::{StackDiagram, StackSpec};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::StackshowResult;
use crate::scene::element::{Element, StrokeStyle};
use crate::scene::layout::{Dir, Layout};
use crate::scene::scene::{Entrance, Scene};
use crate::scene::text::TextBlock;
use crate::scenes::ADD_ASM;

const BG: Rgba8 = Rgba8::rgb(0x0b, 0x0e, 0x10);
const FG: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
const MUTED: Rgba8 = Rgba8::rgb(0xbb, 0xbb, 0xbb);
const ACCENT: Rgba8 = Rgba8::rgb(0xff, 0xff, 0x00);
const PANEL_FILL: Rgba8 = Rgba8::rgb(0x15, 0x1a, 0x1f);
const PANEL_EDGE: Rgba8 = Rgba8::rgb(0x44, 0x44, 0x44);

const ADD_SOURCE: &str = concat!(
    "int add(int a, int b) {\n",
    "    int c;\n",
    "    c = a + b;\n",
    "    return c;\n",
    "}",
);

fn panel_style(target_width: f64) -> PanelStyle {
    PanelStyle {
        code_em: 0.24,
        target_width: Some(target_width),
        line_advance: 1.25,
        padding: Vec2::new(0.25, 0.25),
        title_em: 0.3,
        title_buff: 0.18,
        code_color: FG,
        title_color: MUTED,
        title_bold: false,
    }
}

fn panel_frame() -> PanelFrame {
    PanelFrame {
        fill: PANEL_FILL,
        stroke: StrokeStyle::new(PANEL_EDGE, 1.5),
        corner_radius: 0.08,
    }
}

/// Build the `memory-layout` scene.
pub fn build() -> StackshowResult<Scene> {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let mut scene = Scene::new("memory-layout", canvas, BG);
    let frame = scene.frame();

    let title = Element::text(
        "title",
        TextBlock::line("STACK DEMONSTRATION (x86, 32-bit)", 0.42, FG).bold(),
    )
    .to_edge(frame, Dir::Up, 0.4);

    let mut stack = StackDiagram::build(StackSpec {
        rows: 9,
        cell_w: 3.0,
        cell_h: 0.5,
        frame_stroke: StrokeStyle::new(FG, 2.5),
        cell_stroke: StrokeStyle::new(MUTED, 1.4),
    })?;
    stack.annotate_cell(2, TextBlock::line("Parameters", 0.22, MUTED), Dir::Left, 0.3)?;
    stack.annotate_cell(
        3,
        TextBlock::line("Return address", 0.22, MUTED),
        Dir::Left,
        0.3,
    )?;
    let stack = stack.move_to(Point::new(1.0, 0.0));

    let high = stack.memory_marker(TextBlock::line("High memory", 0.28, MUTED), Dir::Up, 0.15);
    let low = stack.memory_marker(TextBlock::line("Low memory", 0.28, MUTED), Dir::Down, 0.15);
    let grow = stack.address_arrow(0.45, 0.05, StrokeStyle::new(ACCENT, 2.2), 0.2);
    let grow_caption = Element::text(
        "stack.grow.caption",
        TextBlock::line("addresses decrease ↓", 0.26, ACCENT),
    )
    .next_to(grow.bbox(), Dir::Left, 0.2);

    let stack_frame_bbox = stack.frame_bbox();

    let cpp = CodePanel::framed("cpp", ADD_SOURCE, "C++", &panel_style(3.3), panel_frame())?
        .to_edge(frame, Dir::Left, 0.4)
        .shift(Vec2::new(0.0, 0.2));

    let asm = CodePanel::framed("asm", ADD_ASM, "Assembly", &panel_style(3.4), panel_frame())?
        .next_to(stack_frame_bbox, Dir::Right, 0.4);

    let title_id = scene.add(title);
    let stack_ids = scene.add_group(stack.into_group());
    let high_id = scene.add(high);
    let low_id = scene.add(low);
    let grow_id = scene.add(grow);
    let caption_id = scene.add(grow_caption);
    let cpp_ids = scene.add_group(cpp.into_group());
    let asm_ids = scene.add_group(asm.into_group());

    scene.play(
        vec![Entrance::fade_in(vec![title_id], Vec2::new(0.0, -0.2))],
        1.0,
    );
    scene.play(
        vec![
            Entrance::fade_in_lagged(stack_ids, Vec2::new(0.0, 0.2), 0.03),
            Entrance::fade_in(vec![high_id], Vec2::new(0.0, 0.2)),
            Entrance::fade_in(vec![low_id], Vec2::new(0.0, -0.2)),
        ],
        1.0,
    );
    scene.play(
        vec![
            Entrance::create(grow_id),
            Entrance::fade_in(vec![caption_id], Vec2::new(-0.2, 0.0)),
        ],
        1.0,
    );
    scene.play(vec![Entrance::fade_in(cpp_ids, Vec2::new(0.2, 0.0))], 1.0);
    scene.play(vec![Entrance::fade_in(asm_ids, Vec2::new(-0.2, 0.0))], 1.0);
    scene.wait(1.0);

    Ok(scene)
}
