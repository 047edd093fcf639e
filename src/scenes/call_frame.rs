//! Light-themed walkthrough of one `add(8, 4)` call frame, with ESP/EBP
//! pointers into the cells that hold the arguments, return address and saved
//! base pointer.

use kurbo::{Point, Vec2};

use crate::diagram::panel::{CodePanel, PanelStyle};
use crate::diagram::stack::{StackDiagram, StackSpec};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::StackshowResult;
use crate::scene::element::{Element, StrokeStyle};
use crate::scene::layout::{Dir, Layout};
use crate::scene::scene::{Entrance, Scene};
use crate::scene::text::TextBlock;
use crate::scenes::ADD_ASM;

const BG: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
const INK: Rgba8 = Rgba8::rgb(0x00, 0x00, 0x00);
const GRID: Rgba8 = Rgba8::rgb(0xbb, 0xbb, 0xbb);

const CELL_W: f64 = 2.6;
const CELL_H: f64 = 0.55;
const ROWS: usize = 8;

const ADD_SOURCE: &str = concat!(
    "int add(int a, int b)\n",
    "{\n",
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
        padding: Vec2::new(0.0, 0.0),
        title_em: 0.3,
        title_buff: 0.18,
        code_color: INK,
        title_color: INK,
        title_bold: true,
    }
}

/// Build the `call-frame` scene.
pub fn build() -> StackshowResult<Scene> {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let mut scene = Scene::new("call-frame", canvas, BG);
    let frame = scene.frame();

    let title = Element::text(
        "title",
        TextBlock::line("STACK DEMONSTRATION (x86, 32-bit)", 0.45, INK).bold(),
    )
    .to_edge(frame, Dir::Up, 0.4);

    let mut stack = StackDiagram::build(StackSpec {
        rows: ROWS,
        cell_w: CELL_W,
        cell_h: CELL_H,
        frame_stroke: StrokeStyle::new(INK, 2.5),
        cell_stroke: StrokeStyle::new(GRID, 1.6),
    })?;
    stack.label_cell(2, TextBlock::line("8", 0.3, INK))?;
    stack.label_cell(3, TextBlock::line("4", 0.3, INK))?;
    stack.label_cell(4, TextBlock::line("return address", 0.24, INK))?;
    stack.label_cell(5, TextBlock::line("EBP", 0.3, INK))?;
    stack.label_cell(6, TextBlock::line("0xC", 0.3, INK))?;
    let stack = stack.move_to(Point::ZERO);
    let stack_bbox = stack.frame_bbox();

    let high = stack.memory_marker(TextBlock::line("High memory (100)", 0.26, INK), Dir::Up, 0.2);
    let hi_arrow = Element::arrow(
        "stack.hi_arrow",
        Point::new(stack_bbox.max_x() + 0.6, stack_bbox.max_y() + 0.18),
        Point::new(stack_bbox.max_x() + 0.6, stack_bbox.max_y()),
        0.15,
    )
    .stroked(INK, 2.0);
    let low = stack
        .memory_marker(TextBlock::line("Low memory (0)", 0.26, INK), Dir::Down, 0.15)
        .align_to(stack_bbox, Dir::Right)
        .shift(Vec2::new(0.2, 0.0));

    let brace = Element::brace(
        "stack.width_brace",
        Point::new(stack_bbox.center().x - 0.9, stack_bbox.min_y() - 0.55),
        Point::new(stack_bbox.center().x + 0.9, stack_bbox.min_y() - 0.55),
        0.22,
    )
    .stroked(INK, 2.0);
    let bits = Element::text("stack.width_bits", TextBlock::line("32 bits", 0.26, INK))
        .next_to(brace.bbox(), Dir::Down, 0.08);

    let p_lbl = Element::text("params.note", TextBlock::line("Parameters", 0.26, INK))
        .next_to(stack.cell_bbox(3)?, Dir::Left, 0.5);
    let r_lbl = Element::text("retaddr.note", TextBlock::new("Return\naddress", 0.26, INK))
        .next_to(stack.cell_bbox(4)?, Dir::Left, 0.5);

    let esp_cell = stack.cell_bbox(ROWS - 1)?;
    let esp_tip = Point::new(esp_cell.max_x(), esp_cell.center().y);
    let esp_arrow = Element::arrow(
        "esp.arrow",
        Point::new(esp_tip.x + 0.9, esp_tip.y),
        esp_tip,
        0.16,
    )
    .stroked(INK, 2.3);
    let esp_txt = Element::text("esp.label", TextBlock::line("ESP", 0.28, INK))
        .next_to(esp_arrow.bbox(), Dir::Right, 0.12);

    let ebp_cell = stack.cell_bbox(5)?;
    let ebp_tip = Point::new(ebp_cell.max_x(), ebp_cell.center().y);
    let ebp_arrow = Element::arrow(
        "ebp.arrow",
        Point::new(ebp_tip.x + 0.9, ebp_tip.y),
        ebp_tip,
        0.16,
    )
    .stroked(INK, 2.3);
    let ebp_txt = Element::text("ebp.label", TextBlock::line("EBP", 0.28, INK))
        .next_to(ebp_arrow.bbox(), Dir::Right, 0.12);

    let cpp = CodePanel::bare("cpp", ADD_SOURCE, "C++", &panel_style(3.2))?
        .to_edge(frame, Dir::Left, 0.4)
        .align_to(stack_bbox, Dir::Up)
        .shift(Vec2::new(0.0, -0.2));

    let asm = CodePanel::bare("asm", ADD_ASM, "Assembly", &panel_style(3.9))?
        .next_to(stack_bbox, Dir::Right, 1.7)
        .align_to(stack_bbox, Dir::Up)
        .shift(Vec2::new(0.0, -0.2));

    let title_id = scene.add(title);
    let stack_ids = scene.add_group(stack.into_group());
    let high_id = scene.add(high);
    let hi_arrow_id = scene.add(hi_arrow);
    let low_id = scene.add(low);
    let brace_id = scene.add(brace);
    let bits_id = scene.add(bits);
    let p_lbl_id = scene.add(p_lbl);
    let r_lbl_id = scene.add(r_lbl);
    let cpp_ids = scene.add_group(cpp.into_group());
    let asm_ids = scene.add_group(asm.into_group());
    let esp_arrow_id = scene.add(esp_arrow);
    let esp_txt_id = scene.add(esp_txt);
    let ebp_arrow_id = scene.add(ebp_arrow);
    let ebp_txt_id = scene.add(ebp_txt);

    scene.play(
        vec![Entrance::fade_in(vec![title_id], Vec2::new(0.0, -0.2))],
        0.6,
    );
    scene.play(
        vec![Entrance::fade_in(stack_ids, Vec2::new(0.0, 0.15))],
        0.8,
    );
    scene.play(
        vec![
            Entrance::fade_in(vec![high_id], Vec2::ZERO),
            Entrance::create(hi_arrow_id),
            Entrance::fade_in(vec![low_id], Vec2::ZERO),
        ],
        0.4,
    );
    scene.play(
        vec![
            Entrance::fade_in(vec![p_lbl_id], Vec2::ZERO),
            Entrance::fade_in(vec![r_lbl_id], Vec2::ZERO),
            Entrance::create(brace_id),
            Entrance::fade_in(vec![bits_id], Vec2::ZERO),
        ],
        0.6,
    );
    scene.play(
        vec![
            Entrance::fade_in(cpp_ids, Vec2::new(0.2, 0.0)),
            Entrance::fade_in(asm_ids, Vec2::new(-0.2, 0.0)),
        ],
        1.0,
    );
    scene.play(
        vec![
            Entrance::fade_in(vec![esp_arrow_id], Vec2::ZERO),
            Entrance::fade_in(vec![esp_txt_id], Vec2::ZERO),
            Entrance::fade_in(vec![ebp_arrow_id], Vec2::ZERO),
            Entrance::fade_in(vec![ebp_txt_id], Vec2::ZERO),
        ],
        0.8,
    );
    scene.wait(1.8);

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_builds_and_lasts_six_seconds() {
        let scene = build().unwrap();
        assert!((scene.total_secs() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn composition_stays_inside_the_world_frame() {
        let scene = build().unwrap();
        let frame = scene.frame();
        for el in &scene.elements {
            let b = el.bbox();
            assert!(
                b.min_x() >= frame.min_x() && b.max_x() <= frame.max_x(),
                "{} spills horizontally: {b:?}",
                el.name
            );
            assert!(
                b.min_y() >= frame.min_y() && b.max_y() <= frame.max_y(),
                "{} spills vertically: {b:?}",
                el.name
            );
        }
    }

    #[test]
    fn pointer_arrows_touch_their_cells() {
        let scene = build().unwrap();
        let cell5 = scene
            .elements
            .iter()
            .find(|e| e.name == "stack.cell5")
            .unwrap()
            .bbox();
        let ebp = scene
            .elements
            .iter()
            .find(|e| e.name == "ebp.arrow")
            .unwrap()
            .bbox();
        assert!((ebp.min_x() - cell5.max_x()).abs() < 1e-12);
        assert!((ebp.center().y - cell5.center().y).abs() < 1e-12);
    }

    #[test]
    fn value_labels_sit_inside_their_cells() {
        let scene = build().unwrap();
        let cell = |name: &str| {
            scene
                .elements
                .iter()
                .find(|e| e.name == name)
                .unwrap()
                .bbox()
        };
        let ret_cell = cell("stack.cell4");
        let ret_value = cell("stack.value4");
        assert!(ret_cell.contains(ret_value.center()));
        assert!(ret_value.width() <= ret_cell.width());
    }

    #[test]
    fn listings_are_not_identical_across_scenes_but_share_the_asm() {
        // brace placement differs between the two sources on purpose
        assert!(ADD_SOURCE.contains("int add(int a, int b)\n{"));
        assert_eq!(ADD_ASM.lines().count(), 11);
    }
}
