use crate::render::{DrawCommand, Scene};
use crate::structure::ItemId;
use crate::ui::item::paint_item;
use crate::ui::TimelineEditorOptions;
use egui::*;

const TICK_LINE_COLOR: Color32 = Color32::from_gray(90);

/// 按顺序绘制场景中的所有命令，`origin` 为时间线区域左上角
pub fn paint_scene(
    painter: &Painter,
    origin: Pos2,
    scene: &Scene,
    hovered: Option<ItemId>,
    options: &TimelineEditorOptions,
) {
    let offset = origin.to_vec2();
    let visuals = painter.ctx().style().visuals.clone();

    for command in &scene.commands {
        match command {
            DrawCommand::AxisLine { from, to, thickness } => {
                painter.line_segment(
                    [*from + offset, *to + offset],
                    Stroke::new(*thickness, visuals.strong_text_color()),
                );
            }
            DrawCommand::TickLine { y } => {
                painter.hline(
                    origin.x..=origin.x + scene.size.x,
                    origin.y + y,
                    Stroke::new(1.0, TICK_LINE_COLOR),
                );
            }
            DrawCommand::TickLabel { anchor, text } => {
                painter.text(
                    *anchor + offset,
                    Align2::LEFT_BOTTOM,
                    text,
                    FontId::proportional(options.tick_font_size),
                    visuals.weak_text_color(),
                );
            }
            DrawCommand::Item { item, selected } => {
                paint_item(painter, offset, item, *selected, hovered == Some(item.id), options);
            }
        }
    }
}
