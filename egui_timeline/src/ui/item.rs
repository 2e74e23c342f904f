use crate::layout::{ItemLabel, ItemMetrics, LaidOutItem, MarkerMeasure, UnitStyle};
use crate::ui::TimelineEditorOptions;
use egui::*;

const MARKER_COLOR: Color32 = Color32::from_rgb(112, 128, 144);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(25, 25, 112);
const SELECTED_FILL: Color32 = Color32::from_rgba_premultiplied(25, 25, 112, 40);

/// Measures item units with the fonts egui will paint them with.
pub struct FontMeasure<'a> {
    ctx: &'a Context,
    time_font: FontId,
    label_font: FontId,
    important_font: FontId,
    style: UnitStyle,
}

impl<'a> FontMeasure<'a> {
    pub fn new(ctx: &'a Context, options: &TimelineEditorOptions) -> Self {
        Self {
            ctx,
            time_font: FontId::monospace(options.item_font_size),
            label_font: FontId::proportional(options.item_font_size),
            important_font: FontId::proportional(options.important_font_size),
            style: options.unit_style(),
        }
    }

    fn text_size(&self, text: String, font: FontId) -> Vec2 {
        self.ctx
            .fonts(|fonts| fonts.layout_no_wrap(text, font, Color32::WHITE).size())
    }
}

impl MarkerMeasure for FontMeasure<'_> {
    fn measure(&self, label: &ItemLabel) -> ItemMetrics {
        let label_font = if label.is_important {
            self.important_font.clone()
        } else {
            self.label_font.clone()
        };

        let leading = self.text_size(label.leading_text(), self.time_font.clone());
        let text = self.text_size(label.text.clone(), label_font);
        self.style.metrics(leading, text)
    }
}

/// 绘制单个条目：时间文本、圆形标记和标签
pub fn paint_item(
    painter: &Painter,
    offset: Vec2,
    item: &LaidOutItem,
    is_selected: bool,
    is_hovered: bool,
    options: &TimelineEditorOptions,
) {
    let rect = item.rect.translate(offset);
    let marker = item.marker_center + offset;
    let text_color = painter.ctx().style().visuals.text_color();

    if is_selected {
        painter.rect_filled(rect.expand(2.0), 3.0, SELECTED_FILL);
    }

    painter.text(
        Pos2::new(rect.min.x, marker.y),
        Align2::LEFT_CENTER,
        item.label.leading_text(),
        FontId::monospace(options.item_font_size),
        text_color,
    );

    let marker_color = if is_selected || is_hovered {
        HIGHLIGHT_COLOR
    } else {
        MARKER_COLOR
    };
    painter.circle_filled(marker, options.marker_radius, marker_color);

    let (label_font, label_color) = if item.label.is_important {
        (
            FontId::proportional(options.important_font_size),
            painter.ctx().style().visuals.strong_text_color(),
        )
    } else {
        (FontId::proportional(options.item_font_size), text_color)
    };
    painter.text(
        Pos2::new(marker.x + options.marker_radius + options.text_gap, marker.y),
        Align2::LEFT_CENTER,
        &item.label.text,
        label_font,
        label_color,
    );
}
