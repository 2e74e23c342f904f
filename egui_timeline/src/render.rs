//! 渲染编排模块
//!
//! Rebuilds the complete list of draw commands for the timeline from the
//! items, the view range and the area size. The host paints the commands in
//! order, so the order is the z-stacking: axis line, then ticks, then items.
//!
//! A render pass is pure. The same input always produces an equal [`Scene`].

use crate::axis::TimeAxis;
use crate::layout::{ItemLayoutEngine, LabelFormat, LaidOutItem, MarkerMeasure};
use crate::structure::{ItemId, TimelineItem, ViewRange};
use crate::utils::format_tick_time;
use chrono::{Offset, TimeDelta, TimeZone};
use egui::{Pos2, Vec2};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    AxisLine { from: Pos2, to: Pos2, thickness: f32 },
    TickLine { y: f32 },
    /// `anchor` is the left-bottom corner of the text.
    TickLabel { anchor: Pos2, text: String },
    Item { item: LaidOutItem, selected: bool },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    pub size: Vec2,
    /// Scale used for this pass, zero if nothing could be positioned.
    pub seconds_per_pixel: f64,
}

impl Scene {
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &LaidOutItem> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Item { item, .. } => Some(item),
            _ => None,
        })
    }

    pub fn tick_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::TickLine { .. }))
            .count()
    }
}

/// Everything a render pass reads.
pub struct RenderInput<'a> {
    pub items: &'a [TimelineItem],
    pub range: ViewRange,
    pub size: Vec2,
    pub selected: Option<ItemId>,
    pub format: LabelFormat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOrchestrator {
    pub axis: TimeAxis,
    /// X of the vertical axis line.
    pub axis_x: f32,
    /// Half width of the "T" caps at both ends of the axis line.
    pub cap_half_width: f32,
    /// Left inset of tick labels.
    pub tick_label_x: f32,
    /// Gap between a tick label's baseline and its gridline.
    pub tick_label_gap: f32,
}

impl Default for RenderOrchestrator {
    fn default() -> Self {
        Self {
            axis: TimeAxis::default(),
            axis_x: 150.0,
            cap_half_width: 15.0,
            tick_label_x: 5.0,
            tick_label_gap: 3.0,
        }
    }
}

impl RenderOrchestrator {
    pub fn render(&self, input: &RenderInput<'_>, measure: &dyn MarkerMeasure) -> Scene {
        let mut scene = Scene {
            commands: Vec::new(),
            size: input.size,
            seconds_per_pixel: 0.0,
        };

        self.render_axis_line(&mut scene);

        let seconds_per_pixel = self.axis.seconds_per_pixel(&input.range, input.size.y as f64);
        scene.seconds_per_pixel = seconds_per_pixel;

        if seconds_per_pixel > 0.0 {
            self.render_tick_lines(&mut scene, input, seconds_per_pixel);
            self.render_items(&mut scene, input, seconds_per_pixel, measure);
        }

        log::trace!(
            "Rendered {} commands for {} .. {} ({:.3} s/px)",
            scene.commands.len(),
            input.range.start,
            input.range.end,
            seconds_per_pixel
        );
        scene
    }

    fn render_axis_line(&self, scene: &mut Scene) {
        let thickness = self.axis.edge_thickness as f32;
        let height = scene.size.y;
        let x = self.axis_x;
        let (left, right) = (x - self.cap_half_width, x + self.cap_half_width);

        // T at top
        scene.commands.push(DrawCommand::AxisLine {
            from: Pos2::new(left, thickness / 2.0),
            to: Pos2::new(right, thickness / 2.0),
            thickness,
        });
        scene.commands.push(DrawCommand::AxisLine {
            from: Pos2::new(x, 0.0),
            to: Pos2::new(x, height),
            thickness,
        });
        // T at bottom
        scene.commands.push(DrawCommand::AxisLine {
            from: Pos2::new(left, height - thickness / 2.0),
            to: Pos2::new(right, height - thickness / 2.0),
            thickness,
        });
    }

    fn render_tick_lines(&self, scene: &mut Scene, input: &RenderInput<'_>, seconds_per_pixel: f64) {
        let zone = input.format.time_zone;
        let offset = zone.offset_from_utc_datetime(&input.range.start.naive_utc()).fix();
        let grid_offset = TimeDelta::seconds(offset.local_minus_utc() as i64);

        for tick in self.axis.ticks(&input.range, seconds_per_pixel, grid_offset) {
            let y = tick.y as f32;
            scene.commands.push(DrawCommand::TickLine { y });
            scene.commands.push(DrawCommand::TickLabel {
                anchor: Pos2::new(self.tick_label_x, y - self.tick_label_gap),
                text: format_tick_time(tick.time, zone),
            });
        }
    }

    fn render_items(
        &self,
        scene: &mut Scene,
        input: &RenderInput<'_>,
        seconds_per_pixel: f64,
        measure: &dyn MarkerMeasure,
    ) {
        let engine = ItemLayoutEngine::new(self.axis, self.axis_x, measure);
        for item in engine.layout(input.items, &input.range, seconds_per_pixel, &input.format) {
            let selected = input.selected == Some(item.id);
            scene.commands.push(DrawCommand::Item { item, selected });
        }
    }
}
