//! 条目布局模块
//!
//! Decides which items are visible and where each one sits. An item is drawn
//! as one horizontal unit, `[~][time] (marker) label`, and the unit is shifted
//! so that its marker lands exactly on the axis line. Text width varies, so
//! the marker offset comes from an injected [`MarkerMeasure`].
//!
//! Items closer together than their rendered height simply overlap.

use crate::axis::TimeAxis;
use crate::structure::{ItemId, TimelineItem, ViewRange};
use crate::utils::{format_clock_time, format_relative_time};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use egui::{Pos2, Rect, Vec2};

/// How item times are turned into text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelFormat {
    pub time_zone: Tz,
    /// When set, times are shown as offsets from this instant.
    pub t_zero: Option<DateTime<Utc>>,
}

impl Default for LabelFormat {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            t_zero: None,
        }
    }
}

/// Display text for one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemLabel {
    pub time_text: String,
    pub text: String,
    pub is_approximate: bool,
    pub is_important: bool,
}

impl ItemLabel {
    pub fn for_item(item: &TimelineItem, format: &LabelFormat) -> Self {
        let time_text = match format.t_zero {
            Some(t_zero) => format_relative_time(item.time - t_zero),
            None => format_clock_time(item.time, format.time_zone),
        };

        Self {
            time_text,
            text: item.label.clone(),
            is_approximate: item.is_approximate,
            is_important: item.is_important,
        }
    }

    /// Text left of the marker, including the "~" for approximate times.
    pub fn leading_text(&self) -> String {
        if self.is_approximate {
            format!("~{}", self.time_text)
        } else {
            self.time_text.clone()
        }
    }
}

/// Measured geometry of one item unit, relative to its own top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemMetrics {
    pub marker_center: Vec2,
    pub size: Vec2,
}

/// Text measurement supplied by the host.
pub trait MarkerMeasure {
    fn measure(&self, label: &ItemLabel) -> ItemMetrics;
}

/// Spacing of the parts of an item unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitStyle {
    pub marker_radius: f32,
    /// Gap between the time text and the marker.
    pub marker_gap: f32,
    /// Gap between the marker and the label text.
    pub text_gap: f32,
}

impl Default for UnitStyle {
    fn default() -> Self {
        Self {
            marker_radius: 6.0,
            marker_gap: 10.0,
            text_gap: 8.0,
        }
    }
}

impl UnitStyle {
    /// Unit geometry from already measured text sizes.
    pub fn metrics(&self, leading: Vec2, label: Vec2) -> ItemMetrics {
        let diameter = self.marker_radius * 2.0;
        let height = leading.y.max(label.y).max(diameter);
        ItemMetrics {
            marker_center: Vec2::new(leading.x + self.marker_gap + self.marker_radius, leading.y / 2.0),
            size: Vec2::new(
                leading.x + self.marker_gap + diameter + self.text_gap + label.x,
                height,
            ),
        }
    }
}

/// Fixed advance per character. Used headless and in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharWidthMeasure {
    pub char_width: f32,
    pub line_height: f32,
    pub style: UnitStyle,
}

impl Default for CharWidthMeasure {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
            style: UnitStyle::default(),
        }
    }
}

impl MarkerMeasure for CharWidthMeasure {
    fn measure(&self, label: &ItemLabel) -> ItemMetrics {
        let width = |text: &str| text.chars().count() as f32 * self.char_width;
        self.style.metrics(
            Vec2::new(width(&label.leading_text()), self.line_height),
            Vec2::new(width(&label.text), self.line_height),
        )
    }
}

/// An item placed on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidOutItem {
    pub id: ItemId,
    /// Axis position of the item's instant.
    pub y: f64,
    /// Bounds of the whole unit.
    pub rect: Rect,
    pub marker_center: Pos2,
    pub label: ItemLabel,
}

pub fn is_visible(item: &TimelineItem, range: &ViewRange) -> bool {
    range.contains(item.time)
}

pub struct ItemLayoutEngine<'a> {
    pub axis: TimeAxis,
    pub axis_x: f32,
    pub measure: &'a dyn MarkerMeasure,
}

impl<'a> ItemLayoutEngine<'a> {
    pub fn new(axis: TimeAxis, axis_x: f32, measure: &'a dyn MarkerMeasure) -> Self {
        Self { axis, axis_x, measure }
    }

    /// Visible items in collection order. Empty while the scale is zero.
    pub fn layout(
        &self,
        items: &[TimelineItem],
        range: &ViewRange,
        seconds_per_pixel: f64,
        format: &LabelFormat,
    ) -> Vec<LaidOutItem> {
        if seconds_per_pixel <= 0.0 {
            return Vec::new();
        }

        items
            .iter()
            .filter(|item| is_visible(item, range))
            .map(|item| {
                let y = self.axis.position_of(item.time, range, seconds_per_pixel);
                self.place(item, y, format)
            })
            .collect()
    }

    fn place(&self, item: &TimelineItem, y: f64, format: &LabelFormat) -> LaidOutItem {
        let label = ItemLabel::for_item(item, format);
        let metrics = self.measure.measure(&label);

        let left = self.axis_x - metrics.marker_center.x;
        let top = y as f32 - metrics.marker_center.y;
        let min = Pos2::new(left, top);

        LaidOutItem {
            id: item.id,
            y,
            rect: Rect::from_min_size(min, metrics.size),
            marker_center: min + metrics.marker_center,
            label,
        }
    }
}

/// The item under `pos`. Later items are drawn on top, so they win.
pub fn hit_test<'a>(items: impl DoubleEndedIterator<Item = &'a LaidOutItem>, pos: Pos2) -> Option<ItemId> {
    items.rev().find(|item| item.rect.contains(pos)).map(|item| item.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
    }

    fn engine(measure: &CharWidthMeasure) -> ItemLayoutEngine<'_> {
        ItemLayoutEngine::new(TimeAxis::default(), 150.0, measure)
    }

    #[test]
    fn test_visibility_is_inclusive() {
        let range = ViewRange::new(at(9, 0, 0), at(10, 0, 0));
        assert!(is_visible(&TimelineItem::new(at(9, 0, 0), ""), &range));
        assert!(is_visible(&TimelineItem::new(at(10, 0, 0), ""), &range));
        assert!(!is_visible(&TimelineItem::new(at(8, 59, 59), ""), &range));
    }

    #[test]
    fn test_marker_lands_on_axis() {
        let measure = CharWidthMeasure::default();
        let range = ViewRange::new(at(9, 0, 0), at(10, 0, 0));
        let items = [
            TimelineItem::new(at(9, 15, 0), "short"),
            TimelineItem::new(at(9, 45, 0), "a much longer label").approximate(true),
        ];

        let laid_out = engine(&measure).layout(&items, &range, 9.0, &LabelFormat::default());
        assert_eq!(laid_out.len(), 2);
        for item in &laid_out {
            assert!((item.marker_center.x - 150.0).abs() < 1e-4);
            assert!((item.marker_center.y as f64 - item.y).abs() < 1e-3);
        }
        // the "~" prefix pushes the approximate unit further left
        assert!(laid_out[1].rect.min.x < laid_out[0].rect.min.x);
    }

    #[test]
    fn test_positions_follow_axis() {
        let measure = CharWidthMeasure::default();
        let range = ViewRange::new(at(9, 0, 0), at(10, 0, 0));
        let items = [TimelineItem::new(at(9, 30, 0), "half")];

        let laid_out = engine(&measure).layout(&items, &range, 9.0, &LabelFormat::default());
        // 17 px edge + 1800 s / 9 s/px
        assert!((laid_out[0].y - 217.0).abs() < 1e-9);
    }

    #[test]
    fn test_hidden_and_unmeasured() {
        let measure = CharWidthMeasure::default();
        let range = ViewRange::new(at(9, 0, 0), at(10, 0, 0));
        let items = [TimelineItem::new(at(11, 0, 0), "later")];

        assert!(engine(&measure).layout(&items, &range, 9.0, &LabelFormat::default()).is_empty());
        let visible = [TimelineItem::new(at(9, 30, 0), "now")];
        assert!(engine(&measure).layout(&visible, &range, 0.0, &LabelFormat::default()).is_empty());
    }

    #[test]
    fn test_close_items_overlap() {
        let measure = CharWidthMeasure::default();
        let range = ViewRange::new(at(9, 0, 0), at(10, 0, 0));
        let items = [
            TimelineItem::new(at(9, 30, 0), "one"),
            TimelineItem::new(at(9, 30, 9), "two"),
        ];

        let laid_out = engine(&measure).layout(&items, &range, 9.0, &LabelFormat::default());
        assert!(laid_out[0].rect.intersects(laid_out[1].rect));
        let pos = laid_out[1].marker_center;
        assert_eq!(hit_test(laid_out.iter(), pos), Some(items[1].id));
    }

    #[test]
    fn test_hit_test_misses_background() {
        let measure = CharWidthMeasure::default();
        let range = ViewRange::new(at(9, 0, 0), at(10, 0, 0));
        let items = [TimelineItem::new(at(9, 30, 0), "one")];
        let laid_out = engine(&measure).layout(&items, &range, 9.0, &LabelFormat::default());

        assert_eq!(hit_test(laid_out.iter(), Pos2::new(150.0, 400.0)), None);
        assert_eq!(hit_test(laid_out.iter(), laid_out[0].marker_center), Some(items[0].id));
    }

    #[test]
    fn test_label_formats() {
        let item = TimelineItem::new(at(9, 30, 0), "event").important(true);

        let absolute = ItemLabel::for_item(&item, &LabelFormat::default());
        assert_eq!(absolute.time_text, "09:30:00");
        assert!(absolute.is_important);

        let relative = ItemLabel::for_item(
            &item,
            &LabelFormat {
                time_zone: Tz::UTC,
                t_zero: Some(at(9, 30, 0) + TimeDelta::minutes(90)),
            },
        );
        assert_eq!(relative.time_text, "-01:30:00");
    }

    #[test]
    fn test_leading_text_marks_approximate() {
        let item = TimelineItem::new(at(9, 30, 0), "event").approximate(true);
        let label = ItemLabel::for_item(&item, &LabelFormat::default());
        assert_eq!(label.leading_text(), "~09:30:00");
    }
}
