//! 视口控制模块
//!
//! Owns the visible time range and implements zoom, pan and the "fit"
//! operations, plus the pointer gesture state machine that tells a click from
//! a drag.
//!
//! Every operation leaves the range duration inside [`ZoomLimits`]. Requests
//! outside the limits are clamped, never rejected.

use crate::axis::TimeAxis;
use crate::structure::{add_delta, seconds_to_delta, ItemId, TimelineItem, ViewRange, ZoomLimits};
use crate::utils::start_of_day;
use chrono::{DateTime, Local, TimeDelta, Utc};
use egui::PointerButton;

/// Pointer gesture over the timeline area.
#[derive(Clone, Debug, PartialEq)]
pub enum DragGesture {
    Idle,
    Dragging {
        start_y: f64,
        start_range: ViewRange,
        /// Item under the pointer when the button went down.
        pressed_item: Option<ItemId>,
        moved: bool,
    },
}

impl DragGesture {
    pub fn pressed_item(&self) -> Option<ItemId> {
        match self {
            DragGesture::Dragging { pressed_item, .. } => *pressed_item,
            DragGesture::Idle => None,
        }
    }
}

/// What a button release means to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerRelease {
    /// Primary release without net movement. `item` is the item that was
    /// pressed, `None` for empty background.
    Click { item: Option<ItemId> },
    /// Primary release after the view was dragged.
    Drag,
    /// Secondary or middle release.
    ResetZoom,
    /// Primary release with no gesture in progress.
    Ignored,
}

pub struct ViewportController {
    range: ViewRange,
    limits: ZoomLimits,
    gesture: DragGesture,
}

impl Default for ViewportController {
    fn default() -> Self {
        let day_start = start_of_day(&Local::now());
        Self::new(ViewRange::new(day_start, add_delta(day_start, TimeDelta::days(1))))
    }
}

impl ViewportController {
    pub fn new(range: ViewRange) -> Self {
        Self::with_limits(range, ZoomLimits::default())
    }

    pub fn with_limits(range: ViewRange, limits: ZoomLimits) -> Self {
        Self {
            range: limits.clamp(range.start, range.end),
            limits,
            gesture: DragGesture::Idle,
        }
    }

    pub fn view_range(&self) -> ViewRange {
        self.range
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn gesture(&self) -> &DragGesture {
        &self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, DragGesture::Dragging { .. })
    }

    /// Shows `[start, end]`, clamped about its midpoint if the duration is
    /// outside the limits.
    pub fn fit_to_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> ViewRange {
        self.range = self.limits.clamp(start, end);
        log::debug!("View range set to {} .. {}", self.range.start, self.range.end);
        self.range
    }

    /// Fits the view to the items, defaulting to the current local day when
    /// there are none.
    pub fn fit_to_items(&mut self, items: &[TimelineItem]) -> ViewRange {
        self.fit_to_items_on(items, start_of_day(&Local::now()))
    }

    /// Like [`ViewportController::fit_to_items`] with an explicit start for the
    /// empty-document day.
    pub fn fit_to_items_on(&mut self, items: &[TimelineItem], day_start: DateTime<Utc>) -> ViewRange {
        let earliest = items.iter().map(|item| item.time).min();
        let latest = items.iter().map(|item| item.time).max();

        match (items.len(), earliest, latest) {
            (1, Some(time), _) => {
                let half_hour = TimeDelta::minutes(30);
                self.fit_to_range(add_delta(time, -half_hour), add_delta(time, half_hour))
            }
            (_, Some(earliest), Some(latest)) => self.fit_to_range(earliest, latest),
            _ => self.fit_to_range(day_start, add_delta(day_start, TimeDelta::days(1))),
        }
    }

    /// Zooms around `anchor_y`, keeping the instant under the anchor in place.
    ///
    /// `percent > 0` zooms in, `percent < 0` zooms out. Nothing happens when
    /// the view already sits at the corresponding limit, when `percent` is
    /// zero, or while the scale is unmeasured. Returns whether the range
    /// changed.
    ///
    /// Zooming in and then out by the same percentage is not an exact
    /// round trip. The anchor instant stays put but the duration comes back
    /// as `(1 - p²)` of the original.
    pub fn zoom(
        &mut self,
        percent: f64,
        anchor_y: f64,
        pixel_height: f64,
        seconds_per_pixel: f64,
        axis: &TimeAxis,
    ) -> bool {
        let usable = axis.usable_height(pixel_height);
        if percent == 0.0 || usable <= 0.0 || seconds_per_pixel <= 0.0 {
            return false;
        }

        let duration = self.range.duration();
        let zoom_in = percent > 0.0;
        if zoom_in && duration <= self.limits.min_duration {
            return false;
        }
        if !zoom_in && duration >= self.limits.max_duration {
            return false;
        }

        let fraction = ((anchor_y - axis.edge_offset()) / usable).clamp(0.0, 1.0);
        let total_px = percent.abs() / 100.0 * usable;
        let above_px = total_px * fraction;
        let below_px = total_px - above_px;

        let above = seconds_to_delta(above_px * seconds_per_pixel);
        let below = seconds_to_delta(below_px * seconds_per_pixel);

        let (start, end) = if zoom_in {
            (add_delta(self.range.start, above), add_delta(self.range.end, -below))
        } else {
            (add_delta(self.range.start, -above), add_delta(self.range.end, below))
        };

        let before = self.range;
        self.range = self.limits.clamp(start, end);
        log::debug!(
            "Zoom {:+}% at y={:.1}: {} -> {}",
            percent,
            anchor_y,
            before.duration(),
            self.range.duration()
        );
        self.range != before
    }

    /// Shifts the view by a pointer delta.
    ///
    /// The shift is applied to the range captured when the current drag
    /// started, so repeated calls during one gesture never accumulate error.
    /// Without a gesture it shifts the current range. Dragging down
    /// (`pixel_delta > 0`) moves the view earlier.
    pub fn pan(&mut self, pixel_delta: f64, seconds_per_pixel: f64) -> bool {
        let base = match &self.gesture {
            DragGesture::Dragging { start_range, .. } => *start_range,
            DragGesture::Idle => self.range,
        };

        let before = self.range;
        self.range = base.shifted(-seconds_to_delta(pixel_delta * seconds_per_pixel));
        self.range != before
    }

    /// Starts a gesture on primary press. Other buttons only matter on
    /// release.
    pub fn press(&mut self, button: PointerButton, y: f64, pressed_item: Option<ItemId>) {
        if button != PointerButton::Primary {
            return;
        }
        self.gesture = DragGesture::Dragging {
            start_y: y,
            start_range: self.range,
            pressed_item,
            moved: false,
        };
    }

    /// Feeds a pointer move. Returns whether the view range changed.
    pub fn drag_to(&mut self, y: f64, seconds_per_pixel: f64) -> bool {
        let (start_y, start_range) = match &self.gesture {
            DragGesture::Dragging { start_y, start_range, .. } => (*start_y, *start_range),
            DragGesture::Idle => return false,
        };

        let delta = y - start_y;
        let changed = if delta != 0.0 {
            self.pan(delta, seconds_per_pixel)
        } else {
            let changed = self.range != start_range;
            self.range = start_range;
            changed
        };

        if let DragGesture::Dragging { moved, .. } = &mut self.gesture {
            *moved = delta != 0.0;
        }
        changed
    }

    pub fn release(&mut self, button: PointerButton) -> PointerRelease {
        match button {
            PointerButton::Primary => {
                match std::mem::replace(&mut self.gesture, DragGesture::Idle) {
                    DragGesture::Dragging { moved: false, pressed_item, .. } => {
                        PointerRelease::Click { item: pressed_item }
                    }
                    DragGesture::Dragging { moved: true, .. } => PointerRelease::Drag,
                    DragGesture::Idle => PointerRelease::Ignored,
                }
            }
            PointerButton::Secondary | PointerButton::Middle => PointerRelease::ResetZoom,
            _ => PointerRelease::Ignored,
        }
    }

    /// Forgets the item under the press, so a later release clicks the
    /// background instead. The gesture itself keeps going.
    pub fn forget_pressed_item(&mut self) {
        if let DragGesture::Dragging { pressed_item, .. } = &mut self.gesture {
            *pressed_item = None;
        }
    }

    /// Drops any gesture in progress without producing a click.
    pub fn cancel_gesture(&mut self) {
        self.gesture = DragGesture::Idle;
    }
}
