//! 时间轴模块
//!
//! Stateless mapping between instants and vertical pixel positions, plus the
//! tick placement policy.
//!
//! Pixel positions are measured from the top of the timeline area. The axis
//! reserves `edge_thickness + edge_padding` pixels at both the top and the
//! bottom so that the first and last instants of the view do not sit on the
//! "T" caps.

use crate::structure::{add_delta, delta_to_seconds, seconds_to_delta, ViewRange};
use chrono::{DateTime, TimeDelta, Utc};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeAxis {
    pub edge_thickness: f64,
    pub edge_padding: f64,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            edge_thickness: 2.0,
            edge_padding: 15.0,
        }
    }
}

/// A gridline on the axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub time: DateTime<Utc>,
    pub y: f64,
}

impl TimeAxis {
    pub fn new(edge_thickness: f64, edge_padding: f64) -> Self {
        Self {
            edge_thickness,
            edge_padding,
        }
    }

    /// Distance from the top of the area to the pixel showing `range.start`.
    pub fn edge_offset(&self) -> f64 {
        self.edge_thickness + self.edge_padding
    }

    /// Height left for the range once both edges are reserved.
    pub fn usable_height(&self, pixel_height: f64) -> f64 {
        pixel_height - 2.0 * self.edge_offset()
    }

    /// Returns `0.0` when the area is too small or the range is empty. Callers
    /// treat zero as "not measured yet" and skip all position math.
    pub fn seconds_per_pixel(&self, range: &ViewRange, pixel_height: f64) -> f64 {
        let usable = self.usable_height(pixel_height);
        let seconds = delta_to_seconds(range.duration());

        if usable <= 0.0 || seconds <= 0.0 {
            return 0.0;
        }
        seconds / usable
    }

    pub fn position_of(&self, time: DateTime<Utc>, range: &ViewRange, seconds_per_pixel: f64) -> f64 {
        if seconds_per_pixel <= 0.0 {
            return self.edge_offset();
        }
        self.edge_offset() + delta_to_seconds(time - range.start) / seconds_per_pixel
    }

    /// Inverse of [`TimeAxis::position_of`].
    pub fn time_at(&self, y: f64, range: &ViewRange, seconds_per_pixel: f64) -> DateTime<Utc> {
        let seconds = (y - self.edge_offset()) * seconds_per_pixel;
        add_delta(range.start, seconds_to_delta(seconds))
    }

    /// Tick gridlines for the range, starting at the first multiple of the
    /// spacing at or after `range.start`.
    ///
    /// `grid_offset` is the display zone's UTC offset; the grid is aligned in
    /// wall-clock time so that labels land on round values. Pass
    /// `TimeDelta::zero()` for a pure epoch grid.
    pub fn ticks(&self, range: &ViewRange, seconds_per_pixel: f64, grid_offset: TimeDelta) -> Vec<Tick> {
        let mut ticks = Vec::new();
        if seconds_per_pixel <= 0.0 || range.end < range.start {
            return ticks;
        }

        let spacing = tick_spacing(range.duration());
        let first = add_delta(round_up_to_grid(add_delta(range.start, grid_offset), spacing), -grid_offset);

        let mut y = self.position_of(first, range, seconds_per_pixel);
        let mut previous = first;
        let mut time = first;

        while time <= range.end {
            if time != first {
                y += delta_to_seconds(time - previous) / seconds_per_pixel;
            }
            ticks.push(Tick { time, y });
            previous = time;

            match time.checked_add_signed(spacing) {
                Some(next) => time = next,
                None => break,
            }
        }

        ticks
    }
}

/// Gridline interval for a visible duration.
///
/// An explicit table, tuned so that roughly 4 to 20 ticks are on screen at
/// every zoom level the viewport allows.
pub fn tick_spacing(duration: TimeDelta) -> TimeDelta {
    if duration <= TimeDelta::minutes(10) {
        TimeDelta::minutes(1)
    } else if duration <= TimeDelta::minutes(30) {
        TimeDelta::minutes(5)
    } else if duration <= TimeDelta::hours(3) {
        TimeDelta::minutes(15)
    } else if duration <= TimeDelta::hours(6) {
        TimeDelta::minutes(30)
    } else if duration <= TimeDelta::days(1) {
        TimeDelta::hours(1)
    } else if duration <= TimeDelta::days(3) {
        TimeDelta::hours(3)
    } else {
        TimeDelta::hours(6)
    }
}

/// Rounds `time` up to the next exact multiple of `spacing` counted from the
/// Unix epoch. Integer nanosecond arithmetic, so the result is exact.
///
/// A non-positive spacing returns `time` unchanged.
pub fn round_up_to_grid(time: DateTime<Utc>, spacing: TimeDelta) -> DateTime<Utc> {
    let spacing_ticks = match spacing.num_nanoseconds() {
        Some(n) if n > 0 => n as i128,
        _ => return time,
    };

    let time_ticks = time.timestamp() as i128 * NANOS_PER_SECOND + time.timestamp_subsec_nanos() as i128;
    let rounded = ceil_div(time_ticks, spacing_ticks) * spacing_ticks;

    let secs = rounded.div_euclid(NANOS_PER_SECOND);
    let nanos = rounded.rem_euclid(NANOS_PER_SECOND);

    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, nanos as u32))
        .unwrap_or(time)
}

fn ceil_div(value: i128, divisor: i128) -> i128 {
    -((-value).div_euclid(divisor))
}
