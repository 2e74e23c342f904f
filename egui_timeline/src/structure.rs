//! 数据结构模块
//!
//! Core data types shared by the axis, viewport, layout and render modules:
//! timeline items, their ids, the visible view range and the zoom limits.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static ITEM_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Narrowest view the viewport allows, in seconds.
pub const MIN_VIEW_SECONDS: i64 = 60;
/// Widest view the viewport allows, in seconds (3 days).
pub const MAX_VIEW_SECONDS: i64 = 3 * 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl ItemId {
    pub fn next() -> Self {
        ItemId(ITEM_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A single event on the timeline.
///
/// `time` is an absolute instant. The document time zone is only applied when
/// the item is formatted for display.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineItem {
    pub id: ItemId,
    pub time: DateTime<Utc>,
    pub label: String,
    pub is_approximate: bool,
    pub is_important: bool,
}

impl TimelineItem {
    pub fn new(time: DateTime<Utc>, label: impl Into<String>) -> Self {
        Self {
            id: ItemId::next(),
            time,
            label: label.into(),
            is_approximate: false,
            is_important: false,
        }
    }

    pub fn approximate(mut self, is_approximate: bool) -> Self {
        self.is_approximate = is_approximate;
        self
    }

    pub fn important(mut self, is_important: bool) -> Self {
        self.is_important = is_important;
        self
    }
}

/// The `[start, end]` pair of instants currently visible on the axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ViewRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A range of `duration` centred on `center`.
    pub fn centered_on(center: DateTime<Utc>, duration: TimeDelta) -> Self {
        let start = add_delta(center, -(duration / 2));
        Self {
            start,
            end: add_delta(start, duration),
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn center(&self) -> DateTime<Utc> {
        add_delta(self.start, self.duration() / 2)
    }

    /// Inclusive at both ends.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn shifted(&self, delta: TimeDelta) -> Self {
        Self {
            start: add_delta(self.start, delta),
            end: add_delta(self.end, delta),
        }
    }
}

/// Duration bounds every viewport operation clamps into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomLimits {
    pub min_duration: TimeDelta,
    pub max_duration: TimeDelta,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_duration: TimeDelta::seconds(MIN_VIEW_SECONDS),
            max_duration: TimeDelta::seconds(MAX_VIEW_SECONDS),
        }
    }
}

impl ZoomLimits {
    /// Clamps the duration of `[start, end]` into the limits, keeping the
    /// midpoint of the requested range where it was.
    ///
    /// Ranges already inside the limits are returned untouched. A reversed
    /// range (`end < start`) counts as shorter than the minimum.
    pub fn clamp(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ViewRange {
        let requested = ViewRange::new(start, end);
        let duration = requested.duration();

        if duration < self.min_duration {
            ViewRange::centered_on(requested.center(), self.min_duration)
        } else if duration > self.max_duration {
            ViewRange::centered_on(requested.center(), self.max_duration)
        } else {
            requested
        }
    }

    pub fn contains(&self, duration: TimeDelta) -> bool {
        self.min_duration <= duration && duration <= self.max_duration
    }
}

/// Adds a signed delta, saturating at the representable range instead of
/// panicking.
pub(crate) fn add_delta(time: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    time.checked_add_signed(delta).unwrap_or(if delta < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Converts fractional seconds into a nanosecond-precision delta.
pub fn seconds_to_delta(seconds: f64) -> TimeDelta {
    TimeDelta::nanoseconds((seconds * 1e9).round() as i64)
}

/// Converts a delta into fractional seconds.
pub fn delta_to_seconds(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
