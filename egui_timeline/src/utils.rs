//! 工具函数模块
//!
//! Time formatting helpers used for tick and item labels.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Formats an instant as "HH:MM" in `zone`, the tick label format.
pub fn format_tick_time(time: DateTime<Utc>, zone: Tz) -> String {
    time.with_timezone(&zone).format("%H:%M").to_string()
}

/// Formats an instant as "HH:MM:SS" in `zone`.
///
/// # 示例
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use egui_timeline::utils::format_clock_time;
///
/// let time = Utc.with_ymd_and_hms(2024, 3, 14, 9, 5, 30).unwrap();
/// assert_eq!(format_clock_time(time, chrono_tz::Tz::UTC), "09:05:30");
/// ```
pub fn format_clock_time(time: DateTime<Utc>, zone: Tz) -> String {
    time.with_timezone(&zone).format("%H:%M:%S").to_string()
}

/// Formats an offset from T-zero.
///
/// Zero prints as "00:00:00", later times get a "+" and earlier ones a "-".
/// Hours are not wrapped at 24.
pub fn format_relative_time(offset: TimeDelta) -> String {
    let total = offset.num_seconds();
    let sign = match total.signum() {
        1 => "+",
        -1 => "-",
        _ => "",
    };
    let total = total.unsigned_abs();
    format!("{}{:02}:{:02}:{:02}", sign, total / 3600, (total / 60) % 60, total % 60)
}

/// The first instant of the calendar day containing `now`, in `now`'s zone.
///
/// Falls back to `now` itself if midnight does not exist in that zone.
pub fn start_of_day<Z: TimeZone>(now: &DateTime<Z>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(now.timezone()).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}
