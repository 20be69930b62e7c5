use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::settings::GridConfig;
use crate::schedule::TimeInterval;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub index: usize,
    pub interval: TimeInterval,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        self.interval.start.format("%H:%M").to_string()
    }
}

/// The visible `[day at start hour, day at end hour)` window.
pub fn day_window(day: NaiveDate, config: &GridConfig) -> TimeInterval {
    TimeInterval::new(
        hour_of_day(day, config.window_start_hour),
        hour_of_day(day, config.window_end_hour),
    )
}

/// The part of [`day_window`] covered by whole slots. Equal to the day
/// window unless the window is not a multiple of the slot length.
pub fn slotted_window(day: NaiveDate, config: &GridConfig) -> TimeInterval {
    let window = day_window(day, config);
    let covered = Duration::minutes(config.slot_count() as i64 * config.slot_minutes as i64);
    TimeInterval::new(window.start, window.start + covered)
}

/// Contiguous slots of `slot_minutes` each. A trailing partial slot is not
/// emitted.
pub fn generate_slots(day: NaiveDate, config: &GridConfig) -> Vec<TimeSlot> {
    let window = day_window(day, config);
    let length = Duration::minutes(config.slot_minutes as i64);

    (0..config.slot_count())
        .map(|index| {
            let start = window.start + length * index as i32;
            TimeSlot {
                index,
                interval: TimeInterval::new(start, start + length),
            }
        })
        .collect()
}

fn hour_of_day(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    Utc.from_utc_datetime(&midnight) + Duration::hours(hour as i64)
}
