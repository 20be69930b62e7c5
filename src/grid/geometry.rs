use serde::{Deserialize, Serialize};

use super::settings::{GridConfig, HEIGHT_DAMPING};
use crate::schedule::TimeInterval;

/// Vertical placement of one appointment, in pixels from the window top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalGeometry {
    pub top: f64,
    pub height: f64,
    pub displayed: TimeInterval,
    pub clamped: bool,
}

pub fn minutes_to_px(minutes: f64, pixels_per_hour: f64) -> f64 {
    minutes / 60.0 * pixels_per_hour
}

/// Short events keep their natural height scaled by [`HEIGHT_DAMPING`]
/// instead of growing to `min_height`, so they never cross the next slot.
pub fn display_height(natural_height: f64, min_height: f64) -> f64 {
    if natural_height >= min_height {
        natural_height
    } else {
        min_height.min(natural_height * HEIGHT_DAMPING)
    }
}

/// Places `interval` inside `window`. Returns `None` when no part of the
/// interval is visible.
pub fn place_interval(
    interval: &TimeInterval,
    window: &TimeInterval,
    config: &GridConfig,
) -> Option<VerticalGeometry> {
    let displayed = interval.clamp_to(window)?;
    let offset_minutes = (displayed.start - window.start).num_seconds() as f64 / 60.0;
    let duration_minutes = (displayed.end - displayed.start).num_seconds() as f64 / 60.0;

    let natural_height = minutes_to_px(duration_minutes, config.pixels_per_hour);

    Some(VerticalGeometry {
        top: minutes_to_px(offset_minutes, config.pixels_per_hour),
        height: display_height(natural_height, config.min_event_height_px),
        displayed,
        clamped: displayed != *interval,
    })
}
