use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::FALLBACK_DURATION_MINUTES;

/// Damping applied to short events so they never spill past their own end.
pub const HEIGHT_DAMPING: f64 = 0.98;

#[derive(Debug, Error, PartialEq)]
pub enum GridConfigError {
    #[error("Window end hour {end} must be after start hour {start}")]
    EmptyWindow { start: u32, end: u32 },
    #[error("Window end hour {0} is past midnight")]
    WindowPastMidnight(u32),
    #[error("Slot length must be at least one minute")]
    ZeroSlotLength,
    #[error("Pixels per hour must be a positive number, got {0}")]
    InvalidScale(f64),
    #[error("Minimum event height must be non-negative, got {0}")]
    InvalidMinHeight(f64),
    #[error("Default appointment duration must be at least one minute")]
    ZeroDefaultDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    pub window_start_hour: u32,
    pub window_end_hour: u32,
    pub slot_minutes: u32,
    pub pixels_per_hour: f64,
    pub min_event_height_px: f64,
    pub default_duration_minutes: u32,
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if self.window_end_hour <= self.window_start_hour {
            return Err(GridConfigError::EmptyWindow {
                start: self.window_start_hour,
                end: self.window_end_hour,
            });
        }
        if self.window_end_hour > 24 {
            return Err(GridConfigError::WindowPastMidnight(self.window_end_hour));
        }
        if self.slot_minutes == 0 {
            return Err(GridConfigError::ZeroSlotLength);
        }
        if !self.pixels_per_hour.is_finite() || self.pixels_per_hour <= 0.0 {
            return Err(GridConfigError::InvalidScale(self.pixels_per_hour));
        }
        if !self.min_event_height_px.is_finite() || self.min_event_height_px < 0.0 {
            return Err(GridConfigError::InvalidMinHeight(self.min_event_height_px));
        }
        if self.default_duration_minutes == 0 {
            return Err(GridConfigError::ZeroDefaultDuration);
        }
        Ok(())
    }

    pub fn window_minutes(&self) -> u32 {
        self.window_end_hour.saturating_sub(self.window_start_hour) * 60
    }

    pub fn slot_count(&self) -> usize {
        if self.slot_minutes == 0 {
            return 0;
        }
        (self.window_minutes() / self.slot_minutes) as usize
    }

    /// True when the window is not a whole number of slots and the last
    /// partial slot would be dropped.
    pub fn truncates_window(&self) -> bool {
        self.slot_minutes != 0 && self.window_minutes() % self.slot_minutes != 0
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            window_start_hour: 6,
            window_end_hour: 21,
            slot_minutes: 30,
            pixels_per_hour: 80.0,
            min_event_height_px: 36.0,
            default_duration_minutes: FALLBACK_DURATION_MINUTES as u32,
        }
    }
}
