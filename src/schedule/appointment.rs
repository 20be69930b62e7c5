use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::{infer_end, TimeInterval};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub resource_id: String,
    pub patient_ref: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub type_label: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Scheduled),
            1 => Some(Self::Completed),
            2 => Some(Self::Cancelled),
            3 => Some(Self::NoShow),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "scheduled" | "booked" => Some(Self::Scheduled),
            "completed" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "no_show" | "noshow" => Some(Self::NoShow),
            _ => None,
        }
    }
}

impl Appointment {
    /// The interval the grid lays out. Missing ends are filled in by
    /// [`infer_end`]; the stored record is never touched. `None` for empty,
    /// inverted or out-of-range intervals.
    pub fn effective_interval(&self, default_duration_minutes: i64) -> Option<TimeInterval> {
        let end = infer_end(
            self.start,
            self.end,
            self.duration_minutes,
            default_duration_minutes,
        )?;
        let interval = TimeInterval::new(self.start, end);
        interval.is_well_formed().then_some(interval)
    }
}
