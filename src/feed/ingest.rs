use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::source::DaySnapshot;
use crate::schedule::{infer_end, Appointment, AppointmentStatus, Resource, TimeInterval, WorkShift};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid {field} time '{value}' on {record}")]
    MalformedInstant {
        record: String,
        field: &'static str,
        value: String,
    },
    #[error("Unknown appointment status {value} on {record}")]
    UnknownStatus { record: String, value: String },
    #[error("Duration of {minutes} minutes on {record} is out of range")]
    DurationOutOfRange { record: String, minutes: i64 },
}

/// Status as the data layer sends it: a numeric code or a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    Code(i64),
    Name(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResource {
    pub id: String,
    pub display_name: String,
    pub practice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShift {
    pub therapist_id: String,
    pub start: String,
    pub end: String,
    pub practice_id: String,
    pub practice_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAppointment {
    pub id: String,
    pub therapist_id: String,
    pub patient: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<i64>,
    #[serde(rename = "type", default)]
    pub type_label: String,
    pub notes: Option<String>,
    pub status: Option<RawStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDaySnapshot {
    pub day: Option<NaiveDate>,
    #[serde(default)]
    pub resources: Vec<RawResource>,
    #[serde(default)]
    pub shifts: Vec<RawShift>,
    #[serde(default)]
    pub appointments: Vec<RawAppointment>,
}

/// Outcome of normalizing a raw snapshot: the usable records plus the
/// rejected ones.
#[derive(Debug)]
pub struct IngestReport {
    pub day: Option<NaiveDate>,
    pub snapshot: DaySnapshot,
    pub rejected: Vec<IngestError>,
}

pub fn parse_instant(record: &str, field: &'static str, value: &str) -> Result<DateTime<Utc>, IngestError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| IngestError::MalformedInstant {
            record: record.to_string(),
            field,
            value: value.to_string(),
        })
}

pub fn normalize_status(record: &str, raw: Option<&RawStatus>) -> Result<AppointmentStatus, IngestError> {
    let status = match raw {
        None => Some(AppointmentStatus::Scheduled),
        Some(RawStatus::Code(code)) => AppointmentStatus::from_code(*code),
        Some(RawStatus::Name(name)) => AppointmentStatus::from_name(name),
    };
    status.ok_or_else(|| IngestError::UnknownStatus {
        record: record.to_string(),
        value: match raw {
            Some(RawStatus::Code(code)) => code.to_string(),
            Some(RawStatus::Name(name)) => format!("'{}'", name),
            None => String::new(),
        },
    })
}

impl From<RawResource> for Resource {
    fn from(raw: RawResource) -> Self {
        Resource {
            id: raw.id,
            display_name: raw.display_name,
            practice_affiliation: raw.practice,
        }
    }
}

impl TryFrom<RawShift> for WorkShift {
    type Error = IngestError;

    fn try_from(raw: RawShift) -> Result<Self, Self::Error> {
        let record = format!("shift of {}", raw.therapist_id);
        let start = parse_instant(&record, "start", &raw.start)?;
        let end = parse_instant(&record, "end", &raw.end)?;
        Ok(WorkShift {
            resource_id: raw.therapist_id,
            interval: TimeInterval::new(start, end),
            practice_id: raw.practice_id,
            practice_color: raw.practice_color,
        })
    }
}

impl TryFrom<RawAppointment> for Appointment {
    type Error = IngestError;

    fn try_from(raw: RawAppointment) -> Result<Self, Self::Error> {
        let record = format!("appointment {}", raw.id);
        let start = parse_instant(&record, "start", &raw.start)?;
        let end = raw
            .end
            .as_deref()
            .map(|value| parse_instant(&record, "end", value))
            .transpose()?;
        if let Some(minutes) = raw.duration
            && infer_end(start, None, Some(minutes), minutes).is_none()
        {
            return Err(IngestError::DurationOutOfRange { record, minutes });
        }
        let status = normalize_status(&record, raw.status.as_ref())?;
        Ok(Appointment {
            id: raw.id,
            resource_id: raw.therapist_id,
            patient_ref: raw.patient,
            start,
            end,
            duration_minutes: raw.duration,
            type_label: raw.type_label,
            notes: raw.notes,
            status,
        })
    }
}

impl RawDaySnapshot {
    pub fn from_json(content: &str) -> Result<Self, IngestError> {
        serde_json::from_str(content).map_err(IngestError::from)
    }

    /// Normalizes every record. A record that cannot be read is rejected on
    /// its own; the rest of the day still loads.
    pub fn normalize(self) -> IngestReport {
        let mut rejected = Vec::new();
        let mut snapshot = DaySnapshot {
            resources: self.resources.into_iter().map(Resource::from).collect(),
            ..DaySnapshot::default()
        };

        for raw in self.shifts {
            match WorkShift::try_from(raw) {
                Ok(shift) => snapshot.shifts.push(shift),
                Err(e) => {
                    tracing::warn!("Skipping shift: {}", e);
                    rejected.push(e);
                }
            }
        }

        for raw in self.appointments {
            match Appointment::try_from(raw) {
                Ok(appointment) => snapshot.appointments.push(appointment),
                Err(e) => {
                    tracing::warn!("Skipping appointment: {}", e);
                    rejected.push(e);
                }
            }
        }

        IngestReport {
            day: self.day,
            snapshot,
            rejected,
        }
    }
}

pub fn ingest_json(content: &str) -> Result<IngestReport, IngestError> {
    Ok(RawDaySnapshot::from_json(content)?.normalize())
}
