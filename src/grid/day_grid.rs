use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::columns::{ColumnLayout, ColumnSpan};
use super::coverage::{build_cell, overlapping_shifts, GridCell};
use super::geometry::{minutes_to_px, place_interval};
use super::settings::{GridConfig, GridConfigError};
use super::slots::{generate_slots, slotted_window, TimeSlot};
use crate::schedule::{Appointment, Resource, TimeInterval, WorkShift};

/// Everything the presentation layer needs to draw one day. Plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGridModel {
    pub day: NaiveDate,
    pub window: TimeInterval,
    pub pixels_per_hour: f64,
    pub slots: Vec<TimeSlot>,
    pub resources: Vec<Resource>,
    pub columns: Vec<ColumnSpan>,
    /// Indexed `[slot][resource]`.
    pub cells: Vec<Vec<GridCell>>,
    pub placed_appointments: Vec<PlacedAppointment>,
    pub issues: Vec<LayoutIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAppointment {
    pub appointment: Appointment,
    pub resource_index: usize,
    pub top: f64,
    pub height: f64,
    pub column: ColumnSpan,
    pub displayed: TimeInterval,
    pub clamped: bool,
}

/// Data-quality findings. Reported, never repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutIssue {
    MalformedShift { resource_id: String, shift_index: usize },
    OverlappingShifts { resource_id: String, first: usize, second: usize },
    MalformedAppointment { appointment_id: String },
    UnselectedResource { appointment_id: String, resource_id: String },
    OutsideWindow { appointment_id: String },
    DoubleBooking { resource_id: String, first: String, second: String },
}

impl LayoutIssue {
    pub fn describe(&self) -> String {
        match self {
            Self::MalformedShift { resource_id, shift_index } => {
                format!("shift #{} of {} has no length and was skipped", shift_index, resource_id)
            }
            Self::OverlappingShifts { resource_id, first, second } => {
                format!("shifts #{} and #{} of {} overlap; the first one is shown", first, second, resource_id)
            }
            Self::MalformedAppointment { appointment_id } => {
                format!("appointment {} has no length and was skipped", appointment_id)
            }
            Self::UnselectedResource { appointment_id, resource_id } => {
                format!("appointment {} belongs to {} which is not displayed", appointment_id, resource_id)
            }
            Self::OutsideWindow { appointment_id } => {
                format!("appointment {} lies outside the visible hours", appointment_id)
            }
            Self::DoubleBooking { resource_id, first, second } => {
                format!("appointments {} and {} of {} overlap", first, second, resource_id)
            }
        }
    }
}

/// Lays out one day for the selected resources.
///
/// Only invalid configuration is an error. Bad records are left out of the
/// layout and listed in [`ScheduleGridModel::issues`].
pub fn compute_schedule_grid(
    day: NaiveDate,
    resources: &[Resource],
    shifts: &[WorkShift],
    appointments: &[Appointment],
    config: &GridConfig,
) -> Result<ScheduleGridModel, GridConfigError> {
    config.validate()?;

    let window = slotted_window(day, config);
    let slots = generate_slots(day, config);
    let columns = ColumnLayout::new(resources);
    let mut issues = shift_issues(resources, shifts);

    let cells = slots
        .iter()
        .map(|slot| {
            resources
                .iter()
                .map(|resource| build_cell(slot, resource, shifts))
                .collect()
        })
        .collect();

    let placed_appointments = place_appointments(day, &window, &columns, appointments, config, &mut issues);
    issues.extend(double_bookings(&placed_appointments, config));

    for issue in &issues {
        tracing::warn!("{}: {}", day, issue.describe());
    }
    tracing::debug!(
        "Laid out {} with {} slots, {} resources, {} appointments",
        day,
        slots.len(),
        resources.len(),
        placed_appointments.len()
    );

    Ok(ScheduleGridModel {
        day,
        window,
        pixels_per_hour: config.pixels_per_hour,
        slots,
        resources: resources.to_vec(),
        columns: columns.spans(),
        cells,
        placed_appointments,
        issues,
    })
}

fn shift_issues(resources: &[Resource], shifts: &[WorkShift]) -> Vec<LayoutIssue> {
    let displayed = |resource_id: &str| resources.iter().any(|r| r.id == resource_id);
    let mut issues = Vec::new();

    for (index, shift) in shifts.iter().enumerate() {
        if displayed(&shift.resource_id) && !shift.interval.is_well_formed() {
            issues.push(LayoutIssue::MalformedShift {
                resource_id: shift.resource_id.clone(),
                shift_index: index,
            });
        }
    }

    for (first, second) in overlapping_shifts(shifts) {
        let resource_id = &shifts[first].resource_id;
        if displayed(resource_id) {
            issues.push(LayoutIssue::OverlappingShifts {
                resource_id: resource_id.clone(),
                first,
                second,
            });
        }
    }

    issues
}

fn place_appointments(
    day: NaiveDate,
    window: &TimeInterval,
    columns: &ColumnLayout,
    appointments: &[Appointment],
    config: &GridConfig,
    issues: &mut Vec<LayoutIssue>,
) -> Vec<PlacedAppointment> {
    let whole_day = calendar_day(day);
    let mut placed = Vec::new();

    for appointment in appointments {
        let Some(interval) = appointment.effective_interval(config.default_duration_minutes as i64) else {
            issues.push(LayoutIssue::MalformedAppointment {
                appointment_id: appointment.id.clone(),
            });
            continue;
        };

        if !interval.overlaps(&whole_day) {
            continue;
        }

        let Some((resource_index, column)) = columns.span_for(&appointment.resource_id) else {
            issues.push(LayoutIssue::UnselectedResource {
                appointment_id: appointment.id.clone(),
                resource_id: appointment.resource_id.clone(),
            });
            continue;
        };

        let Some(geometry) = place_interval(&interval, window, config) else {
            issues.push(LayoutIssue::OutsideWindow {
                appointment_id: appointment.id.clone(),
            });
            continue;
        };

        placed.push(PlacedAppointment {
            appointment: appointment.clone(),
            resource_index,
            top: geometry.top,
            height: geometry.height,
            column,
            displayed: geometry.displayed,
            clamped: geometry.clamped,
        });
    }

    placed
}

fn double_bookings(placed: &[PlacedAppointment], config: &GridConfig) -> Vec<LayoutIssue> {
    let default_minutes = config.default_duration_minutes as i64;
    let mut issues = Vec::new();

    for (i, a) in placed.iter().enumerate() {
        for b in placed.iter().skip(i + 1) {
            if a.resource_index != b.resource_index {
                continue;
            }
            let (Some(first), Some(second)) = (
                a.appointment.effective_interval(default_minutes),
                b.appointment.effective_interval(default_minutes),
            ) else {
                continue;
            };
            if first.overlaps(&second) {
                issues.push(LayoutIssue::DoubleBooking {
                    resource_id: a.appointment.resource_id.clone(),
                    first: a.appointment.id.clone(),
                    second: b.appointment.id.clone(),
                });
            }
        }
    }

    issues
}

fn calendar_day(day: NaiveDate) -> TimeInterval {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    TimeInterval::new(start, start + Duration::days(1))
}

impl ScheduleGridModel {
    pub fn cell(&self, slot_index: usize, resource_index: usize) -> Option<&GridCell> {
        self.cells.get(slot_index)?.get(resource_index)
    }

    pub fn appointments_for<'a>(&'a self, resource_id: &'a str) -> impl Iterator<Item = &'a PlacedAppointment> + 'a {
        self.placed_appointments
            .iter()
            .filter(move |placed| placed.appointment.resource_id == resource_id)
    }

    /// Appointments whose visible part begins inside `slot`.
    pub fn starting_in<'a>(&'a self, slot: &'a TimeSlot) -> impl Iterator<Item = &'a PlacedAppointment> + 'a {
        self.placed_appointments
            .iter()
            .filter(move |placed| slot.interval.covers(placed.displayed.start))
    }

    pub fn total_height_px(&self) -> f64 {
        let minutes = (self.window.end - self.window.start).num_minutes() as f64;
        minutes_to_px(minutes, self.pixels_per_hour)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
