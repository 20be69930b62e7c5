use crate::grid::{ScheduleGridModel, TimeSlot};

const COLUMN_WIDTH: usize = 24;
const LABEL_WIDTH: usize = 8;

/// Plain-text rendering of a day grid: one row per slot, one column per
/// therapist.
pub fn render_day_grid(model: &ScheduleGridModel, time_format: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Schedule – {}", model.day.format("%A, %B %d, %Y")));
    lines.push(String::new());

    if model.is_empty() {
        lines.push("No therapists selected.".to_string());
        return lines.join("\n");
    }

    let mut header = pad("", LABEL_WIDTH);
    for resource in &model.resources {
        header.push_str(&pad(&resource.display_name, COLUMN_WIDTH));
    }
    lines.push(header.trim_end().to_string());

    for slot in &model.slots {
        lines.push(render_row(model, slot, time_format));
    }

    if !model.issues.is_empty() {
        lines.push(String::new());
        lines.push("Data issues:".to_string());
        for issue in &model.issues {
            lines.push(format!("- {}", issue.describe()));
        }
    }

    lines.join("\n")
}

fn render_row(model: &ScheduleGridModel, slot: &TimeSlot, time_format: &str) -> String {
    let mut row = pad(&slot.interval.start.format(time_format).to_string(), LABEL_WIDTH);

    for (resource_index, cell) in model.cells[slot.index].iter().enumerate() {
        let starting: Vec<String> = model
            .starting_in(slot)
            .filter(|placed| placed.resource_index == resource_index)
            .map(|placed| {
                format!(
                    "{}-{} {}",
                    placed.displayed.start.format(time_format),
                    placed.displayed.end.format(time_format),
                    placed.appointment.patient_ref
                )
            })
            .collect();

        let text = if !starting.is_empty() {
            starting.join(" / ")
        } else if let Some(practice) = cell.practice_id() {
            format!("· {}", practice)
        } else {
            String::new()
        };
        row.push_str(&pad(&text, COLUMN_WIDTH));
    }

    row.trim_end().to_string()
}

fn pad(text: &str, width: usize) -> String {
    let mut cell = truncate_to_width(text, width.saturating_sub(1));
    let used = cell.chars().count();
    cell.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    cell
}

fn truncate_to_width(line: &str, width: usize) -> String {
    if width > 0 && line.chars().count() > width {
        let mut truncated = line.chars().take(width.saturating_sub(1)).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{compute_schedule_grid, GridConfig};
    use crate::schedule::{Appointment, AppointmentStatus, Resource, TimeInterval, WorkShift};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn model() -> ScheduleGridModel {
        let resources = vec![Resource::new("t1", "Dana Weiss"), Resource::new("t2", "Ilan Cohen")];
        let shifts = vec![WorkShift {
            resource_id: "t1".to_string(),
            interval: TimeInterval::new(
                Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
            ),
            practice_id: "north".to_string(),
            practice_color: "#33b679".to_string(),
        }];
        let appointments = vec![Appointment {
            id: "a1".to_string(),
            resource_id: "t1".to_string(),
            patient_ref: "Jane Roe".to_string(),
            start: Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
            end: None,
            duration_minutes: None,
            type_label: "Follow-up".to_string(),
            notes: None,
            status: AppointmentStatus::Scheduled,
        }];
        compute_schedule_grid(day(), &resources, &shifts, &appointments, &GridConfig::default()).unwrap()
    }

    #[test]
    fn renders_title_and_headers() {
        let text = render_day_grid(&model(), "%H:%M");

        assert!(text.starts_with("Schedule – Monday, March 10, 2025"));
        assert!(text.contains("Dana Weiss"));
        assert!(text.contains("Ilan Cohen"));
    }

    #[test]
    fn renders_one_row_per_slot() {
        let text = render_day_grid(&model(), "%H:%M");

        let rows = text.lines().filter(|line| line.len() >= 5 && line.as_bytes()[2] == b':').count();
        assert_eq!(rows, 30);
    }

    #[test]
    fn appointment_appears_in_its_start_row() {
        let text = render_day_grid(&model(), "%H:%M");

        let row = text.lines().find(|line| line.starts_with("10:00")).unwrap();
        assert!(row.contains("10:00-10:30 Jane Roe"));
    }

    #[test]
    fn covered_slot_shows_practice() {
        let text = render_day_grid(&model(), "%H:%M");

        let row = text.lines().find(|line| line.starts_with("09:30")).unwrap();
        assert!(row.contains("· north"));
        let off_duty = text.lines().find(|line| line.starts_with("08:00")).unwrap();
        assert_eq!(off_duty.trim_end(), "08:00");
    }

    #[test]
    fn empty_selection_shows_placeholder() {
        let empty = compute_schedule_grid(day(), &[], &[], &[], &GridConfig::default()).unwrap();

        let text = render_day_grid(&empty, "%H:%M");

        assert!(text.contains("No therapists selected."));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate_to_width("Alexandria Montgomery", 10), "Alexandri…");
        assert_eq!(pad("Ann", 6), "Ann   ");
    }
}
