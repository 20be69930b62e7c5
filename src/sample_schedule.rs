use chrono::{Duration, NaiveDate, NaiveTime};
use clinic_grid::{
    feed::DaySnapshot,
    schedule::{Appointment, AppointmentStatus, Resource, TimeInterval, WorkShift},
};

pub fn sample_day(day: NaiveDate) -> DaySnapshot {
    let at = |hour: u32, minute: u32| {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        day.and_time(time).and_utc()
    };

    let resources = vec![
        Resource::new("t1", "Dana Weiss").with_practice("north"),
        Resource::new("t2", "Ilan Cohen").with_practice("south"),
        Resource::new("t3", "Mara Levi"),
    ];

    let shifts = vec![
        ("t1", 8, 0, 12, 0, "north", "#33b679"),
        ("t1", 13, 0, 17, 0, "south", "#e67c73"),
        ("t2", 10, 0, 18, 30, "south", "#e67c73"),
    ]
    .into_iter()
    .map(|(id, sh, sm, eh, em, practice, color)| WorkShift {
        resource_id: id.to_string(),
        interval: TimeInterval::new(at(sh, sm), at(eh, em)),
        practice_id: practice.to_string(),
        practice_color: color.to_string(),
    })
    .collect();

    let appointments = vec![
        ("s1", "t1", "Jane Roe", 8, 30, Some(60), "Initial assessment"),
        ("s2", "t1", "John Poe", 10, 0, None, "Follow-up"),
        ("s3", "t1", "Ann Moe", 14, 15, Some(10), "Phone check-in"),
        ("s4", "t2", "Lee Doe", 11, 0, Some(45), "Manual therapy"),
        ("s5", "t2", "Sam Roe", 20, 45, None, "Late follow-up"),
    ]
    .into_iter()
    .map(|(id, resource, patient, hour, minute, duration, kind)| Appointment {
        id: id.to_string(),
        resource_id: resource.to_string(),
        patient_ref: patient.to_string(),
        start: at(hour, minute),
        end: duration.map(|d| at(hour, minute) + Duration::minutes(d)),
        duration_minutes: duration,
        type_label: kind.to_string(),
        notes: Some("Sample appointment".to_string()),
        status: AppointmentStatus::Scheduled,
    })
    .collect();

    DaySnapshot {
        resources,
        shifts,
        appointments,
    }
}
