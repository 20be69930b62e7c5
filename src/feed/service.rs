use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::notify::{ChangeFeed, ScheduleChange};
use crate::schedule::{Appointment, WorkShift};
use crate::storage::store::{ScheduleStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Schedule store is unavailable")]
    Unavailable,
}

/// Persists appointment edits and tells every subscriber to refetch.
pub struct AppointmentService {
    store: Arc<Mutex<ScheduleStore>>,
    feed: ChangeFeed,
}

impl AppointmentService {
    pub fn new(store: Arc<Mutex<ScheduleStore>>, feed: ChangeFeed) -> Self {
        Self { store, feed }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub fn create_appointment(&self, draft: &Appointment) -> Result<Appointment, ServiceError> {
        let created = self.with_store(|store| store.create_appointment(draft))?;
        tracing::info!("Created appointment {} for {}", created.id, created.resource_id);
        self.feed.publish(ScheduleChange::AppointmentCreated {
            id: created.id.clone(),
            resource_id: created.resource_id.clone(),
            day: created.start.date_naive(),
        });
        Ok(created)
    }

    /// A move to another day or therapist also notifies viewers of the old slot.
    pub fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment, ServiceError> {
        let (previous, updated) = self.with_store(|store| {
            let previous = store.load_appointment(&appointment.id)?;
            let updated = store.update_appointment(appointment)?;
            Ok((previous, updated))
        })?;
        tracing::info!("Updated appointment {}", updated.id);

        if let Some(previous) = previous
            && (previous.start.date_naive() != updated.start.date_naive()
                || previous.resource_id != updated.resource_id)
        {
            self.feed.publish(ScheduleChange::AppointmentDeleted {
                id: previous.id,
                resource_id: previous.resource_id,
                day: previous.start.date_naive(),
            });
        }
        self.feed.publish(ScheduleChange::AppointmentUpdated {
            id: updated.id.clone(),
            resource_id: updated.resource_id.clone(),
            day: updated.start.date_naive(),
        });
        Ok(updated)
    }

    pub fn delete_appointment(&self, id: &str) -> Result<Appointment, ServiceError> {
        let removed = self.with_store(|store| store.delete_appointment(id))?;
        tracing::info!("Deleted appointment {}", removed.id);
        self.feed.publish(ScheduleChange::AppointmentDeleted {
            id: removed.id.clone(),
            resource_id: removed.resource_id.clone(),
            day: removed.start.date_naive(),
        });
        Ok(removed)
    }

    pub fn add_shift(&self, shift: &WorkShift) -> Result<i64, ServiceError> {
        let id = self.with_store(|store| store.insert_shift(shift))?;
        self.feed.publish(ScheduleChange::RosterChanged {
            day: shift.interval.start.date_naive(),
        });
        Ok(id)
    }

    fn with_store<T>(
        &self,
        op: impl FnOnce(&ScheduleStore) -> Result<T, StoreError>,
    ) -> Result<T, ServiceError> {
        let store = self.store.lock().map_err(|_| ServiceError::Unavailable)?;
        Ok(op(&store)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{AppointmentStatus, TimeInterval};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn create_service() -> AppointmentService {
        let store = ScheduleStore::open_in_memory().unwrap();
        AppointmentService::new(Arc::new(Mutex::new(store)), ChangeFeed::new())
    }

    fn draft(resource_id: &str, start: DateTime<Utc>) -> Appointment {
        Appointment {
            id: String::new(),
            resource_id: resource_id.to_string(),
            patient_ref: "Jane Roe".to_string(),
            start,
            end: None,
            duration_minutes: None,
            type_label: "Follow-up".to_string(),
            notes: None,
            status: AppointmentStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn create_publishes_change_for_its_day() {
        let service = create_service();
        let mut changes = service.feed().subscribe();

        let created = service.create_appointment(&draft("t1", at(10, 9))).unwrap();

        assert_eq!(
            changes.recv().await.unwrap(),
            ScheduleChange::AppointmentCreated {
                id: created.id,
                resource_id: "t1".to_string(),
                day: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            }
        );
    }

    #[tokio::test]
    async fn moving_appointment_notifies_both_days() {
        let service = create_service();
        let mut stored = service.create_appointment(&draft("t1", at(10, 9))).unwrap();
        let mut changes = service.feed().subscribe();

        stored.start = at(12, 9);
        service.update_appointment(&stored).unwrap();

        let first = changes.recv().await.unwrap();
        let second = changes.recv().await.unwrap();
        assert!(matches!(first, ScheduleChange::AppointmentDeleted { .. }));
        assert_eq!(first.day(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(matches!(second, ScheduleChange::AppointmentUpdated { .. }));
        assert_eq!(second.day(), NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
    }

    #[tokio::test]
    async fn editing_in_place_publishes_single_update() {
        let service = create_service();
        let mut stored = service.create_appointment(&draft("t1", at(10, 9))).unwrap();
        let mut changes = service.feed().subscribe();

        stored.notes = Some("Running late".to_string());
        service.update_appointment(&stored).unwrap();

        assert!(matches!(changes.recv().await.unwrap(), ScheduleChange::AppointmentUpdated { .. }));
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn delete_publishes_change() {
        let service = create_service();
        let stored = service.create_appointment(&draft("t1", at(10, 9))).unwrap();
        let mut changes = service.feed().subscribe();

        service.delete_appointment(&stored.id).unwrap();

        assert!(matches!(changes.recv().await.unwrap(), ScheduleChange::AppointmentDeleted { .. }));
    }

    #[test]
    fn deleting_unknown_appointment_fails_without_publishing() {
        let service = create_service();
        let mut changes = service.feed().subscribe();

        assert!(service.delete_appointment("ghost").is_err());
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn adding_shift_publishes_roster_change() {
        let service = create_service();
        let mut changes = service.feed().subscribe();
        let shift = WorkShift {
            resource_id: "t1".to_string(),
            interval: TimeInterval::new(at(10, 9), at(10, 12)),
            practice_id: "north".to_string(),
            practice_color: "#33b679".to_string(),
        };

        service.add_shift(&shift).unwrap();

        assert_eq!(
            changes.recv().await.unwrap(),
            ScheduleChange::RosterChanged { day: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap() }
        );
    }
}
