use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::feed::source::DaySnapshot;
use crate::schedule::{Appointment, Resource, WorkShift, FALLBACK_DURATION_MINUTES};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Appointment not found: {0}")]
    NotFound(String),
}

/// SQLite persistence for therapists, shifts and appointments. Records are
/// kept as JSON alongside the columns needed to query a day.
pub struct ScheduleStore {
    conn: Connection,
}

impl ScheduleStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS resources (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS shifts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resource_id TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                resource_id TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn upsert_resource(&self, resource: &Resource) -> Result<(), StoreError> {
        let data = serde_json::to_string(resource)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO resources (id, data) VALUES (?1, ?2)",
            rusqlite::params![&resource.id, &data],
        )?;
        Ok(())
    }

    pub fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT data FROM resources ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut resources = Vec::new();
        for data in rows {
            resources.push(serde_json::from_str(&data?)?);
        }
        Ok(resources)
    }

    pub fn insert_shift(&self, shift: &WorkShift) -> Result<i64, StoreError> {
        let data = serde_json::to_string(shift)?;
        self.conn.execute(
            "INSERT INTO shifts (resource_id, start_at, end_at, data) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                &shift.resource_id,
                instant_key(shift.interval.start),
                instant_key(shift.interval.end),
                &data,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Stores a new appointment under a fresh id and returns the stored record.
    pub fn create_appointment(&self, draft: &Appointment) -> Result<Appointment, StoreError> {
        let mut appointment = draft.clone();
        appointment.id = Uuid::new_v4().to_string();
        self.write_appointment(&appointment)?;
        Ok(appointment)
    }

    pub fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        if self.load_appointment(&appointment.id)?.is_none() {
            return Err(StoreError::NotFound(appointment.id.clone()));
        }
        self.write_appointment(appointment)?;
        Ok(appointment.clone())
    }

    pub fn load_appointment(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT data FROM appointments WHERE id = ?1")?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            let data: String = row.get(0)?;
            let appointment: Appointment = serde_json::from_str(&data)?;
            Ok(Some(appointment))
        } else {
            Ok(None)
        }
    }

    /// Removes the appointment and returns what was stored.
    pub fn delete_appointment(&self, id: &str) -> Result<Appointment, StoreError> {
        let existing = self
            .load_appointment(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.conn.execute("DELETE FROM appointments WHERE id = ?1", [id])?;
        Ok(existing)
    }

    /// All therapists plus the shifts and appointments that touch `day`:
    /// anything starting on it, or starting earlier and running into it.
    /// Shifts come back in insertion order.
    pub fn load_day(&self, day: NaiveDate) -> Result<DaySnapshot, StoreError> {
        let day_start = day.and_time(NaiveTime::MIN).and_utc();
        let from = instant_key(day_start);
        let until = instant_key(day_start + Duration::days(1));

        let mut stmt = self.conn.prepare(
            "SELECT data FROM shifts
             WHERE start_at < ?2 AND (end_at > ?1 OR start_at >= ?1)
             ORDER BY id",
        )?;
        let mut shifts = Vec::new();
        for data in stmt.query_map([from.as_str(), until.as_str()], |row| row.get::<_, String>(0))? {
            shifts.push(serde_json::from_str(&data?)?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT data FROM appointments
             WHERE start_at < ?2 AND (end_at > ?1 OR start_at >= ?1)
             ORDER BY start_at, id",
        )?;
        let mut appointments = Vec::new();
        for data in stmt.query_map([from.as_str(), until.as_str()], |row| row.get::<_, String>(0))? {
            appointments.push(serde_json::from_str(&data?)?);
        }

        Ok(DaySnapshot {
            resources: self.list_resources()?,
            shifts,
            appointments,
        })
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }

    fn write_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let data = serde_json::to_string(appointment)?;
        // Malformed records are indexed as instants so they still load on
        // their start day.
        let end = appointment
            .effective_interval(FALLBACK_DURATION_MINUTES)
            .map_or(appointment.start, |interval| interval.end);
        self.conn.execute(
            "INSERT OR REPLACE INTO appointments (id, resource_id, start_at, end_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                &appointment.id,
                &appointment.resource_id,
                instant_key(appointment.start),
                instant_key(end),
                &data,
            ],
        )?;
        Ok(())
    }
}

/// RFC 3339 in UTC with fixed precision, so text order is time order.
fn instant_key(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{AppointmentStatus, TimeInterval};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
    }

    fn create_test_store() -> ScheduleStore {
        ScheduleStore::open_in_memory().unwrap()
    }

    fn draft(resource_id: &str, start: DateTime<Utc>) -> Appointment {
        Appointment {
            id: String::new(),
            resource_id: resource_id.to_string(),
            patient_ref: "Jane Roe".to_string(),
            start,
            end: None,
            duration_minutes: Some(45),
            type_label: "Assessment".to_string(),
            notes: None,
            status: AppointmentStatus::Scheduled,
        }
    }

    fn shift(resource_id: &str, day: u32, start: u32, end: u32, practice: &str) -> WorkShift {
        WorkShift {
            resource_id: resource_id.to_string(),
            interval: TimeInterval::new(at(day, start, 0), at(day, end, 0)),
            practice_id: practice.to_string(),
            practice_color: "#33b679".to_string(),
        }
    }

    #[test]
    fn creates_database_schema() {
        let store = ScheduleStore::new(Connection::open_in_memory().unwrap());

        store.initialize().unwrap();

        assert!(store.table_exists("resources"));
        assert!(store.table_exists("shifts"));
        assert!(store.table_exists("appointments"));
    }

    #[test]
    fn create_assigns_fresh_id() {
        let store = create_test_store();

        let first = store.create_appointment(&draft("t1", at(10, 9, 0))).unwrap();
        let second = store.create_appointment(&draft("t1", at(10, 9, 0))).unwrap();

        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(store.load_appointment(&first.id).unwrap(), Some(first));
    }

    #[test]
    fn loads_nonexistent_appointment_returns_none() {
        let store = create_test_store();

        assert_eq!(store.load_appointment("nonexistent").unwrap(), None);
    }

    #[test]
    fn updates_existing_appointment() {
        let store = create_test_store();
        let mut stored = store.create_appointment(&draft("t1", at(10, 9, 0))).unwrap();

        stored.notes = Some("Bring referral".to_string());
        store.update_appointment(&stored).unwrap();

        let loaded = store.load_appointment(&stored.id).unwrap().unwrap();
        assert_eq!(loaded.notes, Some("Bring referral".to_string()));
    }

    #[test]
    fn update_of_unknown_appointment_fails() {
        let store = create_test_store();
        let mut ghost = draft("t1", at(10, 9, 0));
        ghost.id = "ghost".to_string();

        let result = store.update_appointment(&ghost);

        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "ghost"));
    }

    #[test]
    fn deletes_appointment() {
        let store = create_test_store();
        let stored = store.create_appointment(&draft("t1", at(10, 9, 0))).unwrap();

        let removed = store.delete_appointment(&stored.id).unwrap();

        assert_eq!(removed, stored);
        assert!(store.load_appointment(&stored.id).unwrap().is_none());
        assert!(store.delete_appointment(&stored.id).is_err());
    }

    #[test]
    fn load_day_excludes_other_days() {
        let store = create_test_store();
        store.upsert_resource(&Resource::new("t1", "Dana Weiss")).unwrap();
        store.insert_shift(&shift("t1", 10, 9, 12, "north")).unwrap();
        store.insert_shift(&shift("t1", 11, 9, 12, "north")).unwrap();
        store.create_appointment(&draft("t1", at(10, 14, 0))).unwrap();
        store.create_appointment(&draft("t1", at(11, 9, 0))).unwrap();

        let snapshot = store.load_day(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()).unwrap();

        assert_eq!(snapshot.resources.len(), 1);
        assert_eq!(snapshot.shifts.len(), 1);
        assert_eq!(snapshot.appointments.len(), 1);
        assert_eq!(snapshot.appointments[0].start, at(10, 14, 0));
    }

    #[test]
    fn load_day_includes_records_running_past_midnight() {
        let store = create_test_store();
        let mut overnight = draft("t1", at(10, 23, 30));
        overnight.duration_minutes = Some(90);
        store.create_appointment(&overnight).unwrap();
        store.create_appointment(&draft("t1", at(10, 22, 0))).unwrap();
        store.insert_shift(&WorkShift {
            interval: TimeInterval::new(at(10, 22, 0), at(11, 6, 0)),
            ..shift("t1", 10, 9, 12, "night")
        }).unwrap();

        let snapshot = store.load_day(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()).unwrap();

        assert_eq!(snapshot.appointments.len(), 1);
        assert_eq!(snapshot.appointments[0].start, at(10, 23, 30));
        assert_eq!(snapshot.shifts.len(), 1);
        assert_eq!(snapshot.shifts[0].practice_id, "night");
    }

    #[test]
    fn load_day_still_returns_inverted_appointment() {
        let store = create_test_store();
        let mut inverted = draft("t1", at(10, 10, 0));
        inverted.end = Some(at(10, 9, 0));
        store.create_appointment(&inverted).unwrap();

        let snapshot = store.load_day(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()).unwrap();

        assert_eq!(snapshot.appointments.len(), 1);
    }

    #[test]
    fn load_day_keeps_shift_insertion_order() {
        let store = create_test_store();
        store.insert_shift(&shift("t1", 10, 13, 15, "south")).unwrap();
        store.insert_shift(&shift("t1", 10, 9, 12, "north")).unwrap();

        let snapshot = store.load_day(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()).unwrap();

        let practices: Vec<&str> = snapshot.shifts.iter().map(|s| s.practice_id.as_str()).collect();
        assert_eq!(practices, vec!["south", "north"]);
    }

    #[test]
    fn load_day_orders_appointments_by_start() {
        let store = create_test_store();
        store.create_appointment(&draft("t1", at(10, 15, 0))).unwrap();
        store.create_appointment(&draft("t1", at(10, 8, 0))).unwrap();

        let snapshot = store.load_day(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()).unwrap();

        assert_eq!(snapshot.appointments[0].start, at(10, 8, 0));
    }

    #[test]
    fn upsert_replaces_resource() {
        let store = create_test_store();
        store.upsert_resource(&Resource::new("t1", "Dana")).unwrap();
        store.upsert_resource(&Resource::new("t1", "Dana Weiss")).unwrap();

        let resources = store.list_resources().unwrap();

        assert_eq!(resources, vec![Resource::new("t1", "Dana Weiss")]);
    }

    #[test]
    fn opens_database_file_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("schedule.db");

        let store = ScheduleStore::open(&path).unwrap();
        store.upsert_resource(&Resource::new("t1", "Dana Weiss")).unwrap();

        assert!(path.exists());
    }
}
