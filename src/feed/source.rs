use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::schedule::{Appointment, Resource, WorkShift};
use crate::storage::store::{ScheduleStore, StoreError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Schedule store is unavailable")]
    Unavailable,
}

/// Identifies one fetch: the day plus the therapists selected for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayRequest {
    pub day: NaiveDate,
    pub resource_ids: Vec<String>,
}

impl DayRequest {
    pub fn new(day: NaiveDate, resource_ids: Vec<String>) -> Self {
        Self { day, resource_ids }
    }
}

/// Immutable input for one grid computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub resources: Vec<Resource>,
    pub shifts: Vec<WorkShift>,
    pub appointments: Vec<Appointment>,
}

impl DaySnapshot {
    /// Keeps only the requested resources, in request order. An empty
    /// selection keeps no one.
    pub fn select(mut self, resource_ids: &[String]) -> Self {
        self.resources = resource_ids
            .iter()
            .filter_map(|id| self.resources.iter().find(|r| &r.id == id).cloned())
            .collect();
        self.shifts.retain(|s| resource_ids.contains(&s.resource_id));
        self.appointments.retain(|a| resource_ids.contains(&a.resource_id));
        self
    }
}

#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_day(&self, request: &DayRequest) -> Result<DaySnapshot, SourceError>;
}

/// [`ScheduleSource`] backed by the SQLite store.
#[derive(Clone)]
pub struct StoreSource {
    store: Arc<Mutex<ScheduleStore>>,
}

impl StoreSource {
    pub fn new(store: Arc<Mutex<ScheduleStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ScheduleSource for StoreSource {
    async fn fetch_day(&self, request: &DayRequest) -> Result<DaySnapshot, SourceError> {
        let store = self.store.lock().map_err(|_| SourceError::Unavailable)?;
        let snapshot = store.load_day(request.day)?;
        Ok(snapshot.select(&request.resource_ids))
    }
}

/// Serves a fixed snapshot, e.g. one read from a file.
pub struct StaticSource {
    snapshot: DaySnapshot,
}

impl StaticSource {
    pub fn new(snapshot: DaySnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ScheduleSource for StaticSource {
    async fn fetch_day(&self, request: &DayRequest) -> Result<DaySnapshot, SourceError> {
        Ok(self.snapshot.clone().select(&request.resource_ids))
    }
}
