use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::source::DayRequest;

const CHANNEL_CAPACITY: usize = 64;

/// "Data changed, refetch" signal. Carries no record contents; receivers
/// reload a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleChange {
    AppointmentCreated { id: String, resource_id: String, day: NaiveDate },
    AppointmentUpdated { id: String, resource_id: String, day: NaiveDate },
    AppointmentDeleted { id: String, resource_id: String, day: NaiveDate },
    RosterChanged { day: NaiveDate },
}

impl ScheduleChange {
    pub fn day(&self) -> NaiveDate {
        match self {
            Self::AppointmentCreated { day, .. }
            | Self::AppointmentUpdated { day, .. }
            | Self::AppointmentDeleted { day, .. }
            | Self::RosterChanged { day } => *day,
        }
    }

    pub fn affects(&self, request: &DayRequest) -> bool {
        if self.day() != request.day {
            return false;
        }
        match self {
            Self::AppointmentCreated { resource_id, .. }
            | Self::AppointmentUpdated { resource_id, .. }
            | Self::AppointmentDeleted { resource_id, .. } => request.resource_ids.contains(resource_id),
            Self::RosterChanged { .. } => true,
        }
    }
}

/// Publish/subscribe channel shared by every open view.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ScheduleChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Returns how many subscribers were notified.
    pub fn publish(&self, change: ScheduleChange) -> usize {
        tracing::debug!("Publishing change: {:?}", change);
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
