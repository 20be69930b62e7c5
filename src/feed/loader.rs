use thiserror::Error;
use tokio::sync::watch;

use super::source::{DayRequest, ScheduleSource, SourceError};
use crate::grid::{compute_schedule_grid, GridConfig, GridConfigError, ScheduleGridModel};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch schedule: {0}")]
    Source(#[from] SourceError),
    #[error("Invalid grid configuration: {0}")]
    Config(#[from] GridConfigError),
}

/// Fetches the currently selected day and lays it out, dropping results
/// whose selection changed while the fetch was in flight.
pub struct DayLoader<S> {
    source: S,
    config: GridConfig,
    selection: watch::Receiver<DayRequest>,
}

impl<S: ScheduleSource> DayLoader<S> {
    pub fn new(source: S, config: GridConfig, selection: watch::Receiver<DayRequest>) -> Self {
        Self {
            source,
            config,
            selection,
        }
    }

    pub fn current_request(&self) -> DayRequest {
        self.selection.borrow().clone()
    }

    /// `Ok(None)` means the result was stale and has been discarded.
    pub async fn load(&self) -> Result<Option<ScheduleGridModel>, LoadError> {
        let request = self.current_request();
        let snapshot = self.source.fetch_day(&request).await?;

        if *self.selection.borrow() != request {
            tracing::debug!("Discarding stale schedule for {}", request.day);
            return Ok(None);
        }

        let model = compute_schedule_grid(
            request.day,
            &snapshot.resources,
            &snapshot.shifts,
            &snapshot.appointments,
            &self.config,
        )?;
        Ok(Some(model))
    }

    /// Waits until the selection changes. Returns `false` once the sender is gone.
    pub async fn selection_changed(&mut self) -> bool {
        self.selection.changed().await.is_ok()
    }
}
