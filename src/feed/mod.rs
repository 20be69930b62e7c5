pub mod ingest;
pub mod loader;
pub mod notify;
pub mod service;
pub mod source;

pub use loader::{DayLoader, LoadError};
pub use notify::{ChangeFeed, ScheduleChange};
pub use service::{AppointmentService, ServiceError};
pub use source::{DayRequest, DaySnapshot, ScheduleSource, SourceError, StaticSource, StoreSource};
