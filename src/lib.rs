pub mod feed;
pub mod grid;
pub mod schedule;
pub mod storage;
pub mod ui;

pub use grid::{compute_schedule_grid, GridConfig, ScheduleGridModel};
pub use schedule::{Appointment, AppointmentStatus, Resource, TimeInterval, WorkShift};
