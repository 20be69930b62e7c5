pub mod columns;
pub mod coverage;
pub mod day_grid;
pub mod geometry;
pub mod settings;
pub mod slots;

pub use columns::{ColumnLayout, ColumnSpan};
pub use coverage::{GridCell, OFF_DUTY_COLOR};
pub use day_grid::{compute_schedule_grid, LayoutIssue, PlacedAppointment, ScheduleGridModel};
pub use settings::{GridConfig, GridConfigError, HEIGHT_DAMPING};
pub use slots::TimeSlot;
