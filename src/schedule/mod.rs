pub mod appointment;
pub mod interval;
pub mod roster;

pub use appointment::{Appointment, AppointmentStatus};
pub use interval::{infer_end, TimeInterval, FALLBACK_DURATION_MINUTES};
pub use roster::{Resource, WorkShift};
