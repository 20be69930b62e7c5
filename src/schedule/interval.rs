use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const FALLBACK_DURATION_MINUTES: i64 = 30;

/// Half-open `[start, end)` span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn covers(&self, point: DateTime<Utc>) -> bool {
        self.start <= point && point < self.end
    }

    pub fn clamp_end(&self, max_end: DateTime<Utc>) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end.min(max_end),
        }
    }

    /// Intersection with `window`, or `None` when nothing of `self` lies inside it.
    pub fn clamp_to(&self, window: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(window) {
            return None;
        }
        let clamped = TimeInterval {
            start: self.start.max(window.start),
            end: self.end,
        }
        .clamp_end(window.end);
        Some(clamped)
    }
}

/// Resolves the end of an event: the explicit end wins, then an explicit
/// duration, then `fallback_minutes`. `None` when the duration does not fit
/// in the representable time range.
pub fn infer_end(
    start: DateTime<Utc>,
    explicit_end: Option<DateTime<Utc>>,
    duration_minutes: Option<i64>,
    fallback_minutes: i64,
) -> Option<DateTime<Utc>> {
    if let Some(end) = explicit_end {
        return Some(end);
    }
    let minutes = duration_minutes.unwrap_or(fallback_minutes);
    start.checked_add_signed(Duration::try_minutes(minutes)?)
}
