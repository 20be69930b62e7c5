use serde::{Deserialize, Serialize};

use super::slots::TimeSlot;
use crate::schedule::{Resource, WorkShift};

/// Background for a slot no shift covers.
pub const OFF_DUTY_COLOR: &str = "#e0e0e0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub slot_index: usize,
    pub resource_id: String,
    pub coverage: Option<WorkShift>,
}

impl GridCell {
    pub fn is_on_duty(&self) -> bool {
        self.coverage.is_some()
    }

    pub fn practice_id(&self) -> Option<&str> {
        self.coverage.as_ref().map(|shift| shift.practice_id.as_str())
    }

    pub fn background(&self) -> &str {
        self.coverage
            .as_ref()
            .map(|shift| shift.practice_color.as_str())
            .unwrap_or(OFF_DUTY_COLOR)
    }
}

/// First shift of `resource`, in input order, overlapping `slot`.
pub fn resolve_coverage<'a>(
    slot: &TimeSlot,
    resource: &Resource,
    shifts: &'a [WorkShift],
) -> Option<&'a WorkShift> {
    shifts.iter().find(|shift| {
        shift.belongs_to(resource)
            && shift.interval.is_well_formed()
            && shift.interval.overlaps(&slot.interval)
    })
}

pub fn build_cell(slot: &TimeSlot, resource: &Resource, shifts: &[WorkShift]) -> GridCell {
    GridCell {
        slot_index: slot.index,
        resource_id: resource.id.clone(),
        coverage: resolve_coverage(slot, resource, shifts).cloned(),
    }
}

/// Pairs of input indices of shifts that overlap within one resource.
pub fn overlapping_shifts(shifts: &[WorkShift]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    for (i, a) in shifts.iter().enumerate() {
        if !a.interval.is_well_formed() {
            continue;
        }
        for (j, b) in shifts.iter().enumerate().skip(i + 1) {
            if a.resource_id == b.resource_id
                && b.interval.is_well_formed()
                && a.interval.overlaps(&b.interval)
            {
                pairs.push((i, j));
            }
        }
    }

    pairs
}
