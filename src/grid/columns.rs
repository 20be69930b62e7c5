use serde::{Deserialize, Serialize};

use crate::schedule::Resource;

/// Horizontal extent of a column, as percentages of the grid width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub left_percent: f64,
    pub width_percent: f64,
}

impl ColumnSpan {
    pub fn right_percent(&self) -> f64 {
        self.left_percent + self.width_percent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    resource_ids: Vec<String>,
}

impl ColumnLayout {
    /// Columns follow the caller's selection order.
    pub fn new(resources: &[Resource]) -> Self {
        Self {
            resource_ids: resources.iter().map(|r| r.id.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.resource_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_ids.is_empty()
    }

    pub fn column_width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            100.0 / self.len() as f64
        }
    }

    pub fn span(&self, index: usize) -> Option<ColumnSpan> {
        if index >= self.len() {
            return None;
        }
        let width = self.column_width();
        Some(ColumnSpan {
            left_percent: index as f64 * width,
            width_percent: width,
        })
    }

    /// First column with this resource id; a repeated id keeps its first position.
    pub fn index_of(&self, resource_id: &str) -> Option<usize> {
        self.resource_ids.iter().position(|id| id == resource_id)
    }

    pub fn span_for(&self, resource_id: &str) -> Option<(usize, ColumnSpan)> {
        let index = self.index_of(resource_id)?;
        self.span(index).map(|span| (index, span))
    }

    pub fn spans(&self) -> Vec<ColumnSpan> {
        (0..self.len()).filter_map(|i| self.span(i)).collect()
    }
}
