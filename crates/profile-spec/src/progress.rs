use serde::Serialize;

use crate::requirement::is_applicable;
use crate::spec::{FieldKind, ProfileSchema};
use crate::values::FormValues;

/// Completion counters for a snapshot.
///
/// Boolean fields always hold a value and are left out; conditional fields only
/// count while their condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileProgress {
    pub answered: usize,
    pub total: usize,
}

impl ProfileProgress {
    pub fn of(schema: &ProfileSchema, values: &FormValues) -> Self {
        let mut progress = Self {
            answered: 0,
            total: 0,
        };
        for field in schema.fields() {
            if matches!(field.kind, FieldKind::Boolean) || !is_applicable(field, values) {
                continue;
            }
            progress.total += 1;
            let answered = match field.kind {
                FieldKind::Number(_) => values.number(&field.name).is_some(),
                _ => values.is_filled(&field.name),
            };
            if answered {
                progress.answered += 1;
            }
        }
        progress
    }

    /// Rounded completion percentage; an empty registry counts as complete.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let ratio = self.answered as f64 / self.total as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

/// Share of the step sequence reached, as shown by the step progress bar.
pub fn step_percentage(current: usize, step_count: usize) -> u8 {
    if step_count == 0 {
        return 100;
    }
    let ratio = (current + 1).min(step_count) as f64 / step_count as f64;
    (ratio * 100.0).round() as u8
}
