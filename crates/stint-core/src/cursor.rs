//! Alarm cursor: the next boundary and warning after a reference time

use chrono::{DateTime, Local};
use stint_api::LeadMinutes;

use crate::early_warning;

/// Next alarm targets. Replaced wholesale on every recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmCursor {
    pub next_boundary: Option<DateTime<Local>>,
    pub next_warning: Option<DateTime<Local>>,
}

impl AlarmCursor {
    /// Earliest boundary strictly after `now`, and its early warning.
    ///
    /// `boundaries` need not be sorted.
    pub fn recompute(now: DateTime<Local>, boundaries: &[DateTime<Local>], lead: LeadMinutes) -> Self {
        let next_boundary = boundaries.iter().filter(|b| **b > now).min().copied();
        let next_warning = next_boundary.and_then(|b| early_warning(b, lead));

        Self {
            next_boundary,
            next_warning,
        }
    }

    /// No boundary left to fire
    pub fn is_exhausted(&self) -> bool {
        self.next_boundary.is_none()
    }
}
