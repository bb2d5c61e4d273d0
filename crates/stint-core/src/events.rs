//! Core events emitted by the driver

use chrono::{DateTime, Local};
use serde::Serialize;
use stint_api::{DisplaySnapshot, StopReason};

/// Events emitted by the tick driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    /// Driver entered the running state
    Started {
        boundary_count: usize,
        next_boundary: Option<DateTime<Local>>,
        next_warning: Option<DateTime<Local>>,
    },

    /// Early warning crossed
    EarlyWarning {
        boundary: DateTime<Local>,
        warning_at: DateTime<Local>,
        lead_minutes: u32,
    },

    /// Session boundary crossed
    SessionEnded {
        boundary: DateTime<Local>,
        /// 1-based position in the schedule
        position: Option<usize>,
        next_boundary: Option<DateTime<Local>>,
    },

    /// A plan edit was applied and the schedule recomputed
    ScheduleChanged {
        boundary_count: usize,
        per_boundary_minutes: i64,
        while_running: bool,
    },

    /// Driver left the running state
    Stopped {
        reason: StopReason,
        sessions_ended: usize,
    },
}

/// Result of a single tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<CoreEvent>,
    /// Present while running
    pub display: Option<DisplaySnapshot>,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.events.is_empty() && self.display.is_none()
    }

    /// True if this tick transitioned the driver to stopped
    pub fn stopped(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, CoreEvent::Stopped { .. }))
    }
}
