//! Status and schedule views printed on stdout

use chrono::{DateTime, Local};
use serde::Serialize;
use stint_core::{CoreEvent, DriverState, TickDriver};
use stint_util::{format_clock_time, format_time_medium};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub state: &'static str,
    pub current_time: String,
    pub next_boundary: Option<String>,
    pub time_to_boundary: Option<String>,
    pub warning_countdown: Option<String>,
    /// "red" while the warning is ahead, "gray" once it has passed
    pub warning_color: Option<&'static str>,
    pub boundary_count: usize,
    pub pending_notifications: usize,
    pub edit_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryView {
    pub position: usize,
    pub boundary: String,
    pub warning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleView {
    pub window_start: String,
    pub window_end: String,
    pub sessions: u32,
    pub groups: u32,
    pub per_boundary_minutes: i64,
    pub lead_minutes: u32,
    /// Sessions × groups; cells past the end of the schedule are null
    pub grid: Vec<Vec<Option<String>>>,
    pub boundaries: Vec<BoundaryView>,
}

pub fn status_view(driver: &TickDriver, pending_notifications: usize, now: DateTime<Local>) -> StatusView {
    let display = driver.display(now);
    let warning = display.as_ref().and_then(|d| d.warning.clone());

    StatusView {
        state: match driver.state() {
            DriverState::Running => "running",
            DriverState::Stopped => "stopped",
        },
        current_time: format_time_medium(&now),
        next_boundary: display.as_ref().and_then(|d| d.next_boundary.clone()),
        time_to_boundary: display.as_ref().and_then(|d| d.time_to_boundary.clone()),
        warning_countdown: warning.as_ref().map(|w| w.text.clone()),
        warning_color: warning.map(|w| w.tone.color_name()),
        boundary_count: driver.schedule().len(),
        pending_notifications,
        edit_pending: driver.has_pending_edit(),
    }
}

pub fn schedule_view(driver: &TickDriver) -> ScheduleView {
    let plan = driver.plan();
    let schedule = driver.schedule();

    ScheduleView {
        window_start: format_clock_time(&plan.window.start),
        window_end: format_clock_time(&plan.window.end),
        sessions: plan.grid.sessions,
        groups: plan.grid.groups,
        per_boundary_minutes: schedule.per_boundary_minutes(),
        lead_minutes: plan.lead_minutes.get(),
        grid: schedule
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(|b| b.map(|b| format_clock_time(&b))).collect())
            .collect(),
        boundaries: schedule
            .warnings(plan.lead_minutes)
            .into_iter()
            .enumerate()
            .map(|(i, (boundary, warning))| BoundaryView {
                position: i + 1,
                boundary: format_clock_time(&boundary),
                warning: format_clock_time(&warning),
            })
            .collect(),
    }
}

pub fn render_status(view: &StatusView) -> String {
    let mut out = format!("[{}] {}", view.state, view.current_time);
    if let Some(next) = &view.next_boundary {
        out.push_str(&format!("  next {}", next));
        if let Some(remaining) = &view.time_to_boundary {
            out.push_str(&format!(" (in {})", remaining));
        }
    }
    if let (Some(countdown), Some(color)) = (&view.warning_countdown, view.warning_color) {
        out.push_str(&format!("  warning {} [{}]", countdown, color));
    }
    if view.edit_pending {
        out.push_str("  (edit pending)");
    }
    out
}

pub fn render_schedule(view: &ScheduleView) -> String {
    let mut lines = vec![format!(
        "Window {} - {}: {} sessions x {} groups, {} min per run, warning {} min before",
        view.window_start,
        view.window_end,
        view.sessions,
        view.groups,
        view.per_boundary_minutes.max(0),
        view.lead_minutes
    )];

    let header: Vec<String> = (1..=view.groups).map(|g| format!("G{:<5}", g)).collect();
    lines.push(format!("     {}", header.join(" ")));
    for (i, row) in view.grid.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|c| format!("{:<6}", c.as_deref().unwrap_or("-")))
            .collect();
        lines.push(format!("S{:<3} {}", i + 1, cells.join(" ")));
    }

    lines.join("\n")
}

/// One-line description of an engine event, for stdout
pub fn render_event(event: &CoreEvent) -> String {
    match event {
        CoreEvent::Started {
            boundary_count,
            next_boundary,
            ..
        } => match next_boundary {
            Some(b) => format!("Started: {} boundaries, next at {}", boundary_count, format_clock_time(b)),
            None => format!("Started: {} boundaries, none ahead", boundary_count),
        },
        CoreEvent::EarlyWarning {
            boundary,
            lead_minutes,
            ..
        } => format!(
            "Early warning: session ends at {} ({} min)",
            format_clock_time(boundary),
            lead_minutes
        ),
        CoreEvent::SessionEnded {
            boundary, position, ..
        } => match position {
            Some(p) => format!("Session end #{} at {}", p, format_clock_time(boundary)),
            None => format!("Session end at {}", format_clock_time(boundary)),
        },
        CoreEvent::ScheduleChanged {
            boundary_count,
            per_boundary_minutes,
            ..
        } => format!(
            "Schedule updated: {} boundaries, {} min per run",
            boundary_count,
            per_boundary_minutes.max(&0)
        ),
        CoreEvent::Stopped {
            reason,
            sessions_ended,
        } => format!("Stopped ({:?}) after {} session ends", reason, sessions_ended),
    }
}
