//! Tick driver: the Stopped / Running state machine
//!
//! The driver owns the current plan and schedule. While running it keeps an
//! [`AlarmCursor`] and, on every tick, compares the injected `now` against the
//! cursor targets. Crossings are detected with a threshold of one tick
//! interval rather than equality, since ticks never land exactly on a target.

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use stint_alert_api::AlertDispatcher;
use stint_api::{
    DEFAULT_NOTIFICATION_MESSAGE, DEFAULT_TICK_INTERVAL, DisplaySnapshot, PlanConfig,
    ScheduledAlert, StopReason, WarningCountdown, WarningTone,
};
use stint_util::{Result, StintError, format_clock_time, format_countdown, format_time_medium};
use tracing::{debug, info, warn};

use crate::{AlarmCursor, CoreEvent, Schedule, TickReport};

/// Driver tuning
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub tick_interval: Duration,
    pub notification_message: String,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            notification_message: DEFAULT_NOTIFICATION_MESSAGE.to_string(),
        }
    }
}

/// Coarse driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

/// Start decision from the driver
#[derive(Debug)]
pub enum StartDecision {
    Started(CoreEvent),
    AlreadyRunning,
}

/// Stop decision from the driver
#[derive(Debug)]
pub enum StopDecision {
    Stopped(CoreEvent),
    NotRunning,
}

/// Per-run state, discarded on stop
#[derive(Debug)]
struct RunState {
    cursor: AlarmCursor,
    /// Early warning for the current cursor already fired
    warning_fired: bool,
    /// Most recent boundary whose session end fired
    last_fired: Option<DateTime<Local>>,
    sessions_ended: usize,
}

/// Validated plan edit waiting for the next tick
#[derive(Debug)]
struct PendingPlan {
    plan: PlanConfig,
    schedule: Schedule,
}

/// The tick-driven alarm engine
pub struct TickDriver {
    plan: PlanConfig,
    schedule: Schedule,
    pending: Option<PendingPlan>,
    run: Option<RunState>,
    dispatcher: Arc<dyn AlertDispatcher>,
    tick_interval: chrono::Duration,
    notification_message: String,
}

impl TickDriver {
    /// Create a stopped driver for the given plan
    pub fn new(
        plan: PlanConfig,
        dispatcher: Arc<dyn AlertDispatcher>,
        options: DriverOptions,
    ) -> Result<Self> {
        let tick_interval = chrono::Duration::from_std(options.tick_interval)
            .ok()
            .filter(|d| *d > chrono::Duration::zero())
            .ok_or_else(|| StintError::config("tick interval must be positive"))?;

        let schedule = Schedule::compute(&plan.window, plan.grid)?;

        info!(
            boundary_count = schedule.len(),
            per_boundary_minutes = schedule.per_boundary_minutes(),
            sessions = plan.grid.sessions,
            groups = plan.grid.groups,
            "Tick driver initialized"
        );

        Ok(Self {
            plan,
            schedule,
            pending: None,
            run: None,
            dispatcher,
            tick_interval,
            notification_message: options.notification_message,
        })
    }

    pub fn state(&self) -> DriverState {
        if self.run.is_some() {
            DriverState::Running
        } else {
            DriverState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Plan the current schedule was built from
    pub fn plan(&self) -> &PlanConfig {
        &self.plan
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Current alarm targets, while running
    pub fn cursor(&self) -> Option<AlarmCursor> {
        self.run.as_ref().map(|r| r.cursor)
    }

    /// An edit is queued for the next tick
    pub fn has_pending_edit(&self) -> bool {
        self.pending.is_some()
    }

    /// Submit a new plan.
    ///
    /// The plan is validated immediately. While stopped it replaces the
    /// schedule at once and the change event is returned; while running it
    /// is queued and takes effect on the next tick.
    pub fn update_plan(&mut self, plan: PlanConfig) -> Result<Option<CoreEvent>> {
        let schedule = Schedule::compute(&plan.window, plan.grid)?;

        if self.run.is_some() {
            debug!(boundary_count = schedule.len(), "Plan edit queued for next tick");
            self.pending = Some(PendingPlan { plan, schedule });
            return Ok(None);
        }

        self.pending = None;
        Ok(Some(self.install(plan, schedule, false)))
    }

    /// Body text for notifications built after this call
    pub fn set_notification_message(&mut self, message: impl Into<String>) {
        self.notification_message = message.into();
    }

    /// Deferred notifications for the current schedule, one per boundary.
    ///
    /// Each entry is delivered at the early-warning instant, but its label
    /// names the boundary it warns about.
    pub fn notifications(&self) -> Vec<ScheduledAlert> {
        self.schedule
            .warnings(self.plan.lead_minutes)
            .into_iter()
            .map(|(boundary, at)| ScheduledAlert {
                at,
                boundary,
                label: format!(
                    "Session: {} | {}",
                    format_clock_time(&boundary),
                    self.notification_message
                ),
            })
            .collect()
    }

    /// Enter the running state
    pub fn start(&mut self, now: DateTime<Local>) -> StartDecision {
        if self.run.is_some() {
            return StartDecision::AlreadyRunning;
        }

        if let Some(pending) = self.pending.take() {
            self.install(pending.plan, pending.schedule, false);
        }

        let cursor = AlarmCursor::recompute(now, self.schedule.boundaries(), self.plan.lead_minutes);
        self.dispatcher.schedule_all(self.notifications());

        self.run = Some(RunState {
            cursor,
            warning_fired: false,
            last_fired: None,
            sessions_ended: 0,
        });

        match cursor.next_boundary {
            Some(boundary) => info!(next_boundary = %boundary, "Driver started"),
            None => warn!("Driver started with no boundary ahead"),
        }

        StartDecision::Started(CoreEvent::Started {
            boundary_count: self.schedule.len(),
            next_boundary: cursor.next_boundary,
            next_warning: cursor.next_warning,
        })
    }

    /// Leave the running state and cancel pending notifications.
    ///
    /// Once this returns, ticks are no-ops until the next start.
    pub fn stop(&mut self, reason: StopReason) -> StopDecision {
        let Some(run) = self.run.take() else {
            return StopDecision::NotRunning;
        };

        self.dispatcher.cancel_all();

        info!(
            reason = ?reason,
            sessions_ended = run.sessions_ended,
            "Driver stopped"
        );

        StopDecision::Stopped(CoreEvent::Stopped {
            reason,
            sessions_ended: run.sessions_ended,
        })
    }

    /// Advance the driver to `now`
    pub fn tick(&mut self, now: DateTime<Local>) -> TickReport {
        let mut report = TickReport::default();

        if self.run.is_none() {
            return report;
        }

        if let Some(pending) = self.pending.take() {
            report.events.push(self.apply_running_edit(pending, now));
        }

        if self.run.as_ref().is_some_and(|r| r.cursor.is_exhausted()) {
            info!("No boundaries left, stopping");
            if let StopDecision::Stopped(event) = self.stop(StopReason::ScheduleExhausted) {
                report.events.push(event);
            }
            return report;
        }

        let lead = self.plan.lead_minutes;
        let interval = self.tick_interval;
        let Some(run) = self.run.as_mut() else {
            return report;
        };
        let Some(boundary) = run.cursor.next_boundary else {
            return report;
        };

        if let Some(warning_at) = run.cursor.next_warning
            && !run.warning_fired
            && crossed_within(now, warning_at, interval)
        {
            self.dispatcher.fire_early_warning();
            run.warning_fired = true;

            info!(
                boundary = %boundary,
                warning_at = %warning_at,
                lead_minutes = lead.get(),
                "Early warning"
            );

            report.events.push(CoreEvent::EarlyWarning {
                boundary,
                warning_at,
                lead_minutes: lead.get(),
            });
        }

        report.display = Some(display_snapshot(now, &run.cursor));

        if boundary - now < interval {
            self.dispatcher.fire_session_end();
            run.sessions_ended += 1;
            run.last_fired = Some(boundary);

            // Reference is at least the fired boundary so it is never picked again
            run.cursor = AlarmCursor::recompute(now.max(boundary), self.schedule.boundaries(), lead);
            run.warning_fired = false;

            info!(
                boundary = %boundary,
                next_boundary = ?run.cursor.next_boundary,
                "Session ended"
            );

            report.events.push(CoreEvent::SessionEnded {
                boundary,
                position: self.schedule.position(boundary),
                next_boundary: run.cursor.next_boundary,
            });
        }

        report
    }

    /// Display values for `now`, while running
    pub fn display(&self, now: DateTime<Local>) -> Option<DisplaySnapshot> {
        self.run.as_ref().map(|r| display_snapshot(now, &r.cursor))
    }

    fn install(&mut self, plan: PlanConfig, schedule: Schedule, while_running: bool) -> CoreEvent {
        self.plan = plan;
        self.schedule = schedule;

        info!(
            boundary_count = self.schedule.len(),
            per_boundary_minutes = self.schedule.per_boundary_minutes(),
            while_running,
            "Schedule recomputed"
        );

        CoreEvent::ScheduleChanged {
            boundary_count: self.schedule.len(),
            per_boundary_minutes: self.schedule.per_boundary_minutes(),
            while_running,
        }
    }

    fn apply_running_edit(&mut self, pending: PendingPlan, now: DateTime<Local>) -> CoreEvent {
        let event = self.install(pending.plan, pending.schedule, true);

        // A boundary fired early within the threshold is still ahead of `now`
        let reference = self
            .run
            .as_ref()
            .and_then(|r| r.last_fired)
            .map_or(now, |fired| now.max(fired));
        let cursor = AlarmCursor::recompute(reference, self.schedule.boundaries(), self.plan.lead_minutes);

        if let Some(run) = self.run.as_mut() {
            if run.cursor != cursor {
                run.warning_fired = false;
            }
            run.cursor = cursor;
        }

        self.dispatcher.schedule_all(self.notifications());
        event
    }
}

/// `now` is at or after `target`, by less than one interval
fn crossed_within(now: DateTime<Local>, target: DateTime<Local>, interval: chrono::Duration) -> bool {
    let elapsed = now - target;
    elapsed >= chrono::Duration::zero() && elapsed < interval
}

fn display_snapshot(now: DateTime<Local>, cursor: &AlarmCursor) -> DisplaySnapshot {
    DisplaySnapshot {
        current_time: format_time_medium(&now),
        warning: cursor.next_warning.map(|w| WarningCountdown {
            text: format_countdown(now - w),
            tone: if now < w {
                WarningTone::Pending
            } else {
                WarningTone::Past
            },
        }),
        next_boundary: cursor.next_boundary.map(|b| format_time_medium(&b)),
        time_to_boundary: cursor.next_boundary.map(|b| format_countdown(b - now)),
    }
}
