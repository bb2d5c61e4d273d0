//! Validated plan types

use crate::schema::RawConfig;
use crate::validation::parse_time;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stint_api::{DEFAULT_NOTIFICATION_MESSAGE, DEFAULT_TICK_INTERVAL, Grid, LeadMinutes, PlanConfig, TimeWindow};
use stint_util::{Result, WallClock};

/// Validated configuration, ready to be resolved against a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub window: WindowSpec,
    pub grid: Grid,
    pub lead_minutes: LeadMinutes,
    pub alerts: AlertSettings,
    pub daemon: DaemonSettings,
}

/// Window bounds as wall-clock times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub start: WallClock,
    pub end: WallClock,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            start: WallClock { hour: 10, minute: 0 },
            end: WallClock { hour: 18, minute: 0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub message: String,
    pub early_warning_command: Option<Vec<String>>,
    pub session_end_command: Option<Vec<String>>,
    pub notify_command: Option<Vec<String>>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            message: DEFAULT_NOTIFICATION_MESSAGE.to_string(),
            early_warning_command: None,
            session_end_command: None,
            notify_command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonSettings {
    pub tick_interval: Duration,
    pub autostart: bool,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            autostart: false,
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            window: WindowSpec::default(),
            grid: Grid::default(),
            lead_minutes: LeadMinutes::default(),
            alerts: AlertSettings::default(),
            daemon: DaemonSettings::default(),
        }
    }
}

impl Plan {
    /// Convert from a raw config that has already passed `validate_config`.
    ///
    /// Out-of-range values that slipped through fall back to defaults.
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = WindowSpec::default();
        let window = WindowSpec {
            start: wall_clock(&raw.window.start).unwrap_or(defaults.start),
            end: wall_clock(&raw.window.end).unwrap_or(defaults.end),
        };

        let grid = Grid::new(raw.grid.sessions, raw.grid.groups).unwrap_or_default();
        let lead_minutes = LeadMinutes::new(raw.alerts.lead_minutes).unwrap_or_default();

        let message = raw
            .alerts
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_MESSAGE.to_string());

        let tick_interval = raw
            .daemon
            .tick_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TICK_INTERVAL);

        Self {
            window,
            grid,
            lead_minutes,
            alerts: AlertSettings {
                message,
                early_warning_command: raw.alerts.early_warning_command,
                session_end_command: raw.alerts.session_end_command,
                notify_command: raw.alerts.notify_command,
            },
            daemon: DaemonSettings {
                tick_interval,
                autostart: raw.daemon.autostart,
            },
        }
    }

    /// Resolve the window bounds on a calendar date
    pub fn window_on(&self, date: NaiveDate) -> Result<TimeWindow> {
        TimeWindow::on_date(date, self.window.start, self.window.end)
    }

    /// The inputs the schedule is computed from, resolved on a calendar date
    pub fn plan_config_on(&self, date: NaiveDate) -> Result<PlanConfig> {
        Ok(PlanConfig {
            window: self.window_on(date)?,
            grid: self.grid,
            lead_minutes: self.lead_minutes,
        })
    }
}

fn wall_clock(s: &str) -> Option<WallClock> {
    let (hour, minute) = parse_time(s).ok()?;
    WallClock::new(hour, minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_from_raw_fills_defaults() {
        let plan = parse_config("config_version = 1").unwrap();
        assert_eq!(plan, Plan::default());
        assert_eq!(plan.alerts.message, "Get the cars out of the track");
        assert_eq!(plan.daemon.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_blank_message_uses_default() {
        let plan = parse_config(
            r#"
            config_version = 1
            [alerts]
            message = "   "
        "#,
        )
        .unwrap();
        assert_eq!(plan.alerts.message, DEFAULT_NOTIFICATION_MESSAGE);
    }

    #[test]
    fn test_plan_config_on_date() {
        let plan = parse_config(
            r#"
            config_version = 1
            [window]
            start = "09:15"
            end = "17:45"
            [grid]
            sessions = 3
            groups = 2
            [alerts]
            lead_minutes = 4
        "#,
        )
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let config = plan.plan_config_on(date).unwrap();
        assert_eq!(config.window.start, Local.with_ymd_and_hms(2025, 12, 25, 9, 15, 0).unwrap());
        assert_eq!(config.window.end, Local.with_ymd_and_hms(2025, 12, 25, 17, 45, 0).unwrap());
        assert_eq!(config.grid, Grid::new(3, 2).unwrap());
        assert_eq!(config.lead_minutes.get(), 4);
    }
}
