//! Shared types for the stint API

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use stint_util::{Result, StintError, WallClock};

use crate::{GROUPS_MAX, LEAD_MINUTES_MAX, SESSIONS_MAX};

/// The span of time that gets divided into sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    /// Resolve a pair of wall-clock times on the given date.
    ///
    /// Fails only if one of the times does not exist on that date.
    pub fn on_date(date: NaiveDate, start: WallClock, end: WallClock) -> Result<Self> {
        let start_dt = start
            .on_date(date)
            .ok_or_else(|| StintError::window(format!("{} does not exist on {}", start, date)))?;
        let end_dt = end
            .on_date(date)
            .ok_or_else(|| StintError::window(format!("{} does not exist on {}", end, date)))?;
        Ok(Self::new(start_dt, end_dt))
    }

    /// End at or before start. Such a window yields a single boundary.
    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }

    /// Whole minutes between start and end, rounded toward negative infinity
    pub fn total_minutes(&self) -> i64 {
        (self.end - self.start).num_seconds().div_euclid(60)
    }
}

/// Sessions × groups layout of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    pub sessions: u32,
    pub groups: u32,
}

impl Grid {
    /// Create a grid within the picker ranges (1-7 sessions, 1-8 groups)
    pub fn new(sessions: u32, groups: u32) -> Result<Self> {
        if !(1..=SESSIONS_MAX).contains(&sessions) || !(1..=GROUPS_MAX).contains(&groups) {
            return Err(StintError::GridOutOfRange {
                sessions,
                groups,
                max_sessions: SESSIONS_MAX,
                max_groups: GROUPS_MAX,
            });
        }
        Ok(Self { sessions, groups })
    }

    /// Number of runs in the window
    pub fn total_runs(&self) -> u64 {
        self.sessions as u64 * self.groups as u64
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            sessions: 1,
            groups: 1,
        }
    }
}

/// Early-warning offset before each boundary, 1-10 minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LeadMinutes(u32);

impl LeadMinutes {
    pub fn new(minutes: u32) -> Result<Self> {
        if (1..=LEAD_MINUTES_MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(StintError::InvalidLeadMinutes(minutes))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for LeadMinutes {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for LeadMinutes {
    type Error = StintError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LeadMinutes> for u32 {
    fn from(value: LeadMinutes) -> Self {
        value.0
    }
}

/// Everything the engine needs to build a schedule and arm its alarms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub window: TimeWindow,
    pub grid: Grid,
    pub lead_minutes: LeadMinutes,
}

/// One deferred notification to hand to the alert dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAlert {
    /// When the notification should be delivered
    pub at: DateTime<Local>,
    /// The boundary this notification warns about
    pub boundary: DateTime<Local>,
    /// Human-readable body
    pub label: String,
}

/// Presentation hint for the time-to-warning display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningTone {
    /// Warning still ahead (shown red)
    Pending,
    /// Warning time already passed (shown gray)
    Past,
}

impl WarningTone {
    pub fn color_name(&self) -> &'static str {
        match self {
            WarningTone::Pending => "red",
            WarningTone::Past => "gray",
        }
    }
}

/// Countdown towards (or since) the next early warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningCountdown {
    pub text: String,
    pub tone: WarningTone,
}

/// Display-only values derived on each tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    /// Current time, `HH:MM:SS`
    pub current_time: String,
    /// Time to next warning, if a warning is armed
    pub warning: Option<WarningCountdown>,
    /// Next boundary, `HH:MM:SS`
    pub next_boundary: Option<String>,
    /// Time to next boundary, `HH:MM:SS`
    pub time_to_boundary: Option<String>,
}

/// Why the driver left the running state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Operator pressed stop
    UserStop,
    /// No boundary left after the current time
    ScheduleExhausted,
    /// Host process is exiting
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grid_ranges() {
        assert!(Grid::new(1, 1).is_ok());
        assert!(Grid::new(7, 8).is_ok());
        assert!(matches!(
            Grid::new(0, 1),
            Err(StintError::GridOutOfRange { sessions: 0, .. })
        ));
        assert!(Grid::new(8, 1).is_err());
        assert!(Grid::new(1, 9).is_err());
        assert_eq!(Grid::new(7, 8).unwrap().total_runs(), 56);
    }

    #[test]
    fn lead_minutes_ranges() {
        assert_eq!(LeadMinutes::new(5).unwrap().get(), 5);
        assert!(LeadMinutes::new(0).is_err());
        assert!(LeadMinutes::new(11).is_err());
        assert_eq!(LeadMinutes::default().get(), 1);
    }

    #[test]
    fn lead_minutes_rejects_out_of_range_on_deserialize() {
        assert!(serde_json::from_str::<LeadMinutes>("3").is_ok());
        assert!(serde_json::from_str::<LeadMinutes>("42").is_err());
    }

    #[test]
    fn window_total_minutes_floors() {
        let start = Local.with_ymd_and_hms(2025, 12, 25, 10, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + chrono::Duration::seconds(599));
        assert_eq!(window.total_minutes(), 9);
        assert!(!window.is_degenerate());

        let backwards = TimeWindow::new(start, start - chrono::Duration::seconds(30));
        assert_eq!(backwards.total_minutes(), -1);
        assert!(backwards.is_degenerate());
    }

    #[test]
    fn window_on_date() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let window = TimeWindow::on_date(
            date,
            WallClock::new(10, 0).unwrap(),
            WallClock::new(18, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(window.total_minutes(), 480);
    }

    #[test]
    fn warning_tone_colors() {
        assert_eq!(WarningTone::Pending.color_name(), "red");
        assert_eq!(WarningTone::Past.color_name(), "gray");
    }
}
