//! Integration tests for stintd
//!
//! These tests drive the engine from a loaded config with a simulated clock,
//! one tick per second, the way the daemon does.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::io::Write;
use std::sync::Arc;
use stint_alert_api::{AlertDispatcher, MockDispatcher};
use stint_api::{Grid, LeadMinutes, PlanConfig, StopReason, TimeWindow};
use stint_config::{Plan, load_config, parse_config};
use stint_core::{CoreEvent, DriverOptions, DriverState, StartDecision, StopDecision, TickDriver};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()
}

fn at(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 12, 25, hour, minute, second).unwrap()
}

fn make_driver(plan: &Plan) -> (TickDriver, Arc<MockDispatcher>) {
    let mock = Arc::new(MockDispatcher::new());
    let driver = TickDriver::new(
        plan.plan_config_on(date()).unwrap(),
        mock.clone(),
        DriverOptions {
            tick_interval: plan.daemon.tick_interval,
            notification_message: plan.alerts.message.clone(),
        },
    )
    .unwrap();
    (driver, mock)
}

/// Tick once per second over [from, to)
fn run(driver: &mut TickDriver, from: DateTime<Local>, to: DateTime<Local>) -> Vec<(DateTime<Local>, CoreEvent)> {
    let mut events = Vec::new();
    let mut now = from;
    while now < to {
        events.extend(driver.tick(now).events.into_iter().map(|e| (now, e)));
        now += chrono::Duration::seconds(1);
    }
    events
}

const TWO_BY_TWO: &str = r#"
    config_version = 1

    [window]
    start = "10:00"
    end = "18:00"

    [grid]
    sessions = 2
    groups = 2

    [alerts]
    lead_minutes = 5
    message = "Get the cars out of the track"
"#;

#[test]
fn test_config_to_notifications() {
    let plan = parse_config(TWO_BY_TWO).unwrap();
    let (mut driver, mock) = make_driver(&plan);

    assert!(matches!(driver.start(at(9, 0, 0)), StartDecision::Started(_)));

    let labels: Vec<String> = mock.pending().into_iter().map(|a| a.label).collect();
    assert_eq!(
        labels,
        vec![
            "Session: 10:00 | Get the cars out of the track",
            "Session: 12:00 | Get the cars out of the track",
            "Session: 14:00 | Get the cars out of the track",
            "Session: 16:00 | Get the cars out of the track",
            "Session: 18:00 | Get the cars out of the track",
        ]
    );
    assert_eq!(mock.pending()[0].at, at(9, 55, 0));
}

#[test]
fn test_full_day_fires_each_alert_once() {
    let plan = parse_config(TWO_BY_TWO).unwrap();
    let (mut driver, mock) = make_driver(&plan);
    driver.start(at(9, 50, 0));

    let events = run(&mut driver, at(9, 50, 0), at(18, 0, 5));

    let warnings: Vec<DateTime<Local>> = events
        .iter()
        .filter(|(_, e)| matches!(e, CoreEvent::EarlyWarning { .. }))
        .map(|(now, _)| *now)
        .collect();
    let ends: Vec<DateTime<Local>> = events
        .iter()
        .filter(|(_, e)| matches!(e, CoreEvent::SessionEnded { .. }))
        .map(|(now, _)| *now)
        .collect();

    assert_eq!(
        warnings,
        vec![at(9, 55, 0), at(11, 55, 0), at(13, 55, 0), at(15, 55, 0), at(17, 55, 0)]
    );
    assert_eq!(
        ends,
        vec![at(10, 0, 0), at(12, 0, 0), at(14, 0, 0), at(16, 0, 0), at(18, 0, 0)]
    );
    assert_eq!(mock.early_warning_count(), 5);
    assert_eq!(mock.session_end_count(), 5);

    assert!(events.iter().any(|(_, e)| matches!(
        e,
        CoreEvent::Stopped {
            reason: StopReason::ScheduleExhausted,
            sessions_ended: 5
        }
    )));
    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(mock.cancel_calls(), 1);
}

#[test]
fn test_start_mid_window_skips_past_boundaries() {
    let plan = parse_config(TWO_BY_TWO).unwrap();
    let (mut driver, mock) = make_driver(&plan);
    driver.start(at(13, 0, 0));

    let events = run(&mut driver, at(13, 0, 0), at(14, 0, 1));
    let ended: Vec<_> = events
        .iter()
        .filter_map(|(_, e)| match e {
            CoreEvent::SessionEnded { boundary, position, .. } => Some((*boundary, *position)),
            _ => None,
        })
        .collect();

    assert_eq!(ended, vec![(at(14, 0, 0), Some(3))]);
    assert_eq!(mock.early_warning_count(), 1);
}

#[test]
fn test_user_stop_silences_everything() {
    let plan = parse_config(TWO_BY_TWO).unwrap();
    let (mut driver, mock) = make_driver(&plan);
    driver.start(at(11, 0, 0));

    assert!(matches!(driver.stop(StopReason::UserStop), StopDecision::Stopped(_)));
    assert_eq!(mock.pending_count(), 0);

    let events = run(&mut driver, at(11, 0, 0), at(12, 5, 0));
    assert!(events.is_empty());
    assert_eq!(mock.early_warning_count(), 0);
    assert_eq!(mock.session_end_count(), 0);
}

#[test]
fn test_reloaded_plan_applies_while_running() {
    let plan = parse_config(TWO_BY_TWO).unwrap();
    let (mut driver, mock) = make_driver(&plan);
    driver.start(at(11, 0, 0));

    let edited = parse_config(
        r#"
        config_version = 1
        [grid]
        sessions = 8
        "#,
    );
    assert!(edited.is_err(), "8 sessions is out of range");

    let edited = parse_config(
        r#"
        config_version = 1
        [window]
        start = "10:00"
        end = "18:00"
        [grid]
        sessions = 4
        groups = 2
        [alerts]
        lead_minutes = 1
        "#,
    )
    .unwrap();

    // 4 x 2 over eight hours: hourly boundaries with a 1-minute lead
    assert!(driver.update_plan(edited.plan_config_on(date()).unwrap()).unwrap().is_none());
    assert!(driver.has_pending_edit());

    let events = run(&mut driver, at(11, 0, 0), at(11, 2, 0));
    assert!(matches!(
        events.first(),
        Some((_, CoreEvent::ScheduleChanged { boundary_count: 9, while_running: true, .. }))
    ));
    let cursor = driver.cursor().unwrap();
    assert_eq!(cursor.next_boundary, Some(at(12, 0, 0)));
    assert_eq!(cursor.next_warning, Some(at(11, 59, 0)));
    assert_eq!(mock.schedule_calls(), 2);
    assert_eq!(mock.pending().len(), 9);
}

#[test]
fn test_degenerate_window_from_config() {
    let plan = parse_config(
        r#"
        config_version = 1
        [window]
        start = "18:00"
        end = "10:00"
        [grid]
        sessions = 7
        groups = 8
        "#,
    )
    .unwrap();
    let (mut driver, mock) = make_driver(&plan);

    assert_eq!(driver.schedule().boundaries(), &[at(18, 0, 0)]);
    driver.start(at(17, 0, 0));
    assert_eq!(mock.pending().len(), 1);

    let events = run(&mut driver, at(17, 59, 0), at(18, 0, 1));
    assert_eq!(mock.early_warning_count(), 1);
    assert_eq!(mock.session_end_count(), 1);
    assert!(events.iter().any(|(_, e)| matches!(e, CoreEvent::SessionEnded { .. })));
}

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TWO_BY_TWO.as_bytes()).unwrap();

    let plan = load_config(file.path()).unwrap();
    assert_eq!(plan.grid, Grid::new(2, 2).unwrap());
    assert_eq!(plan.lead_minutes, LeadMinutes::new(5).unwrap());

    let config = plan.plan_config_on(date()).unwrap();
    assert_eq!(
        config,
        PlanConfig {
            window: TimeWindow::new(at(10, 0, 0), at(18, 0, 0)),
            grid: Grid::new(2, 2).unwrap(),
            lead_minutes: LeadMinutes::new(5).unwrap(),
        }
    );
}
