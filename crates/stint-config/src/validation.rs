//! Configuration validation

use crate::schema::{RawAlerts, RawConfig};
use stint_api::{GROUPS_MAX, LEAD_MINUTES_MAX, SESSIONS_MAX};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid time format '{value}': {message}")]
    InvalidTimeFormat { value: String, message: String },

    #[error("grid.{field} = {value} is outside 1-{max}")]
    GridOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("alerts.lead_minutes = {0} is outside 1-{max}", max = LEAD_MINUTES_MAX)]
    LeadMinutesOutOfRange(u32),

    #[error("alerts.{0} cannot be empty")]
    EmptyCommand(&'static str),

    #[error("daemon.tick_interval_ms must be greater than zero")]
    ZeroTickInterval,
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let start = parse_time(&config.window.start);
    let end = parse_time(&config.window.end);
    for (value, parsed) in [(&config.window.start, &start), (&config.window.end, &end)] {
        if let Err(message) = parsed {
            errors.push(ValidationError::InvalidTimeFormat {
                value: value.clone(),
                message: message.clone(),
            });
        }
    }

    // A window that ends before it starts still loads; the schedule collapses
    // to the start boundary.
    if let (Ok(s), Ok(e)) = (start, end)
        && e <= s
    {
        tracing::warn!(
            start = %config.window.start,
            end = %config.window.end,
            "Window end is not after start; only the start boundary will be scheduled"
        );
    }

    if !(1..=SESSIONS_MAX).contains(&config.grid.sessions) {
        errors.push(ValidationError::GridOutOfRange {
            field: "sessions",
            value: config.grid.sessions,
            max: SESSIONS_MAX,
        });
    }
    if !(1..=GROUPS_MAX).contains(&config.grid.groups) {
        errors.push(ValidationError::GridOutOfRange {
            field: "groups",
            value: config.grid.groups,
            max: GROUPS_MAX,
        });
    }

    errors.extend(validate_alerts(&config.alerts));

    if config.daemon.tick_interval_ms == Some(0) {
        errors.push(ValidationError::ZeroTickInterval);
    }

    errors
}

fn validate_alerts(alerts: &RawAlerts) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !(1..=LEAD_MINUTES_MAX).contains(&alerts.lead_minutes) {
        errors.push(ValidationError::LeadMinutesOutOfRange(alerts.lead_minutes));
    }

    let commands = [
        ("early_warning_command", &alerts.early_warning_command),
        ("session_end_command", &alerts.session_end_command),
        ("notify_command", &alerts.notify_command),
    ];
    for (name, command) in commands {
        if let Some(argv) = command
            && argv.first().is_none_or(|program| program.trim().is_empty())
        {
            errors.push(ValidationError::EmptyCommand(name));
        }
    }

    errors
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<(u8, u8), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected HH:MM format".into());
    }

    let hour: u8 = parts[0]
        .trim()
        .parse()
        .map_err(|_| "Invalid hour".to_string())?;
    let minute: u8 = parts[1]
        .trim()
        .parse()
        .map_err(|_| "Invalid minute".to_string())?;

    if hour >= 24 {
        return Err("Hour must be 0-23".into());
    }
    if minute >= 60 {
        return Err("Minute must be 0-59".into());
    }

    Ok((hour, minute))
}
