//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Time window divided into sessions
    #[serde(default)]
    pub window: RawWindow,

    /// Sessions × groups layout
    #[serde(default)]
    pub grid: RawGrid,

    /// Alert settings
    #[serde(default)]
    pub alerts: RawAlerts,

    /// Daemon-level settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,
}

/// Window bounds, resolved against the current date at load time
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawWindow {
    /// Start time (HH:MM format)
    #[serde(default = "default_start")]
    pub start: String,

    /// End time (HH:MM format)
    #[serde(default = "default_end")]
    pub end: String,
}

impl Default for RawWindow {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
        }
    }
}

fn default_start() -> String {
    "10:00".to_string()
}

fn default_end() -> String {
    "18:00".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawGrid {
    #[serde(default = "default_one")]
    pub sessions: u32,

    #[serde(default = "default_one")]
    pub groups: u32,
}

impl Default for RawGrid {
    fn default() -> Self {
        Self {
            sessions: 1,
            groups: 1,
        }
    }
}

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAlerts {
    /// Minutes before each boundary to warn
    #[serde(default = "default_one")]
    pub lead_minutes: u32,

    /// Body text appended to every deferred notification
    pub message: Option<String>,

    /// Command run for the early-warning sound (argv form)
    pub early_warning_command: Option<Vec<String>>,

    /// Command run for the session-end sound (argv form)
    pub session_end_command: Option<Vec<String>>,

    /// Command used to deliver deferred notifications; receives title and body
    pub notify_command: Option<Vec<String>>,
}

impl Default for RawAlerts {
    fn default() -> Self {
        Self {
            lead_minutes: 1,
            message: None,
            early_warning_command: None,
            session_end_command: None,
            notify_command: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Tick period in milliseconds (default 1000)
    pub tick_interval_ms: Option<u64>,

    /// Start the driver as soon as the daemon is up
    #[serde(default)]
    pub autostart: bool,
}
