//! Shared data types for stint
//!
//! This crate defines the plain data exchanged between the engine and its
//! collaborators:
//! - Plan inputs (window, grid, lead minutes)
//! - Deferred notification entries
//! - Display snapshot for the running clock
//! - Commands accepted from the shell

mod commands;
mod types;

pub use commands::*;
pub use types::*;

/// Largest number of sessions selectable in the picker
pub const SESSIONS_MAX: u32 = 7;

/// Largest number of groups selectable in the picker
pub const GROUPS_MAX: u32 = 8;

/// Largest early-warning offset, in minutes
pub const LEAD_MINUTES_MAX: u32 = 10;

/// Default tick period of the driver
pub const DEFAULT_TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Default body text appended to every deferred notification
pub const DEFAULT_NOTIFICATION_MESSAGE: &str = "Get the cars out of the track";
