//! Local alert dispatcher for stintd
//!
//! Provides:
//! - Immediate alerts: terminal bell plus an optional sound command
//! - Deferred notifications: one tokio timer per entry, delivered through
//!   an optional notify command

mod command;
mod dispatcher;

pub use command::*;
pub use dispatcher::*;
