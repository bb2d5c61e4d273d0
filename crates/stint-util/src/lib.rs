//! Shared utilities for stint
//!
//! This crate provides:
//! - ID types (NotificationId)
//! - Time utilities (mockable wall clock, minute arithmetic, display formatting)
//! - Error types
//! - Default paths for the config file

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
