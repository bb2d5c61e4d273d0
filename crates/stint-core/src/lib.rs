//! Core scheduling engine and alarm state machine for stint
//!
//! This crate is the heart of stint, containing:
//! - Schedule computation (evenly spaced boundaries across a window)
//! - Early-warning resolution
//! - The alarm cursor (next boundary and warning after "now")
//! - The tick driver state machine (Stopped <-> Running)

mod cursor;
mod driver;
mod events;
mod schedule;
mod warning;

pub use cursor::*;
pub use driver::*;
pub use events::*;
pub use schedule::*;
pub use warning::*;
