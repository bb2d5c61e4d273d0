//! Alert dispatcher trait interfaces for stint
//!
//! This crate defines the boundary between the scheduling engine and
//! whatever actually makes noise: sound, haptics, desktop notifications.
//! It contains no platform code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
