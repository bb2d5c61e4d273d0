//! Alert dispatcher traits

use serde::{Deserialize, Serialize};
use stint_api::ScheduledAlert;
use stint_util::NotificationId;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from alert dispatcher operations
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("No async runtime available to schedule notifications")]
    NoRuntime,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AlertResult<T> = Result<T, AlertError>;

/// Which alert an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    EarlyWarning,
    SessionEnd,
    Deferred,
}

/// Asynchronous outcomes reported by a dispatcher.
///
/// These exist for logging and diagnostics only. Nothing in the engine
/// waits on them.
#[derive(Debug, Clone)]
pub enum AlertEvent {
    /// A `schedule_all` call finished registering notifications
    Scheduled { accepted: usize, skipped: usize },

    /// A single deferred notification could not be registered
    ScheduleFailed { label: String, error: String },

    /// A deferred notification fired
    Delivered { id: NotificationId, label: String },

    /// Pending notifications were removed
    Cancelled { count: usize },

    /// An immediate or deferred alert could not be played
    PlaybackFailed { kind: AlertKind, error: String },
}

/// Alert dispatcher - implemented by platform-specific backends.
///
/// Every method must return promptly: the engine calls them from its tick,
/// which has to finish well within one second. Slow work (playing a sound,
/// waiting for a notification time) belongs on a background task.
pub trait AlertDispatcher: Send + Sync {
    /// Replace the full set of deferred notifications
    fn schedule_all(&self, entries: Vec<ScheduledAlert>);

    /// Remove every pending deferred notification
    fn cancel_all(&self);

    /// Immediate alert: early warning reached
    fn fire_early_warning(&self);

    /// Immediate alert: session boundary reached
    fn fire_session_end(&self);

    /// Number of deferred notifications still pending
    fn pending_count(&self) -> usize;

    /// Subscribe to dispatcher events
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AlertEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "paplay");
        let err: AlertError = io.into();
        assert!(matches!(err, AlertError::Io(_)));
        assert!(err.to_string().contains("paplay"));
    }
}
