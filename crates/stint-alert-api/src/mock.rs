//! Mock alert dispatcher for testing

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stint_api::ScheduledAlert;
use stint_util::NotificationId;
use tokio::sync::mpsc;

use crate::{AlertDispatcher, AlertEvent};

/// Records every call so tests can assert on exactly what the engine asked for
pub struct MockDispatcher {
    pending: Arc<Mutex<Vec<ScheduledAlert>>>,
    early_warnings: AtomicUsize,
    session_ends: AtomicUsize,
    schedule_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
    event_tx: mpsc::UnboundedSender<AlertEvent>,
    event_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<AlertEvent>>>>,

    /// Configure scheduling to fail (simulates denied notification permission)
    pub fail_schedule: Arc<Mutex<bool>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            pending: Arc::new(Mutex::new(Vec::new())),
            early_warnings: AtomicUsize::new(0),
            session_ends: AtomicUsize::new(0),
            schedule_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            event_tx: tx,
            event_rx: Arc::new(Mutex::new(Some(rx))),
            fail_schedule: Arc::new(Mutex::new(false)),
        }
    }

    /// Snapshot of the pending deferred notifications
    pub fn pending(&self) -> Vec<ScheduledAlert> {
        self.pending.lock().unwrap().clone()
    }

    pub fn early_warning_count(&self) -> usize {
        self.early_warnings.load(Ordering::SeqCst)
    }

    pub fn session_end_count(&self) -> usize {
        self.session_ends.load(Ordering::SeqCst)
    }

    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    /// Simulate delivery of the earliest pending notification
    pub fn deliver_next(&self) -> Option<ScheduledAlert> {
        let mut pending = self.pending.lock().unwrap();
        let idx = pending
            .iter()
            .enumerate()
            .min_by_key(|(_, alert)| alert.at)
            .map(|(i, _)| i)?;
        let alert = pending.remove(idx);
        let _ = self.event_tx.send(AlertEvent::Delivered {
            id: NotificationId::new(),
            label: alert.label.clone(),
        });
        Some(alert)
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertDispatcher for MockDispatcher {
    fn schedule_all(&self, entries: Vec<ScheduledAlert>) {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);

        let mut pending = self.pending.lock().unwrap();
        pending.clear();

        if *self.fail_schedule.lock().unwrap() {
            for entry in entries {
                let _ = self.event_tx.send(AlertEvent::ScheduleFailed {
                    label: entry.label,
                    error: "Mock schedule failure".into(),
                });
            }
            return;
        }

        let accepted = entries.len();
        pending.extend(entries);
        let _ = self.event_tx.send(AlertEvent::Scheduled {
            accepted,
            skipped: 0,
        });
    }

    fn cancel_all(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        let count = {
            let mut pending = self.pending.lock().unwrap();
            let count = pending.len();
            pending.clear();
            count
        };
        let _ = self.event_tx.send(AlertEvent::Cancelled { count });
    }

    fn fire_early_warning(&self) {
        self.early_warnings.fetch_add(1, Ordering::SeqCst);
    }

    fn fire_session_end(&self) {
        self.session_ends.fetch_add(1, Ordering::SeqCst);
    }

    fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AlertEvent> {
        self.event_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn alert(hour: u32, minute: u32) -> ScheduledAlert {
        let at = Local.with_ymd_and_hms(2025, 12, 25, hour, minute, 0).unwrap();
        ScheduledAlert {
            at,
            boundary: at + chrono::Duration::minutes(5),
            label: format!("{:02}:{:02}", hour, minute),
        }
    }

    #[test]
    fn schedule_all_replaces_previous_set() {
        let mock = MockDispatcher::new();
        let _rx = mock.subscribe();

        mock.schedule_all(vec![alert(11, 55), alert(13, 55)]);
        assert_eq!(mock.pending_count(), 2);

        mock.schedule_all(vec![alert(15, 55)]);
        assert_eq!(mock.pending_count(), 1);
        assert_eq!(mock.pending()[0].label, "15:55");
        assert_eq!(mock.schedule_calls(), 2);
    }

    #[test]
    fn cancel_all_empties_pending() {
        let mock = MockDispatcher::new();
        let mut rx = mock.subscribe();

        mock.schedule_all(vec![alert(11, 55), alert(13, 55)]);
        mock.cancel_all();

        assert_eq!(mock.pending_count(), 0);
        assert_eq!(mock.cancel_calls(), 1);

        assert!(matches!(rx.try_recv(), Ok(AlertEvent::Scheduled { accepted: 2, .. })));
        assert!(matches!(rx.try_recv(), Ok(AlertEvent::Cancelled { count: 2 })));
    }

    #[test]
    fn failing_schedule_reports_each_entry() {
        let mock = MockDispatcher::new();
        let mut rx = mock.subscribe();
        *mock.fail_schedule.lock().unwrap() = true;

        mock.schedule_all(vec![alert(11, 55), alert(13, 55)]);

        assert_eq!(mock.pending_count(), 0);
        assert!(matches!(rx.try_recv(), Ok(AlertEvent::ScheduleFailed { .. })));
        assert!(matches!(rx.try_recv(), Ok(AlertEvent::ScheduleFailed { .. })));
    }

    #[test]
    fn deliver_next_takes_earliest() {
        let mock = MockDispatcher::new();
        let _rx = mock.subscribe();

        mock.schedule_all(vec![alert(13, 55), alert(11, 55)]);
        let delivered = mock.deliver_next().unwrap();
        assert_eq!(delivered.label, "11:55");
        assert_eq!(mock.pending_count(), 1);
    }
}
