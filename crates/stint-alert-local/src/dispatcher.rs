//! Local dispatcher implementation

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use stint_alert_api::{AlertDispatcher, AlertError, AlertEvent, AlertKind};
use stint_api::ScheduledAlert;
use stint_util::NotificationId;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::{AlertCommands, ring_bell, run_command};

/// Title shown on every deferred notification
pub const NOTIFICATION_TITLE: &str = "Session ends (early alert)";

/// Dispatcher backed by the local terminal and optional external commands.
///
/// Deferred notifications only live as long as the process; they are timers
/// on the tokio runtime that was current when the dispatcher was created.
pub struct LocalDispatcher {
    commands: AlertCommands,
    runtime: Option<Handle>,
    pending: Arc<Mutex<HashMap<NotificationId, JoinHandle<()>>>>,
    event_tx: mpsc::UnboundedSender<AlertEvent>,
    event_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<AlertEvent>>>>,
}

impl LocalDispatcher {
    pub fn new(commands: AlertCommands) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("No tokio runtime; deferred notifications are unavailable");
        }

        Self {
            commands,
            runtime,
            pending: Arc::new(Mutex::new(HashMap::new())),
            event_tx: tx,
            event_rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    fn play(&self, kind: AlertKind, command: Option<&Vec<String>>) {
        ring_bell();

        let Some(argv) = command.cloned() else {
            return;
        };
        let Some(runtime) = &self.runtime else {
            let _ = self.event_tx.send(AlertEvent::PlaybackFailed {
                kind,
                error: AlertError::NoRuntime.to_string(),
            });
            return;
        };

        let event_tx = self.event_tx.clone();
        runtime.spawn(async move {
            if let Err(e) = run_command(&argv, &[]).await {
                warn!(kind = ?kind, error = %e, "Alert sound failed");
                let _ = event_tx.send(AlertEvent::PlaybackFailed {
                    kind,
                    error: e.to_string(),
                });
            }
        });
    }

    fn abort_pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap();
        let count = pending.values().filter(|h| !h.is_finished()).count();
        for (_, handle) in pending.drain() {
            handle.abort();
        }
        count
    }
}

impl AlertDispatcher for LocalDispatcher {
    fn schedule_all(&self, entries: Vec<ScheduledAlert>) {
        self.abort_pending();

        let Some(runtime) = &self.runtime else {
            for entry in entries {
                let _ = self.event_tx.send(AlertEvent::ScheduleFailed {
                    label: entry.label,
                    error: AlertError::NoRuntime.to_string(),
                });
            }
            return;
        };

        let now = stint_util::now();
        let mut accepted = 0;
        let mut skipped = 0;
        let mut pending = self.pending.lock().unwrap();

        for entry in entries {
            // Entries at or before now are never delivered
            let Ok(delay) = (entry.at - now).to_std() else {
                debug!(at = %entry.at, label = %entry.label, "Skipping notification in the past");
                skipped += 1;
                continue;
            };
            if delay.is_zero() {
                skipped += 1;
                continue;
            }

            let id = NotificationId::new();
            let notify = self.commands.notify.clone();
            let event_tx = self.event_tx.clone();
            let pending_map = self.pending.clone();
            let label = entry.label;

            let handle = runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                deliver(notify.as_deref(), &label, &event_tx).await;
                let _ = event_tx.send(AlertEvent::Delivered { id, label });
                pending_map.lock().unwrap().remove(&id);
            });
            pending.insert(id, handle);
            accepted += 1;
        }
        drop(pending);

        info!(accepted, skipped, "Deferred notifications scheduled");
        let _ = self.event_tx.send(AlertEvent::Scheduled { accepted, skipped });
    }

    fn cancel_all(&self) {
        let count = self.abort_pending();
        if count > 0 {
            info!(count, "Cancelled pending notifications");
        }
        let _ = self.event_tx.send(AlertEvent::Cancelled { count });
    }

    fn fire_early_warning(&self) {
        self.play(AlertKind::EarlyWarning, self.commands.early_warning.as_ref());
    }

    fn fire_session_end(&self) {
        self.play(AlertKind::SessionEnd, self.commands.session_end.as_ref());
    }

    fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap()
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AlertEvent> {
        self.event_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once")
    }
}

impl Drop for LocalDispatcher {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

async fn deliver(notify: Option<&[String]>, label: &str, event_tx: &mpsc::UnboundedSender<AlertEvent>) {
    match notify {
        Some(argv) => {
            if let Err(e) = run_command(argv, &[NOTIFICATION_TITLE, label]).await {
                let e = AlertError::DeliveryFailed(e.to_string());
                warn!(label = %label, error = %e, "Notification command failed");
                let _ = event_tx.send(AlertEvent::PlaybackFailed {
                    kind: AlertKind::Deferred,
                    error: e.to_string(),
                });
            }
        }
        None => {
            ring_bell();
            info!(title = NOTIFICATION_TITLE, body = %label, "Notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local};
    use std::time::Duration;

    fn alert(at: DateTime<Local>, label: &str) -> ScheduledAlert {
        ScheduledAlert {
            at,
            boundary: at,
            label: label.into(),
        }
    }

    fn in_millis(ms: i64) -> DateTime<Local> {
        stint_util::now() + chrono::Duration::milliseconds(ms)
    }

    fn quiet() -> AlertCommands {
        AlertCommands {
            notify: Some(vec!["true".into()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_past_entries_skipped() {
        let dispatcher = LocalDispatcher::new(quiet());
        let mut rx = dispatcher.subscribe();

        dispatcher.schedule_all(vec![
            alert(in_millis(-60_000), "past"),
            alert(in_millis(60_000), "future"),
        ]);

        assert_eq!(dispatcher.pending_count(), 1);
        match rx.recv().await.unwrap() {
            AlertEvent::Scheduled { accepted, skipped } => {
                assert_eq!(accepted, 1);
                assert_eq!(skipped, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_schedule_replaces_previous_set() {
        let dispatcher = LocalDispatcher::new(quiet());
        dispatcher.schedule_all(vec![alert(in_millis(60_000), "a"), alert(in_millis(120_000), "b")]);
        assert_eq!(dispatcher.pending_count(), 2);

        dispatcher.schedule_all(vec![alert(in_millis(60_000), "c")]);
        assert_eq!(dispatcher.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let dispatcher = LocalDispatcher::new(quiet());
        let mut rx = dispatcher.subscribe();
        dispatcher.schedule_all(vec![alert(in_millis(60_000), "a"), alert(in_millis(120_000), "b")]);
        dispatcher.cancel_all();

        assert_eq!(dispatcher.pending_count(), 0);
        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Scheduled { accepted: 2, .. }));
        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Cancelled { count: 2 }));
    }

    #[tokio::test]
    async fn test_notification_delivered() {
        let dispatcher = LocalDispatcher::new(quiet());
        let mut rx = dispatcher.subscribe();
        dispatcher.schedule_all(vec![alert(in_millis(50), "Session: 12:00 | Clear the track")]);

        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Scheduled { .. }));
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            AlertEvent::Delivered { label, .. } => assert_eq!(label, "Session: 12:00 | Clear the track"),
            other => panic!("unexpected event {:?}", other),
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_sound_reported() {
        let dispatcher = LocalDispatcher::new(AlertCommands {
            session_end: Some(vec!["false".into()]),
            ..Default::default()
        });
        let mut rx = dispatcher.subscribe();
        dispatcher.fire_session_end();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            AlertEvent::PlaybackFailed {
                kind: AlertKind::SessionEnd,
                ..
            }
        ));
    }

    #[test]
    fn test_without_runtime() {
        let dispatcher = LocalDispatcher::new(AlertCommands::default());
        let mut rx = dispatcher.subscribe();

        dispatcher.schedule_all(vec![alert(in_millis(60_000), "a")]);
        dispatcher.fire_early_warning();

        assert_eq!(dispatcher.pending_count(), 0);
        assert!(matches!(rx.try_recv().unwrap(), AlertEvent::ScheduleFailed { .. }));
        assert!(rx.try_recv().is_err());
    }
}
