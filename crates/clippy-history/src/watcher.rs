//! Periodic clipboard capture.
//!
//! The loop only schedules polls. The clipboard itself is read by the history
//! actor, so a poll can never act on text that a concurrent copy has already
//! replaced.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ClippyError;
use crate::history::HistoryHandle;
use crate::platform::Notifications;

const READ_FAILED: &str = "Clipboard read failed";

/// One poll of the clipboard. Returns `false` once the history runtime is
/// gone and polling should stop; every other failure is reported and
/// swallowed.
pub async fn capture_tick(history: &HistoryHandle, notifications: &Notifications) -> bool {
    match history.poll().await {
        Ok(_) => true,
        Err(ClippyError::Stopped) => false,
        Err(error @ ClippyError::ClipboardRead(_)) => {
            notifications.error(READ_FAILED, &error.to_string());
            true
        }
        Err(error) => {
            tracing::warn!("unexpected error while tracking clipboard: {error}");
            true
        }
    }
}

/// Polls the clipboard every `poll_interval`, starting immediately, until
/// `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_clipboard_watcher(
    history: HistoryHandle,
    notifications: Notifications,
    mut shutdown: watch::Receiver<bool>,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if !capture_tick(&history, &notifications).await {
                        break;
                    }
                }
            }
        }
        tracing::debug!("clipboard watcher stopped");
    })
}
