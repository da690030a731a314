//! History file encoding, lenient loading, and the single writer task.

use std::collections::HashSet;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::entry::{build_entry, Entry, EntryOverrides, EntryRecord};
use crate::error::{ClippyError, ClippyResult};
use crate::platform::Notifications;
use crate::storage::SharedStorage;

/// Rebuilds entries from a stored document. Anything that is not an array
/// yields an empty history; records are rebuilt through the capture rules.
pub fn decode_history(
    document: &Value,
    max_items: usize,
    max_chars: usize,
    now: i64,
) -> Vec<Entry> {
    let Some(items) = document.as_array() else {
        tracing::warn!("history document is not an array, starting empty");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| decode_record(item, max_chars, now))
        .filter(|entry| seen.insert(entry.signature.clone()))
        .take(max_items)
        .collect()
}

fn decode_record(item: &Value, max_chars: usize, now: i64) -> Option<Entry> {
    let text = item.get("text")?.as_str()?;
    let overrides = EntryOverrides {
        id: item.get("id").and_then(Value::as_str).map(str::to_string),
        created_at: item.get("createdAt").and_then(as_timestamp),
        is_favorite: item
            .get("isFavorite")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };
    build_entry(text, max_chars, overrides, now)
}

// Floats outside the i64 range would saturate, so they count as missing.
fn as_timestamp(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|millis| millis.is_finite())
            .filter(|millis| *millis >= i64::MIN as f64 && *millis < i64::MAX as f64)
            .map(|millis| millis as i64)
    })
}

pub fn encode_history(records: &[EntryRecord]) -> ClippyResult<Value> {
    serde_json::to_value(records)
        .map_err(|error| ClippyError::Persistence(format!("history serialize error: {error}")))
}

/// Loads the stored history, degrading to empty on any failure.
pub async fn load_history(
    storage: &SharedStorage,
    max_items: usize,
    max_chars: usize,
    now: i64,
) -> Vec<Entry> {
    match storage.read().await {
        Ok(Some(document)) => decode_history(&document, max_items, max_chars, now),
        Ok(None) => Vec::new(),
        Err(error) => {
            tracing::warn!("failed to load clipboard history, starting empty: {error}");
            Vec::new()
        }
    }
}

pub async fn save_history(storage: &SharedStorage, records: &[EntryRecord]) -> ClippyResult<()> {
    let document = encode_history(records)?;
    storage.write(&document).await
}

enum PersistJob {
    Save {
        records: Vec<EntryRecord>,
        failure_title: &'static str,
    },
    Flush(oneshot::Sender<()>),
}

/// Queue in front of the one task allowed to write the history file.
#[derive(Clone)]
pub struct Persister {
    jobs: mpsc::UnboundedSender<PersistJob>,
}

impl Persister {
    /// Queues a snapshot. Failures are reported under `failure_title`.
    pub fn save(&self, records: Vec<EntryRecord>, failure_title: &'static str) -> ClippyResult<()> {
        self.jobs
            .send(PersistJob::Save {
                records,
                failure_title,
            })
            .map_err(|_| ClippyError::Stopped)
    }

    /// Resolves once every snapshot queued before the call has been written.
    pub async fn flush(&self) -> ClippyResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.jobs
            .send(PersistJob::Flush(reply_tx))
            .map_err(|_| ClippyError::Stopped)?;
        reply_rx.await.map_err(|_| ClippyError::Stopped)
    }
}

pub fn spawn_persister(storage: SharedStorage, notifications: Notifications) -> Persister {
    let (jobs, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match job {
                PersistJob::Save {
                    records,
                    failure_title,
                } => {
                    if let Err(error) = save_history(&storage, &records).await {
                        notifications.error(failure_title, &error.to_string());
                    } else {
                        tracing::debug!("persisted {} clipboard entries", records.len());
                    }
                }
                PersistJob::Flush(reply) => {
                    let _ = reply.send(());
                }
            }
        }
    });
    Persister { jobs }
}
