//! Single-owner runtime for the history store.
//!
//! One actor task owns the [`HistoryStore`]; the capture loop and every host
//! action go through its queue, so move-to-front dedup never races with a
//! removal or a favorite toggle. Polls read the clipboard from inside the
//! actor, which orders them against copy's clipboard write. Each mutation queues a snapshot on the
//! [`Persister`] and the in-memory change stands whether or not it lands.


use tokio::sync::{mpsc, oneshot};

use crate::entry::{Entry, EntryRecord};
use crate::error::{ClippyError, ClippyResult};
use crate::focus::FocusDebouncer;
use crate::format::{build_result, summarize_for_error, ResultRecord};
use crate::persistence::Persister;
use crate::platform::{Notifications, SharedClipboard};
use crate::query::top_matches;
use crate::store::{CaptureOutcome, HistoryStore};
use crate::utils::time::now_millis;

const PERSIST_FAILED: &str = "Failed to persist history";
const CLEAR_FAILED: &str = "Failed to clear history";
const FAVORITE_FAILED: &str = "Failed to update favourites";
const COPY_FAILED: &str = "Copy failed";

pub(crate) enum HistoryCommand {
    Poll {
        reply: oneshot::Sender<ClippyResult<CaptureOutcome>>,
    },
    Capture {
        text: String,
        reply: oneshot::Sender<CaptureOutcome>,
    },
    Copy {
        record: EntryRecord,
        reply: oneshot::Sender<ClippyResult<bool>>,
    },
    Remove {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    SetFavorite {
        id: String,
        value: bool,
        reply: oneshot::Sender<bool>,
    },
    Query {
        query: String,
        favorites_only: bool,
        limit: usize,
        reply: oneshot::Sender<Vec<Entry>>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

pub(crate) struct HistoryActor {
    store: HistoryStore,
    clipboard: SharedClipboard,
    persister: Persister,
    notifications: Notifications,
    focus: FocusDebouncer,
    commands: mpsc::UnboundedReceiver<HistoryCommand>,
}

impl HistoryActor {
    pub(crate) async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                HistoryCommand::Poll { reply } => {
                    let outcome = self.clipboard.read_text().map(|text| self.capture(&text));
                    let _ = reply.send(outcome);
                }
                HistoryCommand::Capture { text, reply } => {
                    let _ = reply.send(self.capture(&text));
                }
                HistoryCommand::Copy { record, reply } => {
                    let _ = reply.send(self.copy(&record));
                }
                HistoryCommand::Remove { id, reply } => {
                    let _ = reply.send(self.remove(&id));
                }
                HistoryCommand::Clear { reply } => {
                    self.store.clear();
                    self.persist(CLEAR_FAILED);
                    let _ = reply.send(());
                }
                HistoryCommand::SetFavorite { id, value, reply } => {
                    let _ = reply.send(self.set_favorite(&id, value));
                }
                HistoryCommand::Query {
                    query,
                    favorites_only,
                    limit,
                    reply,
                } => {
                    let matches = top_matches(self.store.entries(), &query, favorites_only, limit)
                        .into_iter()
                        .cloned()
                        .collect();
                    let _ = reply.send(matches);
                }
                HistoryCommand::Flush { reply } => {
                    let _ = self.persister.flush().await;
                    let _ = reply.send(());
                }
                HistoryCommand::Shutdown { reply } => {
                    self.focus.cancel();
                    let _ = self.persister.flush().await;
                    let _ = reply.send(());
                    break;
                }
            }
        }
        tracing::debug!("clipboard history runtime stopped");
    }

    fn capture(&mut self, text: &str) -> CaptureOutcome {
        let outcome = self.store.capture(text, now_millis());
        match &outcome {
            CaptureOutcome::Inserted(id) => tracing::debug!("captured clipboard entry {id}"),
            CaptureOutcome::Moved(id) => tracing::debug!("moved clipboard entry {id} to front"),
            CaptureOutcome::Discarded | CaptureOutcome::Unchanged => {}
        }
        if outcome.is_mutation() {
            self.persist(PERSIST_FAILED);
        }
        outcome
    }

    fn copy(&mut self, record: &EntryRecord) -> ClippyResult<bool> {
        if let Err(error) = self.clipboard.write_text(&record.text) {
            let preview = summarize_for_error(&record.text);
            let detail = if preview.is_empty() {
                error.to_string()
            } else {
                format!("{preview}\n{error}")
            };
            self.notifications.error(COPY_FAILED, &detail);
            return Err(error);
        }

        let promoted = self.store.promote(record, now_millis());
        if promoted {
            self.persist(PERSIST_FAILED);
        }
        Ok(promoted)
    }

    fn remove(&mut self, id: &str) -> bool {
        let removed = self.store.remove(id);
        if removed {
            self.persist(PERSIST_FAILED);
        }
        removed
    }

    fn set_favorite(&mut self, id: &str, value: bool) -> bool {
        if !self.store.set_favorite(id, value) {
            return false;
        }
        self.persist(FAVORITE_FAILED);
        self.focus.request();
        true
    }

    fn persist(&self, failure_title: &'static str) {
        if let Err(error) = self.persister.save(self.store.records(), failure_title) {
            tracing::warn!("history snapshot not queued: {error}");
        }
    }
}

/// Cloneable entry point to the history runtime.
#[derive(Clone)]
pub struct HistoryHandle {
    commands: mpsc::UnboundedSender<HistoryCommand>,
    max_results: usize,
}

impl HistoryHandle {
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> HistoryCommand,
    ) -> ClippyResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| ClippyError::Stopped)?;
        reply_rx.await.map_err(|_| ClippyError::Stopped)
    }

    /// Reads the clipboard and captures whatever it holds.
    pub async fn poll(&self) -> ClippyResult<CaptureOutcome> {
        self.request(|reply| HistoryCommand::Poll { reply }).await?
    }

    /// Feeds already-read clipboard text through the dedup policy.
    pub async fn capture(&self, text: String) -> ClippyResult<CaptureOutcome> {
        self.request(|reply| HistoryCommand::Capture { text, reply }).await
    }

    /// Writes the record's text to the clipboard, then promotes it. Returns
    /// whether the store changed.
    pub async fn copy(&self, record: EntryRecord) -> ClippyResult<bool> {
        self.request(|reply| HistoryCommand::Copy { record, reply }).await?
    }

    pub async fn remove(&self, id: &str) -> ClippyResult<bool> {
        let id = id.to_string();
        self.request(|reply| HistoryCommand::Remove { id, reply }).await
    }

    pub async fn clear(&self) -> ClippyResult<()> {
        self.request(|reply| HistoryCommand::Clear { reply }).await
    }

    pub async fn set_favorite(&self, id: &str, value: bool) -> ClippyResult<bool> {
        let id = id.to_string();
        self.request(|reply| HistoryCommand::SetFavorite { id, value, reply }).await
    }

    /// Every entry matching `query`, most recent first.
    pub async fn entries(&self, query: &str) -> ClippyResult<Vec<Entry>> {
        self.query(query, false, usize::MAX).await
    }

    pub async fn favorites(&self, query: &str) -> ClippyResult<Vec<Entry>> {
        self.query(query, true, usize::MAX).await
    }

    /// Formatted matches, capped to the configured result count.
    pub async fn search(&self, query: &str) -> ClippyResult<Vec<ResultRecord>> {
        let entries = self.query(query, false, self.max_results).await?;
        Ok(format_results(&entries))
    }

    pub async fn search_favorites(&self, query: &str) -> ClippyResult<Vec<ResultRecord>> {
        let entries = self.query(query, true, self.max_results).await?;
        Ok(format_results(&entries))
    }

    /// Waits until every snapshot queued so far has been written.
    pub async fn flush(&self) -> ClippyResult<()> {
        self.request(|reply| HistoryCommand::Flush { reply }).await
    }

    /// Drains pending writes and stops the runtime.
    pub async fn shutdown(&self) -> ClippyResult<()> {
        self.request(|reply| HistoryCommand::Shutdown { reply }).await
    }

    async fn query(
        &self,
        query: &str,
        favorites_only: bool,
        limit: usize,
    ) -> ClippyResult<Vec<Entry>> {
        let query = query.to_string();
        self.request(|reply| HistoryCommand::Query {
            query,
            favorites_only,
            limit,
            reply,
        }).await
    }
}

fn format_results(entries: &[Entry]) -> Vec<ResultRecord> {
    let now = now_millis();
    entries.iter().map(|entry| build_result(entry, now)).collect()
}

pub fn spawn_history(
    store: HistoryStore,
    clipboard: SharedClipboard,
    persister: Persister,
    notifications: Notifications,
    focus: FocusDebouncer,
    max_results: usize,
) -> HistoryHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let actor = HistoryActor {
        store,
        clipboard,
        persister,
        notifications,
        focus,
        commands: commands_rx,
    };

    tokio::spawn(async move {
        actor.run().await;
    });

    HistoryHandle {
        commands: commands_tx,
        max_results,
    }
}
