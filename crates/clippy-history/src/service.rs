//! Explicitly constructed clipboard history service: one-shot initialization,
//! the host action surface, and shutdown.

use std::path::Path;

use tokio::sync::{watch, Mutex, OnceCell};
use tokio::task::JoinHandle;

use crate::commands::{CommandKind, HistoryAction};
use crate::config::{load_config, HistoryConfig};
use crate::entry::EntryRecord;
use crate::error::{ClippyError, ClippyResult};
use crate::focus::FocusDebouncer;
use crate::format::ResultRecord;
use crate::history::{spawn_history, HistoryHandle};
use crate::persistence::{load_history, spawn_persister};
use crate::platform::{Notifications, SharedClipboard, SharedNotifier, SharedWindowFocus};
use crate::storage::{FileStorage, SharedStorage};
use crate::store::HistoryStore;
use crate::utils::time::now_millis;
use crate::watcher::spawn_clipboard_watcher;

/// Collaborators supplied by the host.
#[derive(Clone)]
pub struct ClippyDeps {
    pub clipboard: SharedClipboard,
    pub storage: SharedStorage,
    pub notifier: Option<SharedNotifier>,
    pub focus: Option<SharedWindowFocus>,
}

impl ClippyDeps {
    pub fn new(clipboard: SharedClipboard, storage: SharedStorage) -> Self {
        Self {
            clipboard,
            storage,
            notifier: None,
            focus: None,
        }
    }

    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_focus(mut self, focus: SharedWindowFocus) -> Self {
        self.focus = Some(focus);
        self
    }
}

struct Running {
    history: HistoryHandle,
    shutdown_tx: watch::Sender<bool>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

pub struct ClippyService {
    deps: ClippyDeps,
    config: HistoryConfig,
    running: OnceCell<Running>,
}

impl ClippyService {
    pub fn new(deps: ClippyDeps, config: HistoryConfig) -> Self {
        Self {
            deps,
            config,
            running: OnceCell::new(),
        }
    }

    /// Reads `clippy.json` from the per-user directory and keeps the history
    /// file next to it.
    pub fn for_user_dir(
        clipboard: SharedClipboard,
        dir: &Path,
        notifier: Option<SharedNotifier>,
        focus: Option<SharedWindowFocus>,
    ) -> Self {
        let config = load_config(dir);
        let storage = FileStorage::with_filename(dir, &config.history_file);
        let deps = ClippyDeps {
            clipboard,
            storage: std::sync::Arc::new(storage),
            notifier,
            focus,
        };
        Self::new(deps, config)
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.running.initialized()
    }

    /// Loads the stored history and starts the capture loop. Runs once;
    /// concurrent callers all wait on the same initialization.
    pub async fn ensure_initialized(&self) -> &HistoryHandle {
        let running = self.running.get_or_init(|| self.start()).await;
        &running.history
    }

    async fn start(&self) -> Running {
        let config = &self.config;
        let notifications = Notifications::new(self.deps.notifier.clone());

        let entries = load_history(
            &self.deps.storage,
            config.max_items,
            config.max_stored_length,
            now_millis(),
        )
        .await;
        let store =
            HistoryStore::new(config.max_items, config.max_stored_length).with_entries(entries);
        tracing::info!("loaded {} clipboard history entries", store.len());

        let persister = spawn_persister(self.deps.storage.clone(), notifications.clone());
        let focus = FocusDebouncer::new(self.deps.focus.clone(), config.focus_debounce());
        let history = spawn_history(
            store,
            self.deps.clipboard.clone(),
            persister,
            notifications.clone(),
            focus,
            config.max_results,
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let watcher = spawn_clipboard_watcher(
            history.clone(),
            notifications,
            shutdown_rx,
            config.poll_interval(),
        );

        Running {
            history,
            shutdown_tx,
            watcher: Mutex::new(Some(watcher)),
        }
    }

    pub async fn search(&self, query: &str) -> ClippyResult<Vec<ResultRecord>> {
        self.ensure_initialized().await.search(query).await
    }

    pub async fn search_favorites(&self, query: &str) -> ClippyResult<Vec<ResultRecord>> {
        self.ensure_initialized().await.search_favorites(query).await
    }

    /// Puts the entry's text back on the clipboard and refreshes its recency.
    /// A failed clipboard write has already been reported as "Copy failed",
    /// so it is not handed back to the host.
    pub async fn copy(&self, record: &EntryRecord) -> ClippyResult<()> {
        match self.ensure_initialized().await.copy(record.clone()).await {
            Ok(_) | Err(ClippyError::ClipboardWrite(_)) => Ok(()),
            Err(error) => Err(error),
        }
    }

    pub async fn remove(&self, record: &EntryRecord) -> ClippyResult<()> {
        self.ensure_initialized().await.remove(&record.id).await?;
        Ok(())
    }

    pub async fn clear(&self) -> ClippyResult<()> {
        self.ensure_initialized().await.clear().await
    }

    pub async fn favorite(&self, record: &EntryRecord) -> ClippyResult<()> {
        self.ensure_initialized()
            .await
            .set_favorite(&record.id, true)
            .await?;
        Ok(())
    }

    pub async fn unfavorite(&self, record: &EntryRecord) -> ClippyResult<()> {
        self.ensure_initialized()
            .await
            .set_favorite(&record.id, false)
            .await?;
        Ok(())
    }

    /// Results for one of the two host commands.
    pub async fn run(&self, kind: CommandKind, query: &str) -> ClippyResult<Vec<ResultRecord>> {
        match kind {
            CommandKind::History => self.search(query).await,
            CommandKind::Favorites => self.search_favorites(query).await,
        }
    }

    /// Dispatches an action picked from a result row.
    pub async fn perform(&self, action: HistoryAction, record: &EntryRecord) -> ClippyResult<()> {
        match action {
            HistoryAction::Copy => self.copy(record).await,
            HistoryAction::AddToFavorites => self.favorite(record).await,
            HistoryAction::RemoveFromFavorites => self.unfavorite(record).await,
            HistoryAction::RemoveFromHistory => self.remove(record).await,
            HistoryAction::ClearHistory => self.clear().await,
        }
    }

    /// Stops the capture loop, writes out pending snapshots and stops the
    /// history runtime. A service that never started has nothing to stop.
    pub async fn shutdown(&self) {
        let Some(running) = self.running.get() else {
            return;
        };
        let _ = running.shutdown_tx.send(true);
        if let Some(watcher) = running.watcher.lock().await.take() {
            if let Err(error) = watcher.await {
                tracing::warn!("clipboard watcher ended abnormally: {error}");
            }
        }
        if let Err(error) = running.history.shutdown().await {
            tracing::debug!("clipboard history already stopped: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILENAME;
    use crate::error::ClippyError;
    use crate::platform::testing::{CountingFocus, RecordingNotifier};
    use crate::platform::MemoryClipboard;
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    struct Fixture {
        service: Arc<ClippyService>,
        clipboard: Arc<MemoryClipboard>,
        storage: Arc<MemoryStorage>,
        notifier: Arc<RecordingNotifier>,
        focus: Arc<CountingFocus>,
    }

    fn fixture_with(storage: MemoryStorage) -> Fixture {
        let clipboard = Arc::new(MemoryClipboard::new());
        let storage = Arc::new(storage);
        let notifier = Arc::new(RecordingNotifier::default());
        let focus = Arc::new(CountingFocus::default());
        let deps = ClippyDeps::new(clipboard.clone(), storage.clone())
            .with_notifier(notifier.clone())
            .with_focus(focus.clone());
        Fixture {
            service: Arc::new(ClippyService::new(deps, HistoryConfig::default())),
            clipboard,
            storage,
            notifier,
            focus,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStorage::new())
    }

    async fn titles(service: &ClippyService, query: &str) -> Vec<String> {
        service
            .search(query)
            .await
            .expect("search")
            .into_iter()
            .map(|result| result.title)
            .collect()
    }

    #[tokio::test]
    async fn concurrent_initialization_loads_once() {
        let f = fixture();
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let service = f.service.clone();
            tasks.push(tokio::spawn(async move {
                service.ensure_initialized().await;
            }));
        }
        for task in tasks {
            task.await.expect("join");
        }
        assert!(f.service.is_initialized());
        assert_eq!(f.storage.read_count(), 1);
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn initialization_restores_stored_history() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "b", "text": "older", "createdAt": 1, "isFavorite": true },
            { "id": "a", "text": "newer", "createdAt": 2, "isFavorite": false }
        ])));
        let results = f.service.search("").await.expect("search");
        let ids: Vec<&str> = results.iter().map(|r| r.data.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let favorites = f.service.search_favorites("").await.expect("favorites");
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].data.id, "b");
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn capture_loop_starts_on_first_use() {
        let f = fixture();
        f.clipboard.set_text("from another app");
        let history = f.service.ensure_initialized().await;
        // The first poll runs immediately; a flush orders us after it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        history.flush().await.expect("flush");
        assert_eq!(titles(&f.service, "").await, vec!["from another app"]);
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn copy_writes_clipboard_and_promotes() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "new", "text": "newer", "createdAt": 20 },
            { "id": "old", "text": "older", "createdAt": 10 }
        ])));
        let history = f.service.ensure_initialized().await.clone();
        let older = history.entries("older").await.expect("entries")[0].record();

        f.service.copy(&older).await.expect("copy");
        assert_eq!(f.clipboard.text(), "older");
        let entries = history.entries("").await.expect("entries");
        assert_eq!(entries[0].id, "old");
        assert_eq!(entries.len(), 2);

        history.flush().await.expect("flush");
        let document = f.storage.document().expect("document");
        assert_eq!(document[0]["id"], "old");
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn failed_copy_reports_and_leaves_store_alone() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "new", "text": "newer", "createdAt": 20 },
            { "id": "old", "text": "older\nline", "createdAt": 10 }
        ])));
        let history = f.service.ensure_initialized().await.clone();
        let older = history.entries("older").await.expect("entries")[0].record();

        f.clipboard.set_fail_writes(true);
        f.service.copy(&older).await.expect("failure is reported, not returned");
        f.service
            .perform(HistoryAction::Copy, &older)
            .await
            .expect("failure is reported, not returned");

        let errors = f.notifier.errors();
        let (title, detail) = errors
            .iter()
            .find(|(title, _)| title == "Copy failed")
            .expect("copy failure reported");
        assert_eq!(title, "Copy failed");
        assert!(detail.starts_with("older line\n"));
        let copy_failures = errors.iter().filter(|(title, _)| title == "Copy failed").count();
        assert_eq!(copy_failures, 2);
        assert_eq!(history.entries("").await.expect("entries")[0].id, "new");
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn extreme_stored_timestamp_still_searches() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "a", "text": "ancient", "createdAt": i64::MIN },
            { "id": "b", "text": "overflowing", "createdAt": -1e300 }
        ])));
        let results = f.service.search("").await.expect("search");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].data.id, "b");
        assert_eq!(results[0].age_label, "just now");
        assert!(results[1].age_label.ends_with("y ago"));
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "a", "text": "alpha", "createdAt": 2 },
            { "id": "b", "text": "beta", "createdAt": 1 }
        ])));
        let history = f.service.ensure_initialized().await.clone();
        let beta = history.entries("beta").await.expect("entries")[0].record();

        f.service.remove(&beta).await.expect("remove");
        f.service.remove(&beta).await.expect("remove twice");
        assert_eq!(titles(&f.service, "").await, vec!["alpha"]);

        f.service.clear().await.expect("clear");
        assert!(titles(&f.service, "").await.is_empty());
        history.flush().await.expect("flush");
        assert_eq!(f.storage.document(), Some(json!([])));
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn favorite_toggle_persists_and_requests_focus_once() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "a", "text": "alpha", "createdAt": 2 },
            { "id": "b", "text": "beta", "createdAt": 1 }
        ])));
        let history = f.service.ensure_initialized().await.clone();
        let beta = history.entries("beta").await.expect("entries")[0].record();

        f.service.favorite(&beta).await.expect("favorite");
        f.service.unfavorite(&beta).await.expect("unfavorite");
        f.service.favorite(&beta).await.expect("favorite");

        let favorites = f.service.search_favorites("").await.expect("favorites");
        assert_eq!(favorites.len(), 1);
        assert_eq!(titles(&f.service, "").await, vec!["alpha", "beta"]);

        history.flush().await.expect("flush");
        assert_eq!(f.storage.document().expect("document")[1]["isFavorite"], true);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(f.focus.calls(), 1);
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn persistence_failure_keeps_in_memory_change() {
        let f = fixture_with(MemoryStorage::with_document(json!([
            { "id": "a", "text": "alpha", "createdAt": 2 }
        ])));
        let history = f.service.ensure_initialized().await.clone();
        f.storage.set_fail_writes(true);

        f.service.clear().await.expect("clear");
        history.flush().await.expect("flush");

        assert!(titles(&f.service, "").await.is_empty());
        assert!(f
            .notifier
            .titles()
            .contains(&"Failed to clear history".to_string()));
        assert_eq!(f.storage.document().expect("document")[0]["id"], "a");
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn results_are_capped_after_filtering() {
        let records: Vec<serde_json::Value> = (0..120)
            .map(|i| {
                let text = if i % 2 == 0 { format!("even {i}") } else { format!("odd {i}") };
                json!({ "id": format!("id-{i}"), "text": text, "createdAt": 1_000 - i })
            })
            .collect();
        let f = fixture_with(MemoryStorage::with_document(json!(records)));

        let results = f.service.search("odd").await.expect("search");
        assert_eq!(results.len(), 50);
        assert!(results.iter().all(|result| result.title.starts_with("odd")));
        assert_eq!(results[0].title, "odd 1");
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn actions_after_shutdown_report_stopped() {
        let f = fixture();
        f.service.ensure_initialized().await;
        f.service.shutdown().await;
        let err = f.service.search("").await.expect_err("stopped");
        assert!(matches!(err, ClippyError::Stopped));
        f.service.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_before_start_is_a_noop() {
        let f = fixture();
        f.service.shutdown().await;
        assert!(!f.service.is_initialized());
        assert_eq!(f.storage.read_count(), 0);
    }

    #[tokio::test]
    async fn user_dir_service_uses_config_and_history_file() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "historyFile": "custom.json", "maxResults": 1 }"#,
        )
        .expect("config");
        std::fs::write(
            dir.path().join("custom.json"),
            r#"[{"id":"a","text":"one","createdAt":2},{"id":"b","text":"two","createdAt":1}]"#,
        )
        .expect("history");

        let clipboard = Arc::new(MemoryClipboard::new());
        let service = ClippyService::for_user_dir(clipboard, dir.path(), None, None);
        assert_eq!(service.config().max_results, 1);

        let results = service.search("").await.expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data.id, "a");
        service.shutdown().await;
    }
}
