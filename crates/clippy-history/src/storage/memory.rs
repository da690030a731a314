//! In-memory history storage for tests and hosts without a disk.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{ClippyError, ClippyResult};
use crate::storage::HistoryStorage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<Value>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            ..Self::default()
        }
    }

    /// Makes every following write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn document(&self) -> Option<Value> {
        self.document.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryStorage for MemoryStorage {
    async fn write(&self, data: &Value) -> ClippyResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClippyError::Persistence("storage unavailable".to_string()));
        }
        let mut guard = self
            .document
            .lock()
            .map_err(|_| ClippyError::Persistence("memory storage lock poisoned".to_string()))?;
        *guard = Some(data.clone());
        Ok(())
    }

    async fn read(&self) -> ClippyResult<Option<Value>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let guard = self
            .document
            .lock()
            .map_err(|_| ClippyError::CorruptStore("memory storage lock poisoned".to_string()))?;
        Ok(guard.clone())
    }
}
