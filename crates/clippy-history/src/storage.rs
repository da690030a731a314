pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ClippyResult;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Whole-document storage for the history file.
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Replaces the stored document.
    async fn write(&self, data: &Value) -> ClippyResult<()>;
    /// `Ok(None)` when nothing has been stored yet.
    async fn read(&self) -> ClippyResult<Option<Value>>;
}

pub type SharedStorage = Arc<dyn HistoryStorage>;
