use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::HISTORY_FILENAME;
use crate::error::{ClippyError, ClippyResult};
use crate::storage::HistoryStorage;

/// Stores the history document as one JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<dir>/clippy-history.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_filename(dir, HISTORY_FILENAME)
    }

    pub fn with_filename(dir: &Path, filename: &str) -> Self {
        Self::new(dir.join(filename))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn ensure_parent_dir(path: &Path) -> ClippyResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                ClippyError::Persistence(format!(
                    "failed to create history directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStorage for FileStorage {
    async fn write(&self, data: &Value) -> ClippyResult<()> {
        Self::ensure_parent_dir(&self.path).await?;
        let serialized = serde_json::to_vec(data).map_err(|error| {
            ClippyError::Persistence(format!("history serialize error: {error}"))
        })?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, serialized).await.map_err(|error| {
            ClippyError::Persistence(format!(
                "failed to write history file {}: {error}",
                temp.display()
            ))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|error| {
            ClippyError::Persistence(format!(
                "failed to replace history file {}: {error}",
                self.path.display()
            ))
        })?;
        Ok(())
    }

    async fn read(&self) -> ClippyResult<Option<Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(ClippyError::CorruptStore(format!(
                    "failed to read history file {}: {error}",
                    self.path.display()
                )))
            }
        };
        let value = serde_json::from_slice(&bytes).map_err(|error| {
            ClippyError::CorruptStore(format!(
                "history parse error in {}: {error}",
                self.path.display()
            ))
        })?;
        Ok(Some(value))
    }
}
