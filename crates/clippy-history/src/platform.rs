//! Host collaborators: clipboard access, error notifications and window focus.

use std::sync::{Arc, Mutex};

use crate::error::{ClippyError, ClippyResult};

pub trait Clipboard: Send + Sync {
    fn read_text(&self) -> ClippyResult<String>;
    fn write_text(&self, text: &str) -> ClippyResult<()>;
}

/// Sink for user-visible error toasts.
pub trait Notifier: Send + Sync {
    fn error(&self, title: &str, detail: &str);
}

/// Brings the host's main window to the front. Best-effort.
pub trait WindowFocus: Send + Sync {
    fn focus_main_window(&self) -> ClippyResult<()>;
}

pub type SharedClipboard = Arc<dyn Clipboard>;
pub type SharedNotifier = Arc<dyn Notifier>;
pub type SharedWindowFocus = Arc<dyn WindowFocus>;

/// Logs every reported error and forwards it to the notifier when one is set.
#[derive(Clone, Default)]
pub struct Notifications {
    sink: Option<SharedNotifier>,
}

impl Notifications {
    pub fn new(sink: Option<SharedNotifier>) -> Self {
        Self { sink }
    }

    pub fn error(&self, title: &str, detail: &str) {
        tracing::warn!("{title}: {detail}");
        if let Some(sink) = &self.sink {
            sink.error(title, detail);
        }
    }
}

/// Process-local clipboard, for tests and headless hosts.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    state: Mutex<MemoryClipboardState>,
}

#[derive(Debug, Default)]
struct MemoryClipboardState {
    text: String,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let clipboard = Self::default();
        clipboard.set_text(text);
        clipboard
    }

    /// Simulates another application copying `text`.
    pub fn set_text(&self, text: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.text = text.to_string();
        }
    }

    pub fn text(&self) -> String {
        self.state
            .lock()
            .map(|state| state.text.clone())
            .unwrap_or_default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_reads = fail;
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_writes = fail;
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&self) -> ClippyResult<String> {
        let state = self
            .state
            .lock()
            .map_err(|_| ClippyError::ClipboardRead("clipboard lock poisoned".to_string()))?;
        if state.fail_reads {
            return Err(ClippyError::ClipboardRead("pasteboard unavailable".to_string()));
        }
        Ok(state.text.clone())
    }

    fn write_text(&self, text: &str) -> ClippyResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ClippyError::ClipboardWrite("clipboard lock poisoned".to_string()))?;
        if state.fail_writes {
            return Err(ClippyError::ClipboardWrite("pasteboard unavailable".to_string()));
        }
        state.text = text.to_string();
        Ok(())
    }
}
