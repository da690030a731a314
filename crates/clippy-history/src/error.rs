/// Unified error type for the clipboard history crate.
#[derive(Debug, thiserror::Error)]
pub enum ClippyError {
    #[error("clipboard read failed: {0}")]
    ClipboardRead(String),

    #[error("clipboard write failed: {0}")]
    ClipboardWrite(String),

    #[error("failed to persist history: {0}")]
    Persistence(String),

    #[error("corrupt history file: {0}")]
    CorruptStore(String),

    /// The history runtime has shut down.
    #[error("clipboard history stopped")]
    Stopped,
}

/// Result type alias using [`ClippyError`].
pub type ClippyResult<T> = Result<T, ClippyError>;
