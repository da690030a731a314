//! Clipboard history for a launcher host.
//!
//! The crate provides:
//! - A polling capture loop with move-to-front dedup
//! - Bounded, recency-sorted history with favorites
//! - Multi-term search and display-ready result rows
//! - Atomic JSON persistence behind a storage trait

pub mod error;
pub mod config;
pub mod utils;

pub mod entry;
pub mod store;
pub mod query;
pub mod format;

pub mod platform;
pub mod storage;
pub mod persistence;
pub mod focus;
pub mod history;
pub mod watcher;

pub mod commands;
pub mod service;

pub use crate::commands::{favorites_command, history_command, CommandDescriptor, CommandKind, HistoryAction};
pub use crate::config::{load_config, HistoryConfig};
pub use crate::entry::EntryRecord;
pub use crate::error::{ClippyError, ClippyResult};
pub use crate::format::ResultRecord;
pub use crate::history::HistoryHandle;
pub use crate::platform::{Clipboard, MemoryClipboard, Notifier, WindowFocus};
pub use crate::service::{ClippyDeps, ClippyService};
pub use crate::storage::{FileStorage, HistoryStorage, MemoryStorage};
