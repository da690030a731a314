//! Bounded, recency-sorted clipboard history with move-to-front dedup.

use crate::config::{MAX_HISTORY_ITEMS, MAX_STORED_LENGTH};
use crate::entry::{build_entry, Entry, EntryOverrides, EntryRecord};

/// What a capture did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Whitespace-only text, nothing stored.
    Discarded,
    /// Same signature as the last capture.
    Unchanged,
    /// A new entry was inserted at the front.
    Inserted(String),
    /// An existing entry with the same signature was moved to the front.
    Moved(String),
}

impl CaptureOutcome {
    pub fn is_mutation(&self) -> bool {
        matches!(self, CaptureOutcome::Inserted(_) | CaptureOutcome::Moved(_))
    }
}

#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<Entry>,
    last_signature: Option<String>,
    max_entries: usize,
    max_text_len: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY_ITEMS, MAX_STORED_LENGTH)
    }
}

impl HistoryStore {
    pub fn new(max_entries: usize, max_text_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            last_signature: None,
            max_entries,
            max_text_len,
        }
    }

    /// Seeds the store with previously persisted entries.
    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = entries;
        self.sort();
        self.entries.truncate(self.max_entries);
        self.sync_last_signature();
        self
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn last_signature(&self) -> Option<&str> {
        self.last_signature.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Records freshly read clipboard text.
    pub fn capture(&mut self, raw: &str, now: i64) -> CaptureOutcome {
        let Some(mut entry) = build_entry(raw, self.max_text_len, EntryOverrides::default(), now)
        else {
            return CaptureOutcome::Discarded;
        };

        if self.last_signature.as_deref() == Some(entry.signature.as_str()) {
            return CaptureOutcome::Unchanged;
        }

        let outcome = match self.take_by_signature(&entry.signature) {
            Some(duplicate) => {
                entry.id = duplicate.id;
                entry.is_favorite = duplicate.is_favorite;
                CaptureOutcome::Moved(entry.id.clone())
            }
            None => CaptureOutcome::Inserted(entry.id.clone()),
        };

        self.insert_front(entry);
        outcome
    }

    /// Moves `record` to the front with a fresh timestamp. Unknown ids are
    /// rebuilt from the record's text, reusing any entry that already holds
    /// the same signature. Returns `false` when nothing could be promoted.
    pub fn promote(&mut self, record: &EntryRecord, now: i64) -> bool {
        if let Some(index) = self.position(&record.id) {
            let mut entry = self.entries.remove(index);
            entry.created_at = now;
            self.insert_front(entry);
            return true;
        }

        let overrides = EntryOverrides {
            id: None,
            created_at: Some(now),
            is_favorite: record.is_favorite,
        };
        let Some(mut entry) = build_entry(&record.text, self.max_text_len, overrides, now) else {
            return false;
        };
        if let Some(duplicate) = self.take_by_signature(&entry.signature) {
            entry.id = duplicate.id;
            entry.is_favorite = duplicate.is_favorite;
        }
        self.insert_front(entry);
        true
    }

    /// Returns `true` when an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.entries.remove(index);
        self.sync_last_signature();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sync_last_signature();
    }

    /// Returns `true` when the entry exists. Ordering is untouched.
    pub fn set_favorite(&mut self, id: &str, value: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.is_favorite = value;
                true
            }
            None => false,
        }
    }

    /// Sorted, capped snapshot in the on-disk record shape.
    pub fn records(&self) -> Vec<EntryRecord> {
        self.entries
            .iter()
            .take(self.max_entries)
            .map(Entry::record)
            .collect()
    }

    fn insert_front(&mut self, entry: Entry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_entries);
        self.sort();
        self.sync_last_signature();
    }

    fn take_by_signature(&mut self, signature: &str) -> Option<Entry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.signature == signature)?;
        Some(self.entries.remove(index))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    // Stable, so equal timestamps keep insertion order.
    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    fn sync_last_signature(&mut self) {
        self.last_signature = self.entries.first().map(|entry| entry.signature.clone());
    }
}
