//! Clipboard history entries and the rules for building them from raw text.

use serde::{Deserialize, Serialize};

/// A captured clipboard snapshot with its derived search and dedup keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    /// Captured text, already capped to the configured length.
    pub text: String,
    /// `text` with CRLF collapsed to LF.
    pub normalized: String,
    /// Lowercase `normalized`, only used for matching.
    pub lower: String,
    /// Trimmed `normalized`. Never empty.
    pub signature: String,
    pub created_at: i64,
    pub is_favorite: bool,
}

/// The `{id, text, createdAt, isFavorite}` shape written to disk and handed
/// to the host as the reference for later actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub id: String,
    pub text: String,
    pub created_at: i64,
    pub is_favorite: bool,
}

/// Values carried over when an entry is rebuilt instead of freshly captured.
#[derive(Debug, Clone, Default)]
pub struct EntryOverrides {
    pub id: Option<String>,
    pub created_at: Option<i64>,
    pub is_favorite: bool,
}

impl Entry {
    pub fn record(&self) -> EntryRecord {
        EntryRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            created_at: self.created_at,
            is_favorite: self.is_favorite,
        }
    }
}

pub fn new_entry_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

pub fn normalize_newlines(value: &str) -> String {
    value.replace("\r\n", "\n")
}

/// Cuts `value` to at most `max_chars` characters.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// The dedup key `value` would be stored under, or `None` when it would be
/// discarded.
pub fn signature_of(value: &str, max_chars: usize) -> Option<String> {
    let normalized = normalize_newlines(truncate_chars(value, max_chars));
    let signature = normalized.trim();
    if signature.is_empty() {
        None
    } else {
        Some(signature.to_string())
    }
}

/// Builds an entry from raw clipboard text. Returns `None` when the text has
/// nothing but whitespace after truncation and newline normalisation.
pub fn build_entry(
    value: &str,
    max_chars: usize,
    overrides: EntryOverrides,
    now: i64,
) -> Option<Entry> {
    let text = truncate_chars(value, max_chars);
    let normalized = normalize_newlines(text);
    let signature = normalized.trim().to_string();
    if signature.is_empty() {
        return None;
    }

    let id = overrides
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_entry_id);

    Some(Entry {
        id,
        text: text.to_string(),
        lower: normalized.to_lowercase(),
        normalized,
        signature,
        created_at: overrides.created_at.unwrap_or(now),
        is_favorite: overrides.is_favorite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_STORED_LENGTH;

    fn build(value: &str) -> Option<Entry> {
        build_entry(value, MAX_STORED_LENGTH, EntryOverrides::default(), 1_000)
    }

    #[test]
    fn derives_search_and_dedup_keys() {
        let entry = build("  Hello\r\nWorld  ").expect("entry");
        assert_eq!(entry.text, "  Hello\r\nWorld  ");
        assert_eq!(entry.normalized, "  Hello\nWorld  ");
        assert_eq!(entry.lower, "  hello\nworld  ");
        assert_eq!(entry.signature, "Hello\nWorld");
        assert_eq!(entry.created_at, 1_000);
        assert!(!entry.is_favorite);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn whitespace_only_is_discarded() {
        assert!(build("").is_none());
        assert!(build(" \r\n\t ").is_none());
    }

    #[test]
    fn long_text_is_truncated_not_rejected() {
        let value = "x".repeat(MAX_STORED_LENGTH + 5);
        let entry = build(&value).expect("entry");
        assert_eq!(entry.text.chars().count(), MAX_STORED_LENGTH);
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hé", 10), "hé");
    }

    #[test]
    fn signature_matches_truncated_form() {
        let mut value = "a".repeat(MAX_STORED_LENGTH - 1);
        value.push_str("   tail");
        let entry = build(&value).expect("entry");
        assert_eq!(Some(entry.signature.clone()), signature_of(&value, MAX_STORED_LENGTH));
        assert_eq!(entry.signature, "a".repeat(MAX_STORED_LENGTH - 1));
    }

    #[test]
    fn overrides_are_applied() {
        let entry = build_entry(
            "text",
            MAX_STORED_LENGTH,
            EntryOverrides {
                id: Some("clip-1".to_string()),
                created_at: Some(42),
                is_favorite: true,
            },
            1_000,
        )
        .expect("entry");
        assert_eq!(entry.id, "clip-1");
        assert_eq!(entry.created_at, 42);
        assert!(entry.is_favorite);
    }

    #[test]
    fn empty_override_id_gets_fresh_id() {
        let entry = build_entry(
            "text",
            MAX_STORED_LENGTH,
            EntryOverrides {
                id: Some(String::new()),
                ..EntryOverrides::default()
            },
            1_000,
        )
        .expect("entry");
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn record_serializes_camel_case() {
        let entry = build("hello").expect("entry");
        let value = serde_json::to_value(entry.record()).expect("serialize");
        assert_eq!(value["text"], "hello");
        assert_eq!(value["createdAt"], 1_000);
        assert_eq!(value["isFavorite"], false);
    }
}
