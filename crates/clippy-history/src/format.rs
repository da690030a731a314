//! Display-agnostic result records for the host's list rows.

use serde::Serialize;

use crate::entry::{normalize_newlines, Entry, EntryRecord};

pub const EMPTY_TITLE: &str = "(empty)";
const ERROR_PREVIEW_LEN: usize = 60;

/// One search result, ready for the host to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub data: EntryRecord,
    pub title: String,
    pub size_label: String,
    pub age_label: String,
    pub is_favorite: bool,
}

pub fn build_result(entry: &Entry, now: i64) -> ResultRecord {
    ResultRecord {
        data: entry.record(),
        title: format_title(entry),
        size_label: format_length(entry.text.chars().count()),
        age_label: format_relative_time(entry.created_at, now),
        is_favorite: entry.is_favorite,
    }
}

pub fn format_title(entry: &Entry) -> String {
    let title = entry.normalized.trim();
    if title.is_empty() {
        EMPTY_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// One decimal place, trailing `.0` dropped.
fn format_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let text = format!("{rounded}");
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

pub fn format_length(length: usize) -> String {
    match length {
        1 => "1 char".to_string(),
        0..=999 => format!("{length} chars"),
        1_000..=999_999 => format!("{}k chars", format_number(length as f64 / 1_000.0)),
        _ => format!("{}M chars", format_number(length as f64 / 1_000_000.0)),
    }
}

pub fn format_relative_time(timestamp: i64, now: i64) -> String {
    let diff_ms = now.saturating_sub(timestamp);
    if diff_ms < 45_000 {
        return "just now".to_string();
    }

    let minutes = (diff_ms as f64 / 60_000.0).round();
    if minutes < 60.0 {
        return format!("{minutes}m ago");
    }

    let hours = (minutes / 60.0).round();
    if hours < 24.0 {
        return format!("{hours}h ago");
    }

    let days = (hours / 24.0).round();
    if days < 30.0 {
        return format!("{days}d ago");
    }

    let months = (days / 30.0).round();
    if months < 12.0 {
        return format!("{months}mo ago");
    }

    let years = (months / 12.0).round();
    format!("{years}y ago")
}

fn truncate_with_ellipsis(value: &str, length: usize) -> String {
    if value.chars().count() <= length {
        return value.to_string();
    }
    let kept: String = value.chars().take(length.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Single-line preview of clipboard text for error notifications.
pub fn summarize_for_error(value: &str) -> String {
    let single_line = normalize_newlines(value)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    truncate_with_ellipsis(&single_line, ERROR_PREVIEW_LEN)
}
