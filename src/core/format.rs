//! Purpose: Text formatting helpers shared by the result and management views.
//! Exports: `truncate_text`, `relevance_percent`, `parse_timestamp`, `format_timestamp`, `plural`.
//! Role: Pure functions; no I/O and no locale lookups.
//! Invariants: Truncation counts chars, not bytes, so multibyte text never splits.
//! Invariants: Naive server timestamps are interpreted as UTC.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn relevance_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(raw, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// `Jan 5, 2024, 02:30 PM`
pub fn format_timestamp(at: OffsetDateTime) -> Option<String> {
    let display = format_description!(
        "[month repr:short] [day padding:none], [year], [hour repr:12]:[minute] [period]"
    );
    at.format(display).ok()
}

pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
