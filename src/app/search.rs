//! Purpose: Search input controller and the search-result view.
//! Exports: `SearchBar`, `ResultList`, `ResultRow`, `EMPTY_RESULTS_MESSAGE`.
//! Role: `SearchBar` gates submissions; `ResultList` renders whatever it is given.
//! Invariants: Blank input never produces a query.
//! Invariants: `ResultList` owns no network logic; rank is 1-based.

use crate::api::SearchResult;
use crate::core::format::{format_timestamp, relevance_percent, truncate_text};
use crate::core::validate::normalize_query;
use std::fmt::Write as _;

pub const EMPTY_RESULTS_MESSAGE: &str = "Enter a query to see results";
pub const DEFAULT_PREVIEW_CHARS: usize = 300;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchBar {
    input: String,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    /// Trimmed query to submit, or `None` when the field is blank.
    pub fn submit(&self) -> Option<String> {
        normalize_query(&self.input)
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    pub rank: usize,
    pub relevance: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub preview: String,
    pub uploaded: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultList {
    preview_chars: usize,
}

impl Default for ResultList {
    fn default() -> Self {
        Self {
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn rows(&self, results: &[SearchResult]) -> Vec<ResultRow> {
        results
            .iter()
            .enumerate()
            .map(|(idx, result)| ResultRow {
                rank: idx + 1,
                relevance: relevance_percent(result.score),
                title: result.title.clone(),
                authors: result.authors.clone(),
                tags: result.tags.clone(),
                preview: truncate_text(&result.text, self.preview_chars),
                uploaded: result.uploaded_at().and_then(format_timestamp),
            })
            .collect()
    }

    pub fn render(&self, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return EMPTY_RESULTS_MESSAGE.to_string();
        }
        let mut out = String::new();
        for row in self.rows(results) {
            let title = row.title.as_deref().unwrap_or("Untitled");
            let _ = writeln!(out, "#{} [{}] {title}", row.rank, row.relevance);
            if !row.authors.is_empty() {
                let _ = writeln!(out, "   Authors: {}", row.authors.join(", "));
            }
            if !row.tags.is_empty() {
                let _ = writeln!(out, "   Tags: {}", row.tags.join(", "));
            }
            let _ = writeln!(out, "   {}", row.preview);
            if let Some(uploaded) = &row.uploaded {
                let _ = writeln!(out, "   Uploaded: {uploaded}");
            }
        }
        out.trim_end().to_string()
    }
}
