//! Purpose: Headless UI layer: form controllers, views, and the app shell.
//! Exports: `AppShell`, `SearchBar`, `ResultList`, `DocumentUpload`, `DocumentManagement`,
//!          `AppEvent`, `View`, `Prompt`.
//! Role: Per-component state structs; data flows down as arguments, events flow up
//!       as return values. No global store.
//! Invariants: Controllers never return validation failures as `Err`; they keep
//!             them in their own error state.

mod manage;
mod prompt;
mod search;
mod shell;
mod upload;

#[cfg(test)]
pub(crate) mod testing;

use crate::api::Document;
use std::fmt;
use std::str::FromStr;

pub use manage::{
    CARD_PREVIEW_CHARS, DocumentManagement, EMPTY_DOCUMENTS_MESSAGE, EditDraft, EditField,
    MANAGEMENT_PAGE_SIZE, render_document,
};
pub use prompt::{AssumeYes, Prompt, confirm_delete_message};
pub use search::{DEFAULT_PREVIEW_CHARS, EMPTY_RESULTS_MESSAGE, ResultList, ResultRow, SearchBar};
pub use shell::{AppShell, SearchState};
pub use upload::{DocumentUpload, FileSource, SUCCESS_DISPLAY, SUCCESS_MESSAGE};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum View {
    #[default]
    Search,
    Upload,
    Manage,
}

impl View {
    pub fn label(self) -> &'static str {
        match self {
            View::Search => "Search",
            View::Upload => "Upload",
            View::Manage => "Manage",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "search" => Ok(View::Search),
            "upload" => Ok(View::Upload),
            "manage" => Ok(View::Manage),
            other => Err(format!(
                "unknown view `{other}` (expected search, upload, or manage)"
            )),
        }
    }
}

/// Notifications raised by child controllers for the shell to dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Navigate(View),
    Uploaded(Document),
}
