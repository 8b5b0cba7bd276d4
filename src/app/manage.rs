//! Purpose: Document-management grid with delete and inline edit.
//! Exports: `DocumentManagement`, `EditDraft`, `EditField`, `render_document`,
//!          `MANAGEMENT_PAGE_SIZE`.
//! Role: Owns the loaded list; applies update/delete results locally.
//! Invariants: At most one edit draft is active.
//! Invariants: Successful update/delete patch the local list by id; no re-fetch.
//! Invariants: A refresh counter change (or a remount) triggers exactly one reload.

use super::Prompt;
use super::prompt::confirm_delete_message;
use crate::api::{Document, DocumentApi, DocumentUpdate};
use crate::core::format::{format_timestamp, plural, truncate_text};
use crate::core::validate::{join_list, split_list};
use std::fmt::Write as _;
use std::str::FromStr;
use tracing::debug;

pub const MANAGEMENT_PAGE_SIZE: u32 = 100;
pub const CARD_PREVIEW_CHARS: usize = 200;
pub const EMPTY_DOCUMENTS_MESSAGE: &str = "No documents found";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDraft {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub tags: String,
    pub content: String,
}

impl EditDraft {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            title: document.title.clone(),
            authors: join_list(&document.authors),
            tags: join_list(&document.tags),
            content: document.content.clone(),
        }
    }

    pub fn set(&mut self, field: EditField, value: impl Into<String>) {
        let value = value.into();
        match field {
            EditField::Title => self.title = value,
            EditField::Authors => self.authors = value,
            EditField::Tags => self.tags = value,
            EditField::Content => self.content = value,
        }
    }

    pub fn to_update(&self) -> DocumentUpdate {
        DocumentUpdate {
            title: Some(self.title.clone()),
            authors: Some(split_list(&self.authors)),
            tags: Some(split_list(&self.tags)),
            content: Some(self.content.clone()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditField {
    Title,
    Authors,
    Tags,
    Content,
}

impl FromStr for EditField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(EditField::Title),
            "authors" => Ok(EditField::Authors),
            "tags" => Ok(EditField::Tags),
            "content" => Ok(EditField::Content),
            other => Err(format!(
                "unknown field `{other}` (expected title, authors, tags, or content)"
            )),
        }
    }
}

#[derive(Debug)]
pub struct DocumentManagement {
    documents: Vec<Document>,
    is_loading: bool,
    error: Option<String>,
    editing: Option<EditDraft>,
    filter_tag: String,
    observed_refresh: Option<u64>,
    page_size: u32,
}

impl Default for DocumentManagement {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            is_loading: false,
            error: None,
            editing: None,
            filter_tag: String::new(),
            observed_refresh: None,
            page_size: MANAGEMENT_PAGE_SIZE,
        }
    }
}

impl DocumentManagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filter(&self) -> &str {
        &self.filter_tag
    }

    pub fn set_filter(&mut self, value: impl Into<String>) {
        self.filter_tag = value.into();
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.editing.as_mut()
    }

    /// Forget the last observed refresh value so the next `observe_refresh`
    /// reloads, as when the view is mounted again.
    pub fn remount(&mut self) {
        self.observed_refresh = None;
    }

    /// Reloads on first observation and whenever `counter` changes. Returns
    /// whether a load was issued.
    pub async fn observe_refresh<A: DocumentApi>(&mut self, counter: u64, api: &A) -> bool {
        if self.observed_refresh == Some(counter) {
            return false;
        }
        self.observed_refresh = Some(counter);
        self.load(api).await;
        true
    }

    pub async fn apply_filter<A: DocumentApi>(&mut self, api: &A) {
        self.load(api).await;
    }

    pub async fn refresh<A: DocumentApi>(&mut self, api: &A) {
        self.load(api).await;
    }

    async fn load<A: DocumentApi>(&mut self, api: &A) {
        self.is_loading = true;
        self.error = None;
        let filter = Some(self.filter_tag.as_str()).filter(|tags| !tags.is_empty());
        let outcome = api.list_documents(0, self.page_size, filter).await;
        self.is_loading = false;
        match outcome {
            Ok(documents) => {
                debug!(count = documents.len(), "documents loaded");
                self.documents = documents;
            }
            Err(err) => self.error = Some(err.detail()),
        }
    }

    /// Asks for confirmation, then deletes and drops the entry locally.
    /// Returns whether the document was removed.
    pub async fn delete<A, P>(&mut self, id: &str, api: &A, prompt: &mut P) -> bool
    where
        A: DocumentApi,
        P: Prompt + ?Sized,
    {
        let Some(title) = self
            .documents
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.title.clone())
        else {
            prompt.alert(&format!("Failed to delete: no loaded document with id {id}"));
            return false;
        };
        if !prompt.confirm(&confirm_delete_message(&title)) {
            return false;
        }
        match api.delete_document(id).await {
            Ok(_) => {
                self.documents.retain(|doc| doc.id != id);
                if self.editing.as_ref().is_some_and(|draft| draft.id == id) {
                    self.editing = None;
                }
                true
            }
            Err(err) => {
                prompt.alert(&format!("Failed to delete: {}", err.detail()));
                false
            }
        }
    }

    /// Enters edit mode for `id`, replacing any other draft. Returns false if
    /// the id is not in the loaded list.
    pub fn start_edit(&mut self, id: &str) -> bool {
        match self.documents.iter().find(|doc| doc.id == id) {
            Some(document) => {
                self.editing = Some(EditDraft::from_document(document));
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Sends the draft; on success swaps in the server's copy and leaves edit
    /// mode. On failure the draft stays open.
    pub async fn save_edit<A, P>(&mut self, api: &A, prompt: &mut P) -> bool
    where
        A: DocumentApi,
        P: Prompt + ?Sized,
    {
        let Some(draft) = self.editing.as_ref() else {
            return false;
        };
        let id = draft.id.clone();
        let update = draft.to_update();
        match api.update_document(&id, &update).await {
            Ok(updated) => {
                if let Some(slot) = self.documents.iter_mut().find(|doc| doc.id == id) {
                    *slot = updated;
                }
                self.editing = None;
                true
            }
            Err(err) => {
                prompt.alert(&format!("Failed to update: {}", err.detail()));
                false
            }
        }
    }

    pub fn count_label(&self) -> String {
        format!("Total: {}", plural(self.documents.len(), "document"))
    }

    pub fn render(&self) -> String {
        if self.is_loading {
            return "Loading documents...".to_string();
        }
        let mut out = String::new();
        if !self.filter_tag.is_empty() {
            let _ = writeln!(out, "Filter: {}", self.filter_tag);
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {error}");
        }
        if self.documents.is_empty() {
            let _ = writeln!(out, "{EMPTY_DOCUMENTS_MESSAGE}");
            let _ = writeln!(out, "Upload your first document to get started");
        }
        for document in &self.documents {
            match &self.editing {
                Some(draft) if draft.id == document.id => out.push_str(&render_draft(draft)),
                _ => out.push_str(&render_document(document)),
            }
            out.push('\n');
        }
        out.push_str(&self.count_label());
        out
    }
}

pub fn render_document(document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", document.title, document.id);
    if !document.authors.is_empty() {
        let _ = writeln!(out, "  Authors: {}", document.authors.join(", "));
    }
    if !document.tags.is_empty() {
        let _ = writeln!(out, "  Tags: {}", document.tags.join(", "));
    }
    let preview = truncate_text(&document.content, CARD_PREVIEW_CHARS);
    if !preview.is_empty() {
        let _ = writeln!(out, "  {preview}");
    }
    if let Some(filename) = &document.metadata.original_filename {
        let _ = writeln!(out, "  File: {filename}");
    }
    if let Some(date) = document.uploaded_at().and_then(format_timestamp) {
        let _ = writeln!(out, "  Uploaded: {date}");
    }
    out
}

fn render_draft(draft: &EditDraft) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Editing [{}]", draft.id);
    let _ = writeln!(out, "  title: {}", draft.title);
    let _ = writeln!(out, "  authors: {}", draft.authors);
    let _ = writeln!(out, "  tags: {}", draft.tags);
    let _ = writeln!(out, "  content: {}", truncate_text(&draft.content, CARD_PREVIEW_CHARS));
    let _ = writeln!(out, "  (save | cancel)");
    out
}
