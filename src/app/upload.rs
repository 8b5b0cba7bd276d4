//! Purpose: Upload form controller: fields, file selection, and submission.
//! Exports: `DocumentUpload`, `FileSource`, `SUCCESS_DISPLAY`.
//! Role: Validates locally, issues one upload, and emits `AppEvent::Uploaded` upward.
//! Invariants: Browse and drop share one validation path.
//! Invariants: Rejected files never reach the network.
//! Invariants: `is_uploading` is false whenever `submit` returns.
//! Invariants: Failed submissions leave every field intact for retry.

use super::AppEvent;
use crate::api::{DocumentApi, Error, FileUpload, UploadRequest};
use crate::core::validate::{title_from_file_name, validate_file};
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::debug;

pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);
pub const SUCCESS_MESSAGE: &str = "Document uploaded successfully!";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileSource {
    Browse,
    Drop,
}

#[derive(Debug, Default)]
pub struct DocumentUpload {
    title: String,
    authors: String,
    tags: String,
    file: Option<FileUpload>,
    drag_active: bool,
    is_uploading: bool,
    error: Option<Error>,
    succeeded_at: Option<Instant>,
}

impl DocumentUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &str {
        &self.authors
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn file(&self) -> Option<&FileUpload> {
        self.file.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(Error::detail)
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.title = value.into();
    }

    pub fn set_authors(&mut self, value: impl Into<String>) {
        self.authors = value.into();
    }

    pub fn set_tags(&mut self, value: impl Into<String>) {
        self.tags = value.into();
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Returns whether the file was accepted. A rejection clears any earlier
    /// selection and records the reason.
    pub fn select_file(&mut self, file: FileUpload, source: FileSource) -> bool {
        if source == FileSource::Drop {
            self.drag_active = false;
        }
        if let Err(err) = validate_file(&file) {
            debug!(name = %file.name, mime = %file.mime_type, size = file.size(), "file rejected");
            self.file = None;
            self.error = Some(err);
            return false;
        }
        if self.title.is_empty() {
            self.title = title_from_file_name(&file.name);
        }
        self.file = Some(file);
        self.error = None;
        true
    }

    pub fn remove_file(&mut self) {
        self.file = None;
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_uploading
    }

    pub fn success_visible_at(&self, now: Instant) -> bool {
        self.succeeded_at
            .is_some_and(|at| now.saturating_duration_since(at) < SUCCESS_DISPLAY)
    }

    pub fn success_visible(&self) -> bool {
        self.success_visible_at(Instant::now())
    }

    pub async fn submit<A: DocumentApi>(&mut self, api: &A) -> Option<AppEvent> {
        if self.is_uploading {
            return None;
        }
        self.error = None;
        self.succeeded_at = None;

        let Some(file) = self.file.clone() else {
            self.error = Some(Error::validation("Please select a file to upload"));
            return None;
        };
        if self.title.trim().is_empty() {
            self.error = Some(Error::validation("Please enter a title"));
            return None;
        }

        let request = UploadRequest {
            title: self.title.trim().to_string(),
            authors: self.authors.trim().to_string(),
            tags: self.tags.trim().to_string(),
            file,
        };

        self.is_uploading = true;
        let outcome = api.upload_document(&request).await;
        self.is_uploading = false;

        match outcome {
            Ok(document) => {
                debug!(id = %document.id, "upload succeeded");
                self.title.clear();
                self.authors.clear();
                self.tags.clear();
                self.file = None;
                self.succeeded_at = Some(Instant::now());
                Some(AppEvent::Uploaded(document))
            }
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.file {
            Some(file) => {
                let _ = writeln!(
                    out,
                    "File: {} ({:.2} KB)",
                    file.name,
                    file.size() as f64 / 1024.0
                );
            }
            None => {
                let _ = writeln!(out, "File: none selected (PDF, DOCX, TXT; max 10MB)");
            }
        }
        let _ = writeln!(out, "Title*: {}", self.title);
        let _ = writeln!(out, "Authors: {}", self.authors);
        let _ = writeln!(out, "Tags: {}", self.tags);
        if let Some(message) = self.error_message() {
            let _ = writeln!(out, "Error: {message}");
        }
        if self.success_visible() {
            let _ = writeln!(out, "{SUCCESS_MESSAGE}");
        }
        let button = if self.is_uploading {
            "[Uploading...]"
        } else if self.can_submit() {
            "[Upload Document]"
        } else {
            "[Upload Document] (disabled)"
        };
        out.push_str(button);
        out
    }
}
