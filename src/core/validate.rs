//! Purpose: Client-side input rules applied before any request is issued.
//! Exports: `FileUpload`, `UploadRequest`, `normalize_query`, `split_list`, `join_list`,
//!          `validate_file`, `title_from_file_name`, `guess_mime`, limits and allow-list.
//! Role: Shared by the form controllers and the CLI so both reject the same inputs.
//! Invariants: Rejections are `ErrorKind::Validation` and never touch the network.
//! Invariants: The comma-list rule is split, trim, drop empties; order is preserved.

use crate::core::error::Error;
use std::path::Path;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_TEXT: &str = "text/plain";

pub const ALLOWED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_DOCX, MIME_DOC, MIME_TEXT];

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a PDF, DOCX, or TXT file";
pub const FILE_TOO_LARGE_MESSAGE: &str = "File size must be less than 10MB";

/// A file picked by the user. `bytes` holds the contents; `size` is the
/// on-disk length, which is all an unread file carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    size: u64,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
            size,
        }
    }

    /// Metadata only, for files too large to be worth reading. Fails
    /// `validate_file` whenever `size` exceeds `MAX_UPLOAD_BYTES`.
    pub fn unread(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Vec::new(),
            size,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Multipart payload for `POST /documents/upload`. Authors and tags stay as the
/// raw comma text; the server splits them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub title: String,
    pub authors: String,
    pub tags: String,
    pub file: FileUpload,
}

pub fn normalize_query(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_list(entries: &[String]) -> String {
    entries.join(", ")
}

pub fn validate_file(file: &FileUpload) -> Result<(), Error> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(Error::validation(UNSUPPORTED_TYPE_MESSAGE));
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(Error::validation(FILE_TOO_LARGE_MESSAGE));
    }
    Ok(())
}

/// Strips the final extension: `report.v2.pdf` -> `report.v2`. Dot-files and
/// names ending in a dot are returned unchanged.
pub fn title_from_file_name(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() && !name[idx + 1..].contains('/') => {
            name[..idx].to_string()
        }
        _ => name.to_string(),
    }
}

pub fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(MIME_PDF),
        "docx" => Some(MIME_DOCX),
        "doc" => Some(MIME_DOC),
        "txt" => Some(MIME_TEXT),
        _ => None,
    }
}
