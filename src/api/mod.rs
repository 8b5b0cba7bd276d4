//! Purpose: Define the public Rust API boundary for the document library client.
//! Exports: Records, the `DocumentApi` seam, the HTTP `DocumentClient`, and errors.
//! Role: Single import path for the CLI, the controllers, and integration tests.
//! Invariants: Transport details stay inside `remote`; callers only see `Error`.

mod client;
mod remote;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::document::{
    Document, DocumentMetadata, DocumentUpdate, NewDocument, SearchResult,
};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::validate::{FileUpload, UploadRequest};
pub use client::{
    ApiResult, ClientConfig, DEFAULT_BASE_URL, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
    DocumentApi,
};
pub use remote::DocumentClient;
