//! Purpose: Transport-agnostic seam for the document API operations.
//! Exports: `DocumentApi`, `ClientConfig`, `ApiResult`, paging defaults.
//! Role: Controllers are generic over `DocumentApi`; `DocumentClient` is the HTTP impl.
//! Invariants: Each method issues at most one request and never retries.

use super::{Document, DocumentUpdate, Error, NewDocument, SearchResult, UploadRequest};
use std::future::Future;
use std::time::Duration;

pub type ApiResult<T> = Result<T, Error>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const DEFAULT_LIST_LIMIT: u32 = 50;

pub trait DocumentApi {
    fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = ApiResult<Vec<SearchResult>>> + Send;

    /// `tags` is forwarded verbatim as the `tags` query parameter.
    fn list_documents(
        &self,
        skip: u32,
        limit: u32,
        tags: Option<&str>,
    ) -> impl Future<Output = ApiResult<Vec<Document>>> + Send;

    fn get_document(&self, id: &str) -> impl Future<Output = ApiResult<Document>> + Send;

    fn create_document(
        &self,
        document: &NewDocument,
    ) -> impl Future<Output = ApiResult<Document>> + Send;

    fn upload_document(
        &self,
        request: &UploadRequest,
    ) -> impl Future<Output = ApiResult<Document>> + Send;

    fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> impl Future<Output = ApiResult<Document>> + Send;

    fn delete_document(&self, id: &str) -> impl Future<Output = ApiResult<bool>> + Send;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
