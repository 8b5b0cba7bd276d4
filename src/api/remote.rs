//! Purpose: Provide the HTTP client for the document library API (JSON + multipart upload).
//! Exports: `DocumentClient`.
//! Role: Sole translation point from transport failures to display-ready `Error`s.
//! Invariants: One attempt per call; no retries, no backoff.
//! Invariants: Non-2xx bodies of the form `{"detail": ...}` surface the detail verbatim;
//!             anything else falls back to a fixed per-operation message.
//! Invariants: Uploads are `multipart/form-data`; all other bodies are JSON.

use super::client::{ApiResult, ClientConfig, DocumentApi};
use super::{Document, DocumentUpdate, Error, ErrorKind, NewDocument, SearchResult, UploadRequest};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

#[derive(Clone)]
pub struct DocumentClient {
    inner: Arc<DocumentClientInner>,
}

struct DocumentClientInner {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Operation {
    Search,
    ListDocuments,
    GetDocument,
    CreateDocument,
    UploadDocument,
    UpdateDocument,
    DeleteDocument,
}

impl Operation {
    fn fallback(self) -> &'static str {
        match self {
            Operation::Search => "Failed to fetch search results",
            Operation::ListDocuments => "Failed to fetch documents",
            Operation::GetDocument => "Failed to fetch document",
            Operation::CreateDocument => "Failed to create document",
            Operation::UploadDocument => "Failed to upload document",
            Operation::UpdateDocument => "Failed to update document",
            Operation::DeleteDocument => "Failed to delete document",
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    detail: Option<Value>,
}

impl DocumentClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to build http client")
                .with_source(err)
        })?;
        Ok(Self {
            inner: Arc::new(DocumentClientInner { base_url, http }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = method.as_str(), url = url.as_str(), "document api request");
        self.inner
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, operation: Operation, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|err| {
            let err = Error::new(ErrorKind::Network)
                .with_message(operation.fallback())
                .with_source(err);
            warn!(?operation, detail = %err.detail(), "document api transport failure");
            err
        })?;
        if response.status().is_success() {
            return Ok(response);
        }
        let err = parse_error_response(operation, response).await;
        warn!(
            ?operation,
            status = err.status().unwrap_or_default(),
            detail = %err.detail(),
            "document api error response"
        );
        Err(err)
    }

    async fn send_json<R>(&self, operation: Operation, request: RequestBuilder) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(operation, request).await?;
        read_json_response(operation, response).await
    }
}

impl DocumentApi for DocumentClient {
    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<SearchResult>> {
        let mut url = build_url(self.base_url(), &["search", ""])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        self.send_json(Operation::Search, self.request(Method::GET, url))
            .await
    }

    async fn list_documents(
        &self,
        skip: u32,
        limit: u32,
        tags: Option<&str>,
    ) -> ApiResult<Vec<Document>> {
        let mut url = build_url(self.base_url(), &["documents", ""])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("skip", &skip.to_string())
                .append_pair("limit", &limit.to_string());
            if let Some(tags) = tags.filter(|tags| !tags.is_empty()) {
                pairs.append_pair("tags", tags);
            }
        }
        self.send_json(Operation::ListDocuments, self.request(Method::GET, url))
            .await
    }

    async fn get_document(&self, id: &str) -> ApiResult<Document> {
        let url = build_url(self.base_url(), &["documents", id])?;
        self.send_json(Operation::GetDocument, self.request(Method::GET, url))
            .await
    }

    async fn create_document(&self, document: &NewDocument) -> ApiResult<Document> {
        let url = build_url(self.base_url(), &["documents", ""])?;
        let request = self.request(Method::POST, url).json(document);
        self.send_json(Operation::CreateDocument, request).await
    }

    async fn upload_document(&self, upload: &UploadRequest) -> ApiResult<Document> {
        let url = build_url(self.base_url(), &["documents", "upload"])?;
        let part = reqwest::multipart::Part::bytes(upload.file.bytes.clone())
            .file_name(upload.file.name.clone())
            .mime_str(&upload.file.mime_type)
            .map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid mime type: {}", upload.file.mime_type))
                    .with_source(err)
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("title", upload.title.trim().to_string())
            .text("authors", upload.authors.trim().to_string())
            .text("tags", upload.tags.trim().to_string());
        let request = self.request(Method::POST, url).multipart(form);
        self.send_json(Operation::UploadDocument, request).await
    }

    async fn update_document(&self, id: &str, update: &DocumentUpdate) -> ApiResult<Document> {
        let url = build_url(self.base_url(), &["documents", id])?;
        let request = self.request(Method::PUT, url).json(update);
        self.send_json(Operation::UpdateDocument, request).await
    }

    async fn delete_document(&self, id: &str) -> ApiResult<bool> {
        let url = build_url(self.base_url(), &["documents", id])?;
        self.send(Operation::DeleteDocument, self.request(Method::DELETE, url))
            .await?;
        Ok(true)
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid api base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("api base url must use http or https scheme")
        );
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage).with_message("api base url cannot be a base"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Appends `segments` under the base path. A trailing `""` segment yields a
/// trailing slash (`/documents/`), which the server routes expect.
fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("api base url cannot be a base")
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

async fn read_json_response<R>(operation: Operation, response: Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let body = response.bytes().await.map_err(|err| {
        Error::new(ErrorKind::Network)
            .with_message(operation.fallback())
            .with_source(err)
    })?;
    serde_json::from_slice(&body).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message(operation.fallback())
            .with_source(err)
    })
}

async fn parse_error_response(operation: Operation, response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let kind = error_kind_from_status(status);
    let message = detail_from_body(&body).unwrap_or_else(|| operation.fallback().to_string());
    Error::new(kind).with_message(message).with_status(status)
}

fn detail_from_body(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok()?;
    match envelope.detail? {
        Value::Null => None,
        Value::String(detail) if detail.trim().is_empty() => None,
        Value::String(detail) => Some(detail),
        other => Some(other.to_string()),
    }
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        404 => ErrorKind::NotFound,
        _ => ErrorKind::Api,
    }
}
