//! In-memory `DocumentApi` used by the controller tests. Records every call so
//! tests can assert on request counts and payloads.

use crate::api::{
    ApiResult, Document, DocumentApi, DocumentMetadata, DocumentUpdate, Error, ErrorKind,
    NewDocument, SearchResult, UploadRequest,
};
use crate::core::validate::split_list;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Search { query: String, limit: u32 },
    List { skip: u32, limit: u32, tags: Option<String> },
    Get(String),
    Create(NewDocument),
    Upload(UploadRequest),
    Update(String, DocumentUpdate),
    Delete(String),
}

#[derive(Default)]
struct FakeState {
    documents: Vec<Document>,
    results: Vec<SearchResult>,
    calls: Vec<Call>,
    failure: Option<(ErrorKind, String)>,
    next_id: u64,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub(crate) fn with_documents(documents: Vec<Document>) -> Self {
        let api = Self::default();
        api.state.lock().expect("fake state").documents = documents;
        api
    }

    pub(crate) fn with_results(results: Vec<SearchResult>) -> Self {
        let api = Self::default();
        api.state.lock().expect("fake state").results = results;
        api
    }

    pub(crate) fn fail_with(&self, kind: ErrorKind, message: &str) {
        self.state.lock().expect("fake state").failure = Some((kind, message.to_string()));
    }

    pub(crate) fn succeed(&self) {
        self.state.lock().expect("fake state").failure = None;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("fake state").calls.clone()
    }

    fn record(&self, call: Call) -> ApiResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().expect("fake state");
        state.calls.push(call);
        if let Some((kind, message)) = &state.failure {
            return Err(Error::new(*kind).with_message(message.clone()));
        }
        Ok(state)
    }
}

pub(crate) fn document(id: &str, title: &str) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        tags: vec!["math".to_string()],
        content: format!("Body of {title}"),
        upload_date: Some("2024-01-05T14:30:00".to_string()),
        metadata: DocumentMetadata::default(),
    }
}

pub(crate) fn result(text: &str, score: f64) -> SearchResult {
    SearchResult {
        text: text.to_string(),
        score,
        title: None,
        authors: Vec::new(),
        tags: Vec::new(),
        upload_date: None,
    }
}

fn not_found() -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("Document not found")
        .with_status(404)
}

impl DocumentApi for FakeApi {
    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<SearchResult>> {
        let state = self.record(Call::Search {
            query: query.to_string(),
            limit,
        })?;
        Ok(state.results.clone())
    }

    async fn list_documents(
        &self,
        skip: u32,
        limit: u32,
        tags: Option<&str>,
    ) -> ApiResult<Vec<Document>> {
        let state = self.record(Call::List {
            skip,
            limit,
            tags: tags.map(str::to_string),
        })?;
        let wanted = tags.map(split_list).unwrap_or_default();
        Ok(state
            .documents
            .iter()
            .filter(|doc| wanted.is_empty() || doc.tags.iter().any(|tag| wanted.contains(tag)))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_document(&self, id: &str) -> ApiResult<Document> {
        let state = self.record(Call::Get(id.to_string()))?;
        state
            .documents
            .iter()
            .find(|doc| doc.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_document(&self, document: &NewDocument) -> ApiResult<Document> {
        let mut state = self.record(Call::Create(document.clone()))?;
        state.next_id += 1;
        let created = Document {
            id: format!("created-{}", state.next_id),
            title: document.title.clone(),
            authors: document.authors.clone(),
            tags: document.tags.clone(),
            content: document.content.clone(),
            upload_date: Some("2024-02-01T08:00:00".to_string()),
            metadata: DocumentMetadata::default(),
        };
        state.documents.push(created.clone());
        Ok(created)
    }

    async fn upload_document(&self, request: &UploadRequest) -> ApiResult<Document> {
        let mut state = self.record(Call::Upload(request.clone()))?;
        state.next_id += 1;
        let created = Document {
            id: format!("upload-{}", state.next_id),
            title: request.title.trim().to_string(),
            authors: split_list(&request.authors),
            tags: split_list(&request.tags),
            content: String::from_utf8_lossy(&request.file.bytes).into_owned(),
            upload_date: Some("2024-02-01T08:00:00".to_string()),
            metadata: DocumentMetadata {
                original_filename: Some(request.file.name.clone()),
                file_size: Some(request.file.size()),
                ..DocumentMetadata::default()
            },
        };
        state.documents.insert(0, created.clone());
        Ok(created)
    }

    async fn update_document(&self, id: &str, update: &DocumentUpdate) -> ApiResult<Document> {
        let mut state = self.record(Call::Update(id.to_string(), update.clone()))?;
        let doc = state
            .documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(not_found)?;
        if let Some(title) = &update.title {
            doc.title = title.clone();
        }
        if let Some(authors) = &update.authors {
            doc.authors = authors.clone();
        }
        if let Some(tags) = &update.tags {
            doc.tags = tags.clone();
        }
        if let Some(content) = &update.content {
            doc.content = content.clone();
        }
        Ok(doc.clone())
    }

    async fn delete_document(&self, id: &str) -> ApiResult<bool> {
        let mut state = self.record(Call::Delete(id.to_string()))?;
        let before = state.documents.len();
        state.documents.retain(|doc| doc.id != id);
        if state.documents.len() == before {
            return Err(not_found());
        }
        Ok(true)
    }
}

/// Records prompts; confirms according to `answer`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompt {
    pub(crate) answer: bool,
    pub(crate) confirmations: Vec<String>,
    pub(crate) alerts: Vec<String>,
}

impl ScriptedPrompt {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }
}

impl super::Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.answer
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
