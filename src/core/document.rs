//! Purpose: Wire and domain records exchanged with the document API.
//! Exports: `Document`, `DocumentMetadata`, `SearchResult`, `NewDocument`, `DocumentUpdate`.
//! Role: Serde models decoded from responses and encoded into request bodies.
//! Invariants: Document ids travel as `_id` on the wire; `id` is accepted on input.
//! Invariants: Null collections decode as empty so views never special-case them.
//! Invariants: `DocumentUpdate` omits unset fields (partial update).

use crate::core::format::parse_timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn uploaded_at(&self) -> Option<OffsetDateTime> {
        self.upload_date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One ranked hit. The snippet arrives as `text` or `content` depending on
/// the server build; both decode into `text`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSearchResult")]
pub struct SearchResult {
    pub text: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

impl SearchResult {
    pub fn uploaded_at(&self) -> Option<OffsetDateTime> {
        self.upload_date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Deserialize)]
struct RawSearchResult {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    authors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default)]
    upload_date: Option<String>,
}

impl From<RawSearchResult> for SearchResult {
    fn from(raw: RawSearchResult) -> Self {
        Self {
            text: raw.text.or(raw.content).unwrap_or_default(),
            score: raw.score,
            title: raw.title,
            authors: raw.authors,
            tags: raw.tags,
            upload_date: raw.upload_date,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.authors.is_none() && self.tags.is_none() && self.content.is_none()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
