//! Domain types shared by the ingestion and query pipelines.

use serde::{Deserialize, Serialize};

/// A chunk of one source document, the unit of embedding and retrieval.
///
/// - `id`: unique within a user's collection (`"{doc_id}:{chunk_index}"`)
/// - `doc_id`: external document record this chunk belongs to
/// - `doc_path`: original path of the source file, kept for attribution
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub doc_id: i64,
    pub doc_path: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A chunk returned by similarity search. `score` is cosine similarity,
/// higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub id: String,
    pub doc_id: i64,
    pub doc_path: String,
    pub content: String,
    pub score: f32,
}

pub const PERSONAL_DOCUMENT: &str = "personal_document";

/// One attributed source of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SourceRef {
    pub fn personal(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: PERSONAL_DOCUMENT.to_string(),
        }
    }
}

/// The outcome of one query pipeline run. Not persisted by the engine;
/// callers that keep transcripts store `answer` alongside the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}
