//! Per-user retrieval-augmented answering engine.
//!
//! One engine instance serves one user for one request or session. The
//! public operations are total: they log the underlying cause of any
//! failure and return a neutral value (a count, a bool, or a canned
//! answer), so request handlers never need error handling around them.
//! The fallible pipelines behind them (`ingest`, `answer`) stay public for
//! callers and tests that need the failure kind.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use askrag_core::config::RagConfig;
use askrag_core::error::{Error, Result};
use askrag_core::traits::{AnswerGenerator, Embedder};
use askrag_core::types::{DocumentChunk, QueryOutcome, RetrievedChunk, SourceRef};
use askrag_ingest::loader;
use askrag_ingest::splitter::RecursiveSplitter;
use askrag_llm::{ChatCompletionsGenerator, GeneratorConfig};
use askrag_vector::UserVectorIndex;

pub const NO_DOCUMENTS_ANSWER: &str = "No documents available for querying.";
pub const NO_RELEVANT_ANSWER: &str = "No relevant documents found.";
pub const QUERY_ERROR_ANSWER: &str = "An error occurred while processing your query.";

/// Collection name derived from the user id; never shared across users.
pub fn collection_name(user_id: i64) -> String {
    format!("user_{user_id}_docs")
}

/// Store directory derived from the user id; never shared across users.
pub fn user_store_path(vector_root: &Path, user_id: i64) -> PathBuf {
    vector_root.join(format!("user_{user_id}"))
}

pub struct PersonalRagEngine {
    user_id: i64,
    config: RagConfig,
    generator_config: GeneratorConfig,
    index: UserVectorIndex,
    generator_override: Option<Box<dyn AnswerGenerator>>,
}

impl PersonalRagEngine {
    /// Construct the engine for `user_id`, opening (or lazily creating)
    /// that user's collection.
    pub async fn new(
        user_id: i64,
        config: RagConfig,
        generator_config: GeneratorConfig,
    ) -> Result<Self> {
        let embedder = askrag_embed::get_default_embedder()?;
        Self::with_embedder(user_id, config, generator_config, embedder).await
    }

    /// Construction variant taking a caller-supplied embedder.
    pub async fn with_embedder(
        user_id: i64,
        config: RagConfig,
        generator_config: GeneratorConfig,
        embedder: Box<dyn Embedder>,
    ) -> Result<Self> {
        let root = user_store_path(&config.vector_root, user_id);
        let index = UserVectorIndex::open(&root, &collection_name(user_id), embedder).await?;
        Ok(Self {
            user_id,
            config,
            generator_config,
            index,
            generator_override: None,
        })
    }

    /// Replace the hosted generator, e.g. with a canned one in tests.
    pub fn with_generator(mut self, generator: Box<dyn AnswerGenerator>) -> Self {
        self.generator_override = Some(generator);
        self
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Ingest one uploaded file under `doc_id`. Returns the number of
    /// chunks stored; 0 on any failure, with the cause logged.
    pub async fn process_document(&self, path: &Path, doc_id: i64) -> usize {
        match self.ingest(path, doc_id).await {
            Ok(count) => {
                info!(
                    "processed {count} chunks from {} for user {}",
                    path.display(),
                    self.user_id
                );
                count
            }
            Err(e) => {
                error!(
                    "processing {} for user {} failed: {e}",
                    path.display(),
                    self.user_id
                );
                0
            }
        }
    }

    /// The fallible ingestion pipeline behind [`Self::process_document`].
    pub async fn ingest(&self, path: &Path, doc_id: i64) -> Result<usize> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let segments = loader::load(path)?;
        if segments.is_empty() {
            return Err(Error::EmptyExtraction(format!(
                "no text extracted from {}",
                path.display()
            )));
        }
        let splitter = RecursiveSplitter::new(self.config.chunk_size, self.config.chunk_overlap);
        let pieces = splitter.split_segments(&segments);
        if pieces.is_empty() {
            return Err(Error::EmptyExtraction(format!(
                "no chunks produced from {}",
                path.display()
            )));
        }
        let total = pieces.len();
        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| DocumentChunk {
                id: format!("{doc_id}:{i}"),
                doc_id,
                doc_path: piece.source_path,
                content: piece.content,
                chunk_index: i,
                total_chunks: total,
            })
            .collect();
        self.index.upsert(&chunks).await
    }

    /// Answer a question from the user's documents. Never fails: pipeline
    /// errors collapse into a generic answer with no sources.
    pub async fn query(&self, question: &str) -> QueryOutcome {
        match self.answer(question).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("query for user {} failed: {e}", self.user_id);
                QueryOutcome {
                    answer: QUERY_ERROR_ANSWER.to_string(),
                    sources: Vec::new(),
                }
            }
        }
    }

    /// The fallible query pipeline behind [`Self::query`].
    pub async fn answer(&self, question: &str) -> Result<QueryOutcome> {
        // An unreadable collection reads as "nothing to query", the same
        // as an empty one.
        let stored = match self.index.count().await {
            Ok(n) => n,
            Err(e) => {
                error!("collection unreadable for user {}: {e}", self.user_id);
                0
            }
        };
        if stored == 0 {
            return Ok(QueryOutcome {
                answer: NO_DOCUMENTS_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let hits = self
            .index
            .similarity_search(question, self.config.retriever_k, self.config.retriever_fetch_k)
            .await?;
        if hits.is_empty() {
            return Ok(QueryOutcome {
                answer: NO_RELEVANT_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let context = hits
            .iter()
            .map(|h| h.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = askrag_llm::prompt::build_answer_prompt(&context, question);
        let answer = match &self.generator_override {
            Some(generator) => generator.generate(&prompt).await?,
            None => {
                ChatCompletionsGenerator::new(self.generator_config.clone())
                    .generate(&prompt)
                    .await?
            }
        };

        Ok(QueryOutcome {
            answer,
            sources: dedup_sources(&hits),
        })
    }

    /// Remove one document's chunks. True on success (including when
    /// nothing matched), false with the cause logged otherwise.
    pub async fn delete_document(&self, doc_id: i64) -> bool {
        match self.index.delete_by_document(doc_id).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "deleting document {doc_id} for user {} failed: {e}",
                    self.user_id
                );
                false
            }
        }
    }

    /// Drop the user's entire collection and its storage directory.
    pub async fn clear_all(&self) -> bool {
        match self.index.clear().await {
            Ok(()) => {
                info!("cleared vector store for user {}", self.user_id);
                true
            }
            Err(e) => {
                error!("clearing vector store for user {} failed: {e}", self.user_id);
                false
            }
        }
    }

    /// Stored chunk count, 0 on any failure.
    pub async fn get_document_count(&self) -> usize {
        match self.index.count().await {
            Ok(n) => n,
            Err(e) => {
                error!("counting chunks for user {} failed: {e}", self.user_id);
                0
            }
        }
    }
}

/// First-seen-order deduplication of source filenames across the
/// retrieved chunks.
fn dedup_sources(hits: &[RetrievedChunk]) -> Vec<SourceRef> {
    let mut seen = std::collections::HashSet::new();
    let mut sources = Vec::new();
    for hit in hits {
        let filename = Path::new(&hit.doc_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();
        if seen.insert(filename.clone()) {
            sources.push(SourceRef::personal(filename));
        }
    }
    sources
}
