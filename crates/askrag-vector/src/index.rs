//! Per-user persistent vector index.
//!
//! One LanceDB directory and one named table per user. Every operation
//! re-establishes its connection before acting, so a collection that was
//! concurrently cleared (or not created yet) is observed instead of a
//! stale handle being trusted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{
    FixedSizeListArray, Float32Array, Int32Array, Int64Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use tracing::{debug, info, warn};

use askrag_core::error::{Error, Result};
use askrag_core::traits::Embedder;
use askrag_core::types::{DocumentChunk, RetrievedChunk};

use crate::schema::{build_chunk_schema, EMBEDDING_DIM};
use crate::table::{ensure_table, open_db, table_exists};

pub struct UserVectorIndex {
    root: PathBuf,
    table_name: String,
    embedder: Box<dyn Embedder>,
}

impl UserVectorIndex {
    /// Open the collection at `root` under `table_name`, creating it when
    /// absent. An existing table that fails to open is dropped and
    /// recreated fresh; that open failure is logged, never surfaced.
    pub async fn open(root: &Path, table_name: &str, embedder: Box<dyn Embedder>) -> Result<Self> {
        let index = Self {
            root: root.to_path_buf(),
            table_name: table_name.to_string(),
            embedder,
        };
        let conn = index.connect().await?;
        if table_exists(&conn, &index.table_name).await? {
            if let Err(e) = conn.open_table(&index.table_name).execute().await {
                warn!("opening collection {} failed, recreating: {e}", index.table_name);
                let _ = conn.drop_table(&index.table_name, &[]).await;
                ensure_table(&conn, &index.table_name, build_chunk_schema()).await?;
            }
        } else {
            ensure_table(&conn, &index.table_name, build_chunk_schema()).await?;
        }
        Ok(index)
    }

    async fn connect(&self) -> Result<Connection> {
        std::fs::create_dir_all(&self.root).map_err(Error::index)?;
        open_db(self.root.to_string_lossy().as_ref()).await
    }

    /// Embed and store `chunks`, creating the table from this batch when it
    /// does not exist and appending otherwise. Returns the stored count.
    pub async fn upsert(&self, chunks: &[DocumentChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        for e in &embeddings {
            if e.len() != EMBEDDING_DIM as usize {
                return Err(Error::Generation(format!(
                    "embedding dim {} does not match index dim {}",
                    e.len(),
                    EMBEDDING_DIM
                )));
            }
        }
        let batch = chunks_to_record_batch(chunks, &embeddings)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));

        let conn = self.connect().await?;
        if table_exists(&conn, &self.table_name).await? {
            let table = conn
                .open_table(&self.table_name)
                .execute()
                .await
                .map_err(Error::index)?;
            table.add(reader).execute().await.map_err(Error::index)?;
        } else {
            conn.create_table(&self.table_name, reader)
                .execute()
                .await
                .map_err(Error::index)?;
        }
        debug!("stored {} chunks in {}", chunks.len(), self.table_name);
        Ok(chunks.len())
    }

    /// Nearest-neighbor search: over-fetch `fetch_k` candidates, re-rank by
    /// similarity score descending, truncate to `k`. An absent or empty
    /// collection yields an empty result, not an error.
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let conn = self.connect().await?;
        if !table_exists(&conn, &self.table_name).await? {
            return Ok(Vec::new());
        }
        let mut vectors = self.embedder.embed_batch(&[query.to_string()])?;
        if vectors.is_empty() {
            return Err(Error::Generation("embedder returned no query vector".to_string()));
        }
        let query_vec = vectors.remove(0);

        let table = conn
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(Error::index)?;
        let mut stream = table
            .vector_search(query_vec)
            .map_err(Error::index)?
            .distance_type(DistanceType::Cosine)
            .limit(fetch_k.max(k))
            .execute()
            .await
            .map_err(Error::index)?;

        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::index)? {
            for row in 0..batch.num_rows() {
                hits.push(read_hit(&batch, row)?);
            }
        }
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    /// Delete exactly the chunks stamped with `doc_id`. A missing
    /// collection, or an id nothing matches, is a successful no-op.
    pub async fn delete_by_document(&self, doc_id: i64) -> Result<()> {
        let conn = self.connect().await?;
        if !table_exists(&conn, &self.table_name).await? {
            return Ok(());
        }
        let table = conn
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(Error::index)?;
        table
            .delete(&format!("doc_id = {doc_id}"))
            .await
            .map_err(Error::index)?;
        info!("deleted chunks of document {doc_id} from {}", self.table_name);
        Ok(())
    }

    /// Drop the table and remove the user's store directory. Idempotent;
    /// a failed table drop still lets the directory removal proceed.
    pub async fn clear(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        match self.connect().await {
            Ok(conn) => {
                if let Err(e) = conn.drop_table(&self.table_name, &[]).await {
                    warn!("dropping collection {} failed: {e}", self.table_name);
                }
            }
            Err(e) => warn!("connecting for clear failed: {e}"),
        }
        std::fs::remove_dir_all(&self.root).map_err(Error::index)?;
        info!("removed vector store at {}", self.root.display());
        Ok(())
    }

    /// Stored chunk count; 0 for an absent collection.
    pub async fn count(&self) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }
        let conn = self.connect().await?;
        if !table_exists(&conn, &self.table_name).await? {
            return Ok(0);
        }
        let table = conn
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(Error::index)?;
        table.count_rows(None).await.map_err(Error::index)
    }
}

fn chunks_to_record_batch(chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
    let schema = build_chunk_schema();
    let mut ids = Vec::new();
    let mut doc_ids = Vec::new();
    let mut doc_paths = Vec::new();
    let mut contents = Vec::new();
    let mut chunk_indices = Vec::new();
    let mut total_chunks = Vec::new();
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
        ids.push(chunk.id.clone());
        doc_ids.push(chunk.doc_id);
        doc_paths.push(chunk.doc_path.clone());
        contents.push(chunk.content.clone());
        chunk_indices.push(chunk.chunk_index as i32);
        total_chunks.push(chunk.total_chunks as i32);
        vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
    }
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(Int64Array::from(doc_ids)),
            Arc::new(StringArray::from(doc_paths)),
            Arc::new(StringArray::from(contents)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(Int32Array::from(total_chunks)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), EMBEDDING_DIM)),
        ],
    )
    .map_err(Error::index)
}

fn read_hit(batch: &RecordBatch, row: usize) -> Result<RetrievedChunk> {
    let id = string_value(batch, "id", row)?;
    let doc_path = string_value(batch, "doc_path", row)?;
    let content = string_value(batch, "content", row)?;
    let doc_id = batch
        .column_by_name("doc_id")
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .map(|a| a.value(row))
        .ok_or_else(|| Error::IndexUnavailable("doc_id column missing".to_string()))?;
    // LanceDB reports cosine distance; flip it into a similarity score.
    let score = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .map(|a| 1.0 - a.value(row))
        .unwrap_or(0.5);
    Ok(RetrievedChunk { id, doc_id, doc_path, content, score })
}

fn string_value(batch: &RecordBatch, column: &str, row: usize) -> Result<String> {
    batch
        .column_by_name(column)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .map(|a| a.value(row).to_string())
        .ok_or_else(|| Error::IndexUnavailable(format!("{column} column missing")))
}
