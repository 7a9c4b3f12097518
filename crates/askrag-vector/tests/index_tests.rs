use std::path::Path;

use askrag_core::types::DocumentChunk;
use askrag_vector::UserVectorIndex;

fn chunk(doc_id: i64, idx: usize, content: &str, path: &str) -> DocumentChunk {
    DocumentChunk {
        id: format!("{doc_id}:{idx}"),
        doc_id,
        doc_path: path.to_string(),
        content: content.to_string(),
        chunk_index: idx,
        total_chunks: 0,
    }
}

async fn open_index(root: &Path) -> UserVectorIndex {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = askrag_embed::get_default_embedder().expect("embedder");
    UserVectorIndex::open(root, "user_1_docs", embedder)
        .await
        .expect("open index")
}

#[tokio::test]
async fn upsert_then_count_and_search() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await;

    let chunks = vec![
        chunk(7, 0, "solar panels feed the battery bank", "/docs/power.txt"),
        chunk(7, 1, "the well pump draws from the cistern", "/docs/water.txt"),
    ];
    assert_eq!(index.upsert(&chunks).await?, 2);
    assert_eq!(index.count().await?, 2);

    let hits = index.similarity_search("solar panels battery", 5, 10).await?;
    assert!(!hits.is_empty());
    assert_eq!(hits[0].doc_id, 7);
    // re-ranked similarity-descending
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    Ok(())
}

#[tokio::test]
async fn search_on_fresh_collection_is_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await;

    assert_eq!(index.count().await?, 0);
    let hits = index.similarity_search("anything at all", 5, 10).await?;
    assert!(hits.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_by_document_removes_only_matching_chunks() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = open_index(tmp.path()).await;

    index
        .upsert(&[
            chunk(1, 0, "alpha contents", "/docs/a.txt"),
            chunk(2, 0, "bravo contents", "/docs/b.txt"),
            chunk(2, 1, "more bravo contents", "/docs/b.txt"),
        ])
        .await?;
    assert_eq!(index.count().await?, 3);

    index.delete_by_document(2).await?;
    assert_eq!(index.count().await?, 1);

    // deleting an id nothing matches is a successful no-op
    index.delete_by_document(99).await?;
    assert_eq!(index.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn clear_is_idempotent_and_leaves_count_zero() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("user_1");
    let index = open_index(&root).await;

    index
        .upsert(&[chunk(1, 0, "soon to disappear", "/docs/gone.txt")])
        .await?;
    assert_eq!(index.count().await?, 1);

    index.clear().await?;
    assert!(!root.exists());
    assert_eq!(index.count().await?, 0);

    // clearing an already-cleared collection still succeeds
    index.clear().await?;
    assert_eq!(index.count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn operations_tolerate_a_concurrently_cleared_collection() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("user_1");
    let index = open_index(&root).await;
    index
        .upsert(&[chunk(1, 0, "ephemeral", "/docs/tmp.txt")])
        .await?;

    // another request clears the store out from under this handle
    let second = open_index(&root).await;
    second.clear().await?;

    assert_eq!(index.count().await?, 0);
    assert!(index.similarity_search("ephemeral", 5, 10).await?.is_empty());
    index.delete_by_document(1).await?;

    // and ingestion recreates the collection from scratch
    assert_eq!(
        index
            .upsert(&[chunk(3, 0, "fresh start", "/docs/new.txt")])
            .await?,
        1
    );
    assert_eq!(index.count().await?, 1);
    Ok(())
}
