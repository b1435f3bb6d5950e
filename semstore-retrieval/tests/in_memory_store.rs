use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use semstore_core::{
    Document, Embedding, EmbeddingError, ErrorKind, MetadataFilter, SearchOptions, StoreError,
    Value,
};
use semstore_retrieval::InMemoryVectorStore;

/// Embeds known texts to fixed vectors and fails on anything containing
/// "fail". Counts every call.
#[derive(Clone, Default)]
struct TableEmbedding {
    table: Arc<HashMap<String, Vec<f32>>>,
    calls: Arc<AtomicUsize>,
}

impl TableEmbedding {
    fn new(entries: &[(&str, [f32; 2])]) -> Self {
        let table = entries
            .iter()
            .map(|(text, vector)| (text.to_string(), vector.to_vec()))
            .collect();
        Self {
            table: Arc::new(table),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedding for TableEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("fail") {
            return Err(EmbeddingError::Provider("quota exceeded".to_string()));
        }
        if text.contains("short") {
            return Ok(vec![1.0]);
        }
        Ok(self.table.get(text).cloned().unwrap_or_else(|| vec![0.5, 0.5]))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        2
    }
}

fn embedder() -> TableEmbedding {
    TableEmbedding::new(&[
        ("east", [1.0, 0.0]),
        ("north", [0.0, 1.0]),
        ("north-east", [0.7071, 0.7071]),
        ("west", [-1.0, 0.0]),
    ])
}

fn store_with(embedder: TableEmbedding) -> InMemoryVectorStore<TableEmbedding> {
    InMemoryVectorStore::builder(embedder)
        .embedding_model("table-v1")
        .dimension(2)
        .build()
        .unwrap()
}

async fn seeded_store() -> InMemoryVectorStore<TableEmbedding> {
    let store = store_with(embedder());
    store
        .upsert_batch(vec![
            Document::new("a", "east").with_metadata("lang", "en"),
            Document::new("b", "north").with_metadata("lang", "de"),
            Document::new("c", "north-east").with_metadata("lang", "en"),
        ])
        .await
        .unwrap();
    store
}

fn assert_dimension_invariant(store: &InMemoryVectorStore<TableEmbedding>) {
    for doc in store.get_all() {
        assert_eq!(doc.embedding.as_ref().map(Vec::len), Some(store.dimension()));
    }
}

#[tokio::test]
async fn upsert_stores_embedding_and_returns_document() {
    let store = store_with(embedder());
    let stored = store
        .upsert(Document::new("a", "east").with_metadata("page", 3))
        .await
        .unwrap();

    assert_eq!(stored.embedding, Some(vec![1.0, 0.0]));
    assert_eq!(store.get("a"), Some(stored));
    assert_eq!(store.len(), 1);
    assert_dimension_invariant(&store);
}

#[tokio::test]
async fn upsert_replaces_existing_document_wholesale() {
    let store = store_with(embedder());
    store
        .upsert(Document::new("a", "east").with_metadata("v", 1))
        .await
        .unwrap();
    store.upsert(Document::new("a", "north")).await.unwrap();

    let doc = store.get("a").unwrap();
    assert_eq!(doc.content, "north");
    assert!(doc.metadata.is_empty());
    assert_eq!(doc.embedding, Some(vec![0.0, 1.0]));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn repeated_upsert_is_idempotent() {
    let store = store_with(embedder());
    let first = store.upsert(Document::new("a", "east")).await.unwrap();
    let second = store.upsert(Document::new("a", "east")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn upsert_wraps_provider_failure() {
    let store = store_with(embedder());
    let err = store
        .upsert(Document::new("x", "please fail"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmbeddingGeneration);
    let message = err.to_string();
    assert!(message.contains("document 'x'"));
    assert!(message.contains("quota exceeded"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn upsert_rejects_provider_vectors_of_wrong_length() {
    let store = store_with(embedder());
    let err = store
        .upsert(Document::new("x", "short vector"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::EmbeddingGeneration {
            source: EmbeddingError::InvalidResponse(_),
            ..
        }
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn upsert_rejects_blank_id_without_calling_provider() {
    let embedder = embedder();
    let store = store_with(embedder.clone());
    let err = store.upsert(Document::new("  ", "east")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidId);
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn upsert_batch_keeps_documents_before_the_failure() {
    let store = store_with(embedder());
    let err = store
        .upsert_batch(vec![
            Document::new("a", "east"),
            Document::new("b", "north"),
            Document::new("c", "fail here"),
            Document::new("d", "west"),
        ])
        .await
        .unwrap_err();

    match &err {
        StoreError::Batch { index, id, .. } => {
            assert_eq!(*index, 2);
            assert_eq!(id, "c");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.kind(), ErrorKind::EmbeddingGeneration);
    assert_eq!(store.len(), 2);
    assert!(store.get("a").is_some());
    assert!(store.get("d").is_none());
}

#[tokio::test]
async fn get_all_returns_detached_copy_in_insertion_order() {
    let store = seeded_store().await;
    let mut all = store.get_all();
    let ids: Vec<&str> = all.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);

    all[0].content = "mutated".to_string();
    all.clear();
    assert_eq!(store.get("a").unwrap().content, "east");
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn delete_reports_whether_document_existed() {
    let store = seeded_store().await;
    assert!(store.delete("b"));
    assert!(!store.delete("b"));
    assert!(!store.delete("missing"));
    assert_eq!(store.len(), 2);
    assert!(store.get("b").is_none());
}

#[tokio::test]
async fn clear_removes_everything() {
    let store = seeded_store().await;
    store.clear();
    assert!(store.is_empty());
    assert!(store.get_all().is_empty());
}

#[tokio::test]
async fn clones_share_the_collection() {
    let store = seeded_store().await;
    let other = store.clone();
    other.delete("a");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn search_by_vector_ranks_by_cosine_similarity() {
    let store = seeded_store().await;
    let results = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().top_k(3))
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.document.id.as_str()).collect();
    assert_eq!(ids, ["a", "c", "b"]);
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert!((results[1].score - 0.7071).abs() < 1e-3);
    assert!(results[2].score.abs() < 1e-6);
}

#[tokio::test]
async fn search_results_are_sorted_and_bounded_by_top_k() {
    let store = seeded_store().await;
    store.upsert(Document::new("d", "west")).await.unwrap();
    store.upsert(Document::new("e", "unknown text")).await.unwrap();

    for top_k in 1..=6 {
        let results = store
            .search_by_vector(
                &[0.3, 0.9],
                SearchOptions::new().top_k(top_k).threshold(-1.0),
            )
            .unwrap();
        assert!(results.len() <= top_k);
        assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }
}

#[tokio::test]
async fn default_top_k_is_five() {
    let store = store_with(embedder());
    let docs = (0..8)
        .map(|idx| Document::new(format!("doc-{idx}"), "east"))
        .collect();
    store.upsert_batch(docs).await.unwrap();

    let results = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 5);
}

#[tokio::test]
async fn equal_scores_keep_insertion_order() {
    let store = store_with(embedder());
    for id in ["z", "y", "x"] {
        store.upsert(Document::new(id, "east")).await.unwrap();
    }

    let results = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::default())
        .unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.document.id.as_str()).collect();
    assert_eq!(ids, ["z", "y", "x"]);
}

#[tokio::test]
async fn threshold_is_inclusive_and_respected() {
    let store = seeded_store().await;
    store.upsert(Document::new("d", "west")).await.unwrap();

    let results = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().top_k(10).threshold(0.5))
        .unwrap();
    assert!(results.iter().all(|r| r.score >= 0.5));
    assert_eq!(results.len(), 2);

    let inclusive = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().top_k(10).threshold(1.0))
        .unwrap();
    assert_eq!(inclusive.len(), 1);
    assert_eq!(inclusive[0].document.id, "a");
}

#[tokio::test]
async fn default_threshold_drops_negative_scores() {
    let store = seeded_store().await;
    store.upsert(Document::new("d", "west")).await.unwrap();

    let results = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().top_k(10))
        .unwrap();
    assert!(results.iter().all(|r| r.document.id != "d"));

    let everything = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().top_k(10).threshold(-1.0))
        .unwrap();
    assert_eq!(everything.len(), 4);
    assert_eq!(everything.last().unwrap().document.id, "d");
}

#[tokio::test]
async fn filter_excludes_documents_before_scoring() {
    let store = seeded_store().await;
    let seen = AtomicUsize::new(0);
    let english_only = |doc: &Document| {
        seen.fetch_add(1, Ordering::SeqCst);
        doc.metadata.get("lang") == Some(&Value::from("en"))
    };

    let results = store
        .search_by_vector(
            &[0.0, 1.0],
            SearchOptions::new().top_k(3).filter(&english_only),
        )
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.document.id.as_str()).collect();
    assert_eq!(ids, ["c", "a"]);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn metadata_filter_plugs_into_search() {
    let store = seeded_store().await;
    let filter = MetadataFilter::Eq("lang".to_string(), Value::from("de"));

    let results = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().filter(&filter))
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.id, "b");
}

#[tokio::test]
async fn search_by_vector_checks_dimension_before_scanning() {
    let store = seeded_store().await;
    let visited = AtomicUsize::new(0);
    let counting = |_: &Document| {
        visited.fetch_add(1, Ordering::SeqCst);
        true
    };

    let err = store
        .search_by_vector(&[1.0, 0.0, 0.0], SearchOptions::new().filter(&counting))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DimensionMismatch {
            expected: 2,
            got: 3
        }
    ));
    assert_eq!(visited.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_by_vector_checks_dimension_on_empty_store() {
    let store = store_with(embedder());
    let err = store
        .search_by_vector(&[1.0], SearchOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
}

#[tokio::test]
async fn search_on_empty_store_skips_provider() {
    let embedder = embedder();
    let store = store_with(embedder.clone());

    let results = store
        .search("anything", SearchOptions::default())
        .await
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn search_embeds_query_text() {
    let embedder = embedder();
    let store = store_with(embedder.clone());
    store
        .upsert_batch(vec![
            Document::new("a", "east"),
            Document::new("b", "north"),
        ])
        .await
        .unwrap();
    let before = embedder.calls();

    let results = store
        .search("north", SearchOptions::new().top_k(1))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.id, "b");
    assert_eq!(embedder.calls(), before + 1);
}

#[tokio::test]
async fn search_reports_query_embedding_failure() {
    let store = seeded_store().await;
    let err = store
        .search("this will fail", SearchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmbeddingGeneration);
    assert!(err.to_string().contains("search query"));
}

#[tokio::test]
async fn zero_top_k_is_rejected() {
    let store = seeded_store().await;
    let err = store
        .search_by_vector(&[1.0, 0.0], SearchOptions::new().top_k(0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOptions);
}

#[tokio::test]
async fn zero_query_vector_scores_everything_zero() {
    let store = seeded_store().await;
    let results = store
        .search_by_vector(&[0.0, 0.0], SearchOptions::new().top_k(10))
        .unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.score == 0.0));
}

#[tokio::test]
async fn export_import_round_trip_reproduces_store() {
    let store = seeded_store().await;
    let snapshot = store.export();
    let json = serde_json::to_string(&snapshot).unwrap();

    let fresh = store_with(embedder());
    let restored: Vec<Document> = serde_json::from_str(&json).unwrap();
    assert_eq!(fresh.import(restored).unwrap(), 3);

    assert_eq!(fresh.len(), store.len());
    for doc in store.get_all() {
        assert_eq!(fresh.get(&doc.id), Some(doc));
    }
    assert_eq!(fresh.export(), snapshot);
}

#[tokio::test]
async fn import_does_not_call_provider() {
    let embedder = embedder();
    let store = store_with(embedder.clone());
    store
        .import(vec![Document::new("a", "east").with_embedding(vec![1.0, 0.0])])
        .unwrap();
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn import_without_embedding_fails_and_leaves_size_unchanged() {
    let store = store_with(embedder());
    let docs: Vec<Document> = serde_json::from_str(r#"[{"id":"x","content":"c"}]"#).unwrap();

    let err = store.import(docs).unwrap_err();
    assert!(matches!(err, StoreError::MissingEmbedding { ref id } if id == "x"));
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn import_keeps_entries_before_the_failure() {
    let store = store_with(embedder());
    let err = store
        .import(vec![
            Document::new("a", "east").with_embedding(vec![1.0, 0.0]),
            Document::new("b", "north"),
            Document::new("c", "west").with_embedding(vec![-1.0, 0.0]),
        ])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingEmbedding);
    assert_eq!(store.len(), 1);
    assert!(store.get("a").is_some());
}

#[tokio::test]
async fn import_rejects_embeddings_of_wrong_length() {
    let store = store_with(embedder());
    let err = store
        .import(vec![Document::new("a", "east").with_embedding(vec![1.0, 0.0, 0.0])])
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::DimensionMismatch {
            expected: 2,
            got: 3
        }
    ));
    assert!(store.is_empty());
    assert_dimension_invariant(&store);
}

#[tokio::test]
async fn import_replaces_existing_ids() {
    let store = seeded_store().await;
    store
        .import(vec![Document::new("a", "imported").with_embedding(vec![0.0, 1.0])])
        .unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.get("a").unwrap().content, "imported");
    assert_eq!(store.get_all()[0].id, "a");
}

#[tokio::test]
async fn large_magnitude_embeddings_still_rank() {
    let store = store_with(embedder());
    store
        .import(vec![
            Document::new("big", "big").with_embedding(vec![1e20, 2e20]),
            Document::new("a", "east").with_embedding(vec![1.0, 0.0]),
        ])
        .unwrap();

    let results = store
        .search_by_vector(&[1e20, 2e20], SearchOptions::new().top_k(2))
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].document.id, "big");
    assert!((results[0].score - 1.0).abs() < 1e-5);
}
