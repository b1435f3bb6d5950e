use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use semstore_core::{
    cosine_similarity, Document, Embedding, EmbeddingError, SearchOptions, SearchResult,
    StoreError,
};

use crate::{StoreConfig, VectorStoreBuilder};

const COMPACT_MIN_SLOTS: usize = 64;

/// Slot storage keeping first-insertion order. Deleted ids leave a tombstone
/// until enough of them pile up to be worth compacting.
#[derive(Default)]
pub(crate) struct StoreInner {
    docs: Vec<Option<Document>>,
    id_map: HashMap<String, usize>,
}

impl StoreInner {
    fn insert(&mut self, doc: Document) -> bool {
        if let Some(&index) = self.id_map.get(&doc.id) {
            self.docs[index] = Some(doc);
            true
        } else {
            let index = self.docs.len();
            self.id_map.insert(doc.id.clone(), index);
            self.docs.push(Some(doc));
            false
        }
    }

    fn get(&self, id: &str) -> Option<&Document> {
        self.id_map
            .get(id)
            .and_then(|&index| self.docs[index].as_ref())
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.id_map.remove(id) else {
            return false;
        };
        self.docs[index] = None;
        if self.docs.len() >= COMPACT_MIN_SLOTS && self.id_map.len() * 2 < self.docs.len() {
            self.compact();
        }
        true
    }

    fn compact(&mut self) {
        self.docs.retain(Option::is_some);
        for (index, doc) in self.docs.iter().enumerate() {
            if let Some(doc) = doc {
                self.id_map.insert(doc.id.clone(), index);
            }
        }
    }

    fn clear(&mut self) {
        self.docs.clear();
        self.id_map.clear();
    }

    fn len(&self) -> usize {
        self.id_map.len()
    }

    fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter().flatten()
    }
}

/// Memory-only document store ranking by cosine similarity.
///
/// Clones share the same collection. Only `upsert`, `upsert_batch` and
/// `search` suspend, and only while waiting on the embedding provider; the
/// collection lock is taken after the provider has answered and is never
/// held across an await.
///
/// Multi-document writes (`upsert_batch`, `import`) are best-effort and
/// sequential: on the first failing input they stop, and everything before
/// it stays committed.
#[derive(Clone)]
pub struct InMemoryVectorStore<E> {
    pub(crate) embedder: E,
    pub(crate) config: StoreConfig,
    pub(crate) inner: Arc<RwLock<StoreInner>>,
}

impl<E> InMemoryVectorStore<E>
where
    E: Embedding,
{
    pub fn builder(embedder: E) -> VectorStoreBuilder<E> {
        VectorStoreBuilder::new(embedder)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension()
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Embeds `doc.content` and stores the result under `doc.id`, replacing
    /// any previous document with that id. Any embedding already on `doc`
    /// is discarded.
    pub async fn upsert(&self, doc: Document) -> Result<Document, StoreError> {
        if doc.id.trim().is_empty() {
            return Err(StoreError::InvalidId(doc.id));
        }

        let subject = format!("document '{}'", doc.id);
        let embedding = self
            .embedder
            .embed(&doc.content)
            .await
            .map_err(|err| StoreError::embedding(subject.as_str(), err))?;

        if embedding.len() != self.dimension() {
            return Err(StoreError::embedding(
                subject,
                EmbeddingError::InvalidResponse(format!(
                    "expected embedding dimension {}, got {}",
                    self.dimension(),
                    embedding.len()
                )),
            ));
        }

        let document = Document {
            embedding: Some(embedding),
            ..doc
        };
        let replaced = self.inner.write().insert(document.clone());
        tracing::debug!(id = %document.id, replaced, "upserted document");
        Ok(document)
    }

    /// Upserts `docs` one at a time in order. Stops at the first failure,
    /// which is reported as [`StoreError::Batch`] naming the failing input;
    /// documents before it remain stored.
    pub async fn upsert_batch(&self, docs: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        let mut stored = Vec::with_capacity(docs.len());
        for (index, doc) in docs.into_iter().enumerate() {
            let id = doc.id.clone();
            match self.upsert(doc).await {
                Ok(doc) => stored.push(doc),
                Err(source) => {
                    tracing::warn!(
                        index,
                        id = %id,
                        committed = stored.len(),
                        error = %source,
                        "batch upsert aborted"
                    );
                    return Err(StoreError::Batch {
                        index,
                        id,
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(stored)
    }

    /// Embeds `query` and ranks the collection against it. An empty store
    /// answers immediately without calling the provider.
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions<'_>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        options.validate()?;
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|err| StoreError::embedding("search query", err))?;
        self.search_by_vector(&query_embedding, options)
    }
}

impl<E> InMemoryVectorStore<E> {
    /// Ranks the collection against a precomputed query vector.
    ///
    /// Results are sorted by descending score; equal scores keep insertion
    /// order. The query length is checked before anything is scanned.
    pub fn search_by_vector(
        &self,
        query_embedding: &[f32],
        options: SearchOptions<'_>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let expected = self.config.dimension();
        if query_embedding.len() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                got: query_embedding.len(),
            });
        }
        options.validate()?;

        let inner = self.inner.read();
        let span = tracing::info_span!(
            "semstore_search",
            top_k = options.top_k,
            threshold = options.threshold,
            candidates = inner.len(),
        );
        let _guard = span.enter();

        let mut scored: Vec<(&Document, f32)> = Vec::new();
        for doc in inner.iter() {
            if !options.admits(doc) {
                continue;
            }
            let Some(embedding) = doc.embedding.as_deref() else {
                tracing::warn!(id = %doc.id, "skipping document without embedding");
                continue;
            };
            let score = match cosine_similarity(query_embedding, embedding) {
                Ok(score) => score,
                Err(err) => {
                    tracing::warn!(id = %doc.id, error = %err, "skipping document with malformed embedding");
                    continue;
                }
            };
            if score.is_nan() || score < options.threshold {
                continue;
            }
            scored.push((doc, score));
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(options.top_k);
        tracing::debug!(results = scored.len(), "search finished");

        Ok(scored
            .into_iter()
            .map(|(doc, score)| SearchResult {
                document: doc.clone(),
                score,
            })
            .collect())
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.inner.read().get(id).cloned()
    }

    /// Owned copy of every document in insertion order.
    pub fn get_all(&self) -> Vec<Document> {
        self.inner.read().iter().cloned().collect()
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.inner.write().remove(id);
        tracing::debug!(id, removed, "delete");
        removed
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full snapshot including embeddings; the input format of [`Self::import`].
    pub fn export(&self) -> Vec<Document> {
        self.get_all()
    }

    /// Loads previously exported documents without calling the provider.
    ///
    /// Entries are validated and inserted in order; a rejected entry stops
    /// the import and leaves earlier ones stored. Returns the number of
    /// documents imported.
    pub fn import(&self, docs: Vec<Document>) -> Result<usize, StoreError> {
        let expected = self.config.dimension();
        let mut inner = self.inner.write();
        let mut imported = 0;
        for doc in docs {
            if let Err(err) = validate_import(&doc, expected) {
                tracing::warn!(id = %doc.id, imported, error = %err, "import rejected entry");
                return Err(err);
            }
            inner.insert(doc);
            imported += 1;
        }
        tracing::debug!(imported, total = inner.len(), "import finished");
        Ok(imported)
    }
}

fn validate_import(doc: &Document, expected: usize) -> Result<(), StoreError> {
    if doc.id.trim().is_empty() {
        return Err(StoreError::InvalidId(doc.id.clone()));
    }
    let Some(embedding) = doc.embedding.as_ref() else {
        return Err(StoreError::MissingEmbedding { id: doc.id.clone() });
    };
    if embedding.len() != expected {
        return Err(StoreError::DimensionMismatch {
            expected,
            got: embedding.len(),
        });
    }
    Ok(())
}
