use std::sync::Arc;

use tracing::{debug, info, warn};

use kbqa_core::chunker::Chunker;
use kbqa_core::config::Settings;
use kbqa_core::traits::Embedder;
use kbqa_core::types::{Chunk, Document, RetrievedChunk};
use kbqa_core::Result;

use crate::features::{extract, extract_query};
use crate::ranker::{rank, Scored};
use crate::scorer::Scorer;
use crate::store::{ChunkStore, IndexedChunk};

/// Chunking, feature extraction and ranking over a caller-owned [`ChunkStore`].
///
/// Holds configuration only; every session keeps its own store.
#[derive(Clone)]
pub struct RetrievalEngine {
    chunker: Chunker,
    scorer: Scorer,
    embedder: Option<Arc<dyn Embedder>>,
}

impl RetrievalEngine {
    pub fn new(chunker: Chunker, scorer: Scorer, embedder: Option<Arc<dyn Embedder>>) -> Self {
        Self { chunker, scorer, embedder }
    }

    pub fn from_settings(settings: &Settings, embedder: Option<Arc<dyn Embedder>>) -> Result<Self> {
        let chunker = settings.chunking.chunker()?;
        let scorer = Scorer::new(settings.scoring.clone(), settings.retrieval.acronym_boost);
        Ok(Self::new(chunker, scorer, embedder))
    }

    pub fn chunker(&self) -> &Chunker { &self.chunker }

    pub fn scorer(&self) -> &Scorer { &self.scorer }

    pub fn has_embedder(&self) -> bool { self.embedder.is_some() }

    fn embedder(&self) -> Option<&dyn Embedder> { self.embedder.as_deref() }

    pub fn ingest(&self, document_id: &str, text: &str) -> Vec<IndexedChunk> {
        self.ingest_document(&Document::new(document_id, text))
    }

    pub fn ingest_document(&self, document: &Document) -> Vec<IndexedChunk> {
        ingest_titled(document, &self.chunker, self.embedder())
    }

    /// Ingest `document` and upsert its chunks; returns the chunk count.
    pub fn index(&self, store: &mut ChunkStore, document: &Document) -> usize {
        let chunks = self.ingest_document(document);
        let n = chunks.len();
        store.upsert(&document.id, chunks);
        info!(doc = %document.id, chunks = n, total = store.len(), "indexed document");
        n
    }

    /// Up to `k` chunks with positive score, best first.
    pub fn retrieve(&self, store: &ChunkStore, query: &str, k: usize) -> Vec<RetrievedChunk> {
        retrieve(store, query, k, &self.scorer, self.embedder())
    }
}

impl std::fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("chunker", &self.chunker)
            .field("scorer", &self.scorer)
            .field("embedder_dim", &self.embedder.as_ref().map(|e| e.dim()))
            .finish()
    }
}

/// Split `text` into scored-ready chunks of document `document_id`.
pub fn ingest(
    document_id: &str,
    text: &str,
    chunker: &Chunker,
    embedder: Option<&dyn Embedder>,
) -> Vec<IndexedChunk> {
    ingest_titled(&Document::new(document_id, text), chunker, embedder)
}

fn ingest_titled(document: &Document, chunker: &Chunker, embedder: Option<&dyn Embedder>) -> Vec<IndexedChunk> {
    let pieces = chunker.chunk(&document.text);
    let total_chunks = pieces.len();
    let chunks: Vec<IndexedChunk> = pieces
        .into_iter()
        .enumerate()
        .map(|(chunk_index, piece)| IndexedChunk {
            features: extract(piece, embedder),
            chunk: Chunk {
                doc_id: document.id.clone(),
                doc_title: document.title.clone(),
                chunk_index,
                total_chunks,
                text: piece.to_string(),
            },
        })
        .collect();

    if embedder.is_some() {
        let missing = chunks.iter().filter(|c| c.features.embedding.is_none()).count();
        if missing > 0 {
            warn!(doc = %document.id, missing, "some chunks have no embedding; they are scored lexically");
        }
    }
    chunks
}

/// Score every chunk in `store` against `query` and return the top `k`.
pub fn retrieve(
    store: &ChunkStore,
    query: &str,
    k: usize,
    scorer: &Scorer,
    embedder: Option<&dyn Embedder>,
) -> Vec<RetrievedChunk> {
    if k == 0 || query.trim().is_empty() || store.is_empty() {
        return Vec::new();
    }
    let features = extract_query(query, embedder);
    if embedder.is_some() && features.embedding.is_none() {
        warn!("query embedding unavailable, ranking lexically");
    }

    let scored = store
        .chunks()
        .iter()
        .map(|c| Scored::new(c, scorer.score(&features, &c.features)))
        .collect();
    let ranked = rank(scored, k);
    debug!(candidates = store.len(), returned = ranked.len(), "ranked chunks");

    ranked
        .into_iter()
        .map(|s| RetrievedChunk::from_chunk(&s.item.chunk, s.score))
        .collect()
}
