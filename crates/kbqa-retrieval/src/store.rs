use kbqa_core::types::{Chunk, DocId};

use crate::features::ChunkFeatures;

/// A chunk with the features scored against every query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub features: ChunkFeatures,
}

/// In-memory chunk collection kept in ingestion order.
///
/// Ranking ties resolve by position here, so re-ingesting a document moves
/// its chunks to the end.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<IndexedChunk>,
}

impl ChunkStore {
    pub fn new() -> Self { Self::default() }

    /// Replace every chunk of `doc_id` with `chunks`, appended at the end.
    /// An empty `chunks` leaves the document out of the store.
    pub fn upsert(&mut self, doc_id: &str, chunks: Vec<IndexedChunk>) {
        self.remove(doc_id);
        self.chunks.extend(chunks);
    }

    /// Drop all chunks of `doc_id`; returns how many were removed.
    pub fn remove(&mut self, doc_id: &str) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|c| c.chunk.doc_id != doc_id);
        before - self.chunks.len()
    }

    pub fn clear(&mut self) { self.chunks.clear(); }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn chunks(&self) -> &[IndexedChunk] { &self.chunks }

    /// Distinct document ids in first-ingested order.
    pub fn documents(&self) -> Vec<DocId> {
        let mut ids: Vec<DocId> = Vec::new();
        for c in &self.chunks {
            if !ids.contains(&c.chunk.doc_id) {
                ids.push(c.chunk.doc_id.clone());
            }
        }
        ids
    }
}
