//! Domain types shared by the retrieval engine and its collaborators.

use serde::{Deserialize, Serialize};

pub type DocId = String;

/// A source document before chunking.
///
/// - `id`: stable document identity (knowledge base name, file stem, url)
/// - `title`: human-readable label shown to the answer generator
/// - `text`: the full UTF-8 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub text: String,
}

impl Document {
    /// Document whose title is its id.
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        let id = id.into();
        Self { title: id.clone(), id, text: text.into() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// A window of a document that is scored independently.
///
/// `chunk_index`/`total_chunks` give the position within the parent document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: DocId,
    pub doc_title: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub text: String,
}

impl Chunk {
    /// `"<doc_id>:<chunk_index>"`, unique within a store.
    pub fn key(&self) -> String {
        format!("{}:{}", self.doc_id, self.chunk_index)
    }
}

/// One ranked chunk handed to the answer generator, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub doc_id: DocId,
    pub doc_title: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub text: String,
    pub score: f32,
}

impl RetrievedChunk {
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            doc_id: chunk.doc_id.clone(),
            doc_title: chunk.doc_title.clone(),
            chunk_index: chunk.chunk_index,
            total_chunks: chunk.total_chunks,
            text: chunk.text.clone(),
            score,
        }
    }
}
