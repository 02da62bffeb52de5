//! kbqa-retrieval
//!
//! Blended lexical and semantic ranking of document chunks. Documents are
//! chunked and featurized once at ingestion; each query is featurized once and
//! scored against every chunk in a [`ChunkStore`].

pub mod engine;
pub mod features;
pub mod ranker;
pub mod scorer;
pub mod store;

pub use engine::{ingest, retrieve, RetrievalEngine};
pub use features::{extract, extract_query, ChunkFeatures, QueryFeatures};
pub use ranker::{rank, Scored};
pub use scorer::{cosine_similarity, Scorer};
pub use store::{ChunkStore, IndexedChunk};

/// A ranked chunk still borrowing from its store.
pub type ScoredChunk<'a> = Scored<&'a IndexedChunk>;
