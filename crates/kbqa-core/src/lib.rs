#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;

pub use chunker::Chunker;
pub use error::{Error, Result};
pub use traits::Embedder;
pub use types::{Chunk, DocId, Document, RetrievedChunk};
