//! kbqa-store
//!
//! The editable knowledge base behind the assistant: a directory of JSON
//! files with version snapshots, a plain-text export that retrieval ingests,
//! and a scheduled sync that mirrors web pages into auto-synced sections.

pub mod error;
pub mod fetch;
pub mod html;
pub mod model;
pub mod store;
pub mod sync;
pub mod text;

pub use error::{Result, StoreError};
pub use fetch::{HttpFetcher, PageFetcher};
pub use html::html_to_text;
pub use model::{KnowledgeBase, Section, SyncConfig, VersionEntry, VersionSnapshot};
pub use store::KnowledgeStore;
pub use sync::{sync, SyncReport};
pub use text::{export_text, parse_text};

use kbqa_core::types::Document;

/// Document id of the exported knowledge base inside a retrieval session.
pub const KNOWLEDGE_DOC_ID: &str = "knowledge_base";

/// The knowledge base as one retrievable document.
pub fn knowledge_document(kb: &KnowledgeBase, header: &str) -> Document {
    Document::new(KNOWLEDGE_DOC_ID, export_text(kb, header)).with_title(header)
}
