use std::sync::Arc;

use anyhow::Result;
use kbqa_core::config::Settings;
use kbqa_core::Document;
use kbqa_embed::FakeEmbedder;
use kbqa_retrieval::{ChunkStore, RetrievalEngine};

fn main() -> Result<()> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "RDG".to_string());
    let use_embedder = std::env::args().any(|a| a == "--semantic");

    let embedder: Option<Arc<dyn kbqa_core::Embedder>> =
        if use_embedder { Some(Arc::new(FakeEmbedder::new(384))) } else { None };
    let engine = RetrievalEngine::from_settings(&Settings::default(), embedder)?;

    let mut store = ChunkStore::new();
    for (id, text) in [
        ("rdg", "Rapat Dewan Gubernur (RDG) sets the policy rate every month."),
        ("inflation", "Inflation stayed within the target range this quarter."),
        ("payments", "The payment system processes real-time gross settlement."),
    ] {
        engine.index(&mut store, &Document::new(id, text));
    }

    for hit in engine.retrieve(&store, &query, 5) {
        println!("{:>8.2}  {}#{}  {}", hit.score, hit.doc_id, hit.chunk_index, hit.text);
    }
    Ok(())
}
