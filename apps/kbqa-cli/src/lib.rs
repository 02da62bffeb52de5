//! Shared setup for the kbqa binaries.

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kbqa_core::config::{Config, Settings};
use kbqa_core::loader::DocumentLoader;
use kbqa_core::RetrievedChunk;
use kbqa_retrieval::{ChunkStore, RetrievalEngine};
use kbqa_store::{knowledge_document, KnowledgeStore};

/// `RUST_LOG`-driven subscriber, `info` by default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

pub fn load_settings() -> Result<Settings> {
    let config = Config::load().context("loading configuration")?;
    config.settings().context("reading settings")
}

pub fn knowledge_store(settings: &Settings) -> KnowledgeStore {
    KnowledgeStore::new(settings.store.dir_path())
}

/// Retrieval state for one CLI session.
pub struct Session {
    pub settings: Settings,
    pub engine: RetrievalEngine,
    pub chunks: ChunkStore,
}

impl Session {
    /// Load the encoder, index the knowledge base and any files under `docs`.
    pub fn build(settings: Settings, docs: Option<&Path>) -> Result<Self> {
        let embedder = kbqa_embed::load_embedder(&settings.embedding);
        let engine = RetrievalEngine::from_settings(&settings, embedder)?;
        let mut session = Self { settings, engine, chunks: ChunkStore::new() };
        session.index_knowledge_base()?;
        if let Some(dir) = docs {
            session.index_directory(dir)?;
        }
        if session.chunks.is_empty() {
            warn!("no documents indexed; answers will use general knowledge");
        }
        Ok(session)
    }

    fn index_knowledge_base(&mut self) -> Result<()> {
        let store = knowledge_store(&self.settings);
        let kb = store.load().with_context(|| format!("loading knowledge base from {}", store.dir().display()))?;
        if kb.sections.is_empty() {
            info!(dir = %store.dir().display(), "knowledge base is empty");
            return Ok(());
        }
        let doc = knowledge_document(&kb, &self.settings.store.export_header);
        self.engine.index(&mut self.chunks, &doc);
        Ok(())
    }

    fn index_directory(&mut self, dir: &Path) -> Result<()> {
        let docs = DocumentLoader::new()
            .load_directory(dir)
            .with_context(|| format!("loading documents from {}", dir.display()))?;
        let pb = ProgressBar::new(docs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")?
                .progress_chars("#>-"),
        );
        for doc in &docs {
            pb.set_message(doc.title.clone());
            self.engine.index(&mut self.chunks, doc);
            pb.inc(1);
        }
        pb.finish_with_message("indexed");
        Ok(())
    }

    pub fn search(&self, query: &str, k: Option<usize>) -> Vec<RetrievedChunk> {
        let k = k.unwrap_or(self.settings.retrieval.top_k);
        self.engine.retrieve(&self.chunks, query, k)
    }
}

pub fn print_hits(hits: &[RetrievedChunk]) {
    if hits.is_empty() {
        println!("No matching chunks.");
        return;
    }
    for (i, h) in hits.iter().enumerate() {
        println!("{:>2}. [{:.2}] {} (part {}/{})", i + 1, h.score, h.doc_title, h.chunk_index + 1, h.total_chunks);
        let preview: String = h.text.chars().take(200).collect();
        println!("    {}", preview.replace('\n', " "));
    }
}
