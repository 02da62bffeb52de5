//! kbqa-embed
//!
//! Sentence encoders implementing [`kbqa_core::Embedder`]: a candle BERT
//! model loaded from local files, and a hashing encoder for tests.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use kbqa_core::config::{expand_path, EmbeddingSettings};
use kbqa_core::traits::Embedder;

pub mod device;
mod fake;
mod model;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use model::{load_weights, BertEmbedder};
pub use pool::masked_mean_l2;

/// all-MiniLM-L6-v2 output size; the hashing encoder matches it.
pub const DEFAULT_DIM: usize = 384;

fn use_fake_from_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Build the encoder described by `settings`.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing encoder.
pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if settings.fake || use_fake_from_env() {
        info!("using hashing FakeEmbedder");
        return Ok(Arc::new(FakeEmbedder::new(DEFAULT_DIM)));
    }
    let model_dir = resolve_model_dir(&expand_path(&settings.model_dir))?;
    Ok(Arc::new(BertEmbedder::load(&model_dir, settings.max_len)?))
}

/// Like [`build_embedder`] but never fails: a disabled or unloadable model
/// yields `None` and retrieval runs lexical-only.
pub fn load_embedder(settings: &EmbeddingSettings) -> Option<Arc<dyn Embedder>> {
    if !settings.enabled {
        info!("semantic search disabled by configuration");
        return None;
    }
    match build_embedder(settings) {
        Ok(embedder) => Some(embedder),
        Err(e) => {
            warn!(error = %e, "semantic search unavailable, falling back to keyword scoring");
            None
        }
    }
}

fn resolve_model_dir(configured: &Path) -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() {
                info!(var, dir = %p.display(), "using model dir from environment");
                return Ok(p);
            }
        }
    }
    if configured.exists() {
        return Ok(configured.to_path_buf());
    }
    let parent = Path::new("..").join(configured);
    if parent.exists() {
        return Ok(parent);
    }
    Err(anyhow!("Could not locate sentence encoder directory {}", configured.display()))
}
