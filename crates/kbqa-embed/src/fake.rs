use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use kbqa_core::traits::Embedder;

/// Deterministic bag-of-hashed-tokens encoder for tests and offline runs.
///
/// Texts that share lower-cased tokens get positive cosine similarity; it
/// carries no real semantics.
#[derive(Debug, Clone)]
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v { *x /= norm; }
        }
        Ok(v)
    }
}
