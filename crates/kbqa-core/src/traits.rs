/// A sentence encoder producing fixed-length dense vectors.
///
/// Implementations are loaded once and shared read-only across all scoring
/// calls, so `encode` takes `&self` and must not expose mutable state.
pub trait Embedder: Send + Sync {
    /// Dimensionality of every vector returned by `encode`.
    fn dim(&self) -> usize;

    fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}
