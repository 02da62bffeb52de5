use kbqa_core::config::EmbeddingSettings;
use kbqa_core::Embedder;
use kbqa_embed::build_embedder;

fn main() -> anyhow::Result<()> {
    let text = std::env::args().nth(1).unwrap_or_else(|| "hello world".to_string());
    let embedder = build_embedder(&EmbeddingSettings::default())?;
    let v = embedder.encode(&text)?;
    println!("dim={} first={:?}", v.len(), &v[..v.len().min(8)]);
    Ok(())
}
