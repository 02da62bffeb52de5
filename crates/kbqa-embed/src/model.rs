use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use kbqa_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

/// BERT-family sentence encoder (e.g. all-MiniLM-L6-v2) run through candle.
///
/// The model directory must hold `config.json`, `tokenizer.json` and either
/// `model.safetensors` or `pytorch_model.bin`. Vectors are mean-pooled over
/// the attention mask and L2-normalised.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl BertEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading sentence encoder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))?;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!(dim, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, dim, max_len: max_len.max(1) })
    }

    fn forward(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vector: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if vector.len() != self.dim {
            return Err(anyhow!("expected {} dims, model returned {}", self.dim, vector.len()));
        }
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "encoded text");
        Ok(vector)
    }
}

/// Weights from `model.safetensors`, falling back to `pytorch_model.bin`.
pub fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        let bytes = std::fs::read(&safetensors)
            .with_context(|| format!("reading {}", safetensors.display()))?;
        return Ok(VarBuilder::from_buffered_safetensors(bytes, DType::F32, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle)?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights_map, DType::F32, device));
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn encode(&self, text: &str) -> Result<Vec<f32>> { self.forward(text) }
}
