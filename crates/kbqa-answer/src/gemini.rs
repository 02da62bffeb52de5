//! Gemini `generateContent` client with ordered model fallback.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use kbqa_core::config::GeneratorSettings;
use kbqa_core::types::RetrievedChunk;

use crate::error::GenerationError;
use crate::prompt::PromptBuilder;
use crate::transport::{ReqwestTransport, Transport};
use crate::{Answer, AnswerGenerator};

pub const GENERATE_METHOD: &str = "generateContent";

/// A model listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiClient<T: Transport = ReqwestTransport> {
    transport: T,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    prompt: PromptBuilder,
}

impl GeminiClient<ReqwestTransport> {
    /// Client over blocking reqwest, key from settings or `GEMINI_API_KEY`.
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, GenerationError> {
        let transport = ReqwestTransport::new(Duration::from_secs(settings.timeout_secs))?;
        Self::with_transport(settings, transport)
    }
}

impl<T: Transport> GeminiClient<T> {
    pub fn with_transport(settings: &GeneratorSettings, transport: T) -> Result<Self, GenerationError> {
        let api_key = settings.resolved_api_key();
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }
        if settings.models.is_empty() {
            return Err(GenerationError::NoModels);
        }
        Ok(Self {
            transport,
            api_key: api_key.trim().to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            models: settings.models.clone(),
            prompt: PromptBuilder::from_settings(settings),
        })
    }

    pub fn models(&self) -> &[String] { &self.models }

    pub fn prompt_builder(&self) -> &PromptBuilder { &self.prompt }

    /// Send `prompt` to each model in order; returns `(text, model)` of the
    /// first that answers with a candidate.
    pub fn generate(&self, prompt: &str) -> Result<(String, String), GenerationError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let mut last_error = String::from("no model attempted");
        for model in &self.models {
            let url = format!("{}/models/{}:{}?key={}", self.base_url, model, GENERATE_METHOD, self.api_key);
            debug!(%model, "calling generator");
            match self.transport.post_json(&url, &body) {
                Ok(resp) if resp.is_success() => match first_candidate_text(&resp.body) {
                    Some(text) => {
                        info!(%model, "answer generated");
                        return Ok((text, model.clone()));
                    }
                    None => last_error = format!("{model}: response had no candidates"),
                },
                Ok(resp) => {
                    let body = if resp.body.is_empty() { "Unknown error".to_string() } else { resp.body };
                    last_error = format!("{model}: HTTP {}: {body}", resp.status);
                }
                Err(e) => last_error = format!("{model}: {e}"),
            }
            warn!(%model, error = %last_error, "model failed, trying next");
        }
        Err(GenerationError::Exhausted { last_error })
    }

    /// Models available to this key that support `generateContent`.
    pub fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        let resp = self.transport.get(&url)?;
        if !resp.is_success() {
            return Err(GenerationError::Request(format!("HTTP {}: {}", resp.status, resp.body)));
        }
        let list: ModelList = serde_json::from_str(&resp.body)
            .map_err(|e| GenerationError::Request(format!("malformed model list: {e}")))?;
        Ok(list
            .models
            .into_iter()
            .filter(|m| m.supported_generation_methods.iter().any(|g| g == GENERATE_METHOD))
            .collect())
    }
}

fn first_candidate_text(body: &str) -> Option<String> {
    let parsed: GenerateResponse = serde_json::from_str(body).ok()?;
    parsed.candidates.into_iter().next()?.content?.parts.into_iter().next()?.text
}

impl<T: Transport> AnswerGenerator for GeminiClient<T> {
    fn answer(&self, query: &str, chunks: &[RetrievedChunk]) -> Result<Answer, GenerationError> {
        let prompt = self.prompt.build(query, chunks);
        let (text, model) = self.generate(&prompt)?;
        Ok(Answer { text, model, sources: chunks.to_vec() })
    }
}
