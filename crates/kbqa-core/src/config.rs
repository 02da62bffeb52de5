//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_CHUNKING__SIZE`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::{Chunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Self::base().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document; no files, no env.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Self { figment: Self::base().merge(Toml::string(toml)) };
        config.validate()?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::ConfigKey { key: key.to_string(), source: Box::new(e) })
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::ConfigKey { key: "<root>".to_string(), source: Box::new(e) })
    }

    fn validate(&self) -> Result<()> {
        let settings = self.settings()?;
        settings.chunking.chunker()?;
        if settings.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".to_string()));
        }
        if settings.generator.models.is_empty() {
            return Err(Error::InvalidConfig("generator.models must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Typed view of the merged configuration. Every table has defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub scoring: ScoringWeights,
    pub embedding: EmbeddingSettings,
    pub generator: GeneratorSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_OVERLAP }
    }
}

impl ChunkingSettings {
    pub fn chunker(&self) -> Result<Chunker> {
        Chunker::new(self.size, self.overlap)
    }
}

/// When the acronym and substring bonuses take part in scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcronymBoost {
    /// Only for queries scored without an embedding.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub acronym_boost: AcronymBoost,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 8, acronym_boost: AcronymBoost::Auto }
    }
}

/// Weights of the blended relevance score.
///
/// The defaults are empirical and carry no tuning guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Multiplier on clipped cosine similarity.
    pub semantic: f32,
    /// Per shared query/chunk token.
    pub token_overlap: f32,
    /// Lower-cased query found verbatim in the chunk.
    pub exact_phrase: f32,
    /// The phrase bonus needs a query longer than this many chars.
    pub min_phrase_chars: usize,
    pub acronym: f32,
    /// Extra on top of `acronym` for the "Full Name (ACRONYM)" pattern.
    pub acronym_parenthesized: f32,
    /// Per chunk keyword contained in the query.
    pub keyword_in_query: f32,
    /// Per query term (> 3 chars) contained in the chunk.
    pub query_term_in_chunk: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 100.0,
            token_overlap: 2.0,
            exact_phrase: 10.0,
            min_phrase_chars: 3,
            acronym: 10.0,
            acronym_parenthesized: 15.0,
            keyword_in_query: 3.0,
            query_term_in_chunk: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub enabled: bool,
    pub model_dir: String,
    pub max_len: usize,
    /// Use the hashing encoder instead of loading model weights.
    pub fake: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            fake: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub api_key: String,
    pub base_url: String,
    /// Tried in order until one answers.
    pub models: Vec<String>,
    pub timeout_secs: u64,
    pub assistant_name: String,
    pub language: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1".to_string(),
            models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-2.0-flash".to_string(),
                "gemini-2.5-flash-lite".to_string(),
                "gemini-2.0-flash-lite".to_string(),
            ],
            timeout_secs: 30,
            assistant_name: "knowledge base assistant".to_string(),
            language: "English".to_string(),
        }
    }
}

impl GeneratorSettings {
    /// Configured key, else `GEMINI_API_KEY`, else empty.
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.trim().is_empty() {
            return self.api_key.trim().to_string();
        }
        env::var("GEMINI_API_KEY").map(|k| k.trim().to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub dir: String,
    pub sync_timeout_secs: u64,
    pub max_section_chars: usize,
    /// First line of the exported knowledge document.
    pub export_header: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: "knowledge_base".to_string(),
            sync_timeout_secs: 30,
            max_section_chars: 5000,
            export_header: "KNOWLEDGE BASE".to_string(),
        }
    }
}

impl StoreSettings {
    pub fn dir_path(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
