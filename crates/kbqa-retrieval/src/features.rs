//! Lexical and semantic features computed once per chunk and once per query.

use std::collections::HashSet;

use tracing::debug;

use kbqa_core::traits::Embedder;

/// Keywords are the first this-many tokens longer than [`KEYWORD_MIN_CHARS`] - 1.
pub const MAX_KEYWORDS: usize = 30;
pub const KEYWORD_MIN_CHARS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkFeatures {
    /// Unique lower-cased whitespace tokens.
    pub words: HashSet<String>,
    /// Length of the original text in chars.
    pub length: usize,
    /// First [`MAX_KEYWORDS`] long tokens in order of appearance, duplicates kept.
    pub keywords: Vec<String>,
    pub embedding: Option<Vec<f32>>,
    /// Lower-cased text for substring signals.
    pub lowered: String,
}

/// Extract chunk features. Never fails: an encoder error leaves `embedding` empty.
pub fn extract(text: &str, embedder: Option<&dyn Embedder>) -> ChunkFeatures {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let keywords = tokens
        .iter()
        .filter(|t| t.chars().count() >= KEYWORD_MIN_CHARS)
        .take(MAX_KEYWORDS)
        .map(|t| t.to_string())
        .collect();
    let words = tokens.iter().map(|t| t.to_string()).collect();
    ChunkFeatures {
        words,
        length: text.chars().count(),
        keywords,
        embedding: embedder.and_then(|e| try_embed(e, text)),
        lowered,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFeatures {
    pub raw: String,
    pub lowered: String,
    /// Unique lower-cased whitespace tokens.
    pub tokens: HashSet<String>,
    /// Upper-case abbreviations found in the raw query, lower-cased, first-seen order.
    pub acronyms: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

impl QueryFeatures {
    pub fn char_len(&self) -> usize {
        self.raw.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub fn extract_query(query: &str, embedder: Option<&dyn Embedder>) -> QueryFeatures {
    let lowered = query.to_lowercase();
    let tokens = lowered.split_whitespace().map(str::to_string).collect();
    let embedding = if query.trim().is_empty() { None } else { embedder.and_then(|e| try_embed(e, query)) };
    QueryFeatures {
        raw: query.to_string(),
        tokens,
        acronyms: detect_acronyms(query),
        embedding,
        lowered,
    }
}

/// Alphanumeric runs of two or more chars whose letters are all upper case,
/// e.g. `RDG` or `BI` but not `KPwBI` or `2024`.
pub fn detect_acronyms(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| {
            let mut letters = t.chars().filter(|c| c.is_alphabetic()).peekable();
            letters.peek().is_some() && letters.all(char::is_uppercase)
        })
        .map(str::to_lowercase)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn try_embed(embedder: &dyn Embedder, text: &str) -> Option<Vec<f32>> {
    match embedder.encode(text) {
        Ok(v) if !v.is_empty() => Some(v),
        Ok(_) => {
            debug!("encoder returned an empty vector");
            None
        }
        Err(e) => {
            debug!(error = %e, "encoding failed");
            None
        }
    }
}
