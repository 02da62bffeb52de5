//! Blended relevance score between a query and a chunk.
//!
//! The score is a sum of independently weighted signals:
//!
//! 1. semantic: clipped cosine similarity of the two embeddings, when both exist
//! 2. token overlap: shared lower-cased whitespace tokens
//! 3. exact phrase: the lower-cased query occurs verbatim in the chunk
//! 4. acronym boost (see [`AcronymBoost`]): upper-case query abbreviations found
//!    in the chunk, with an extra bonus for the `"Full Name (ABBR)"` form, plus
//!    small substring bonuses between chunk keywords and query terms
//!
//! Scores are finite and never negative. Degenerate inputs score 0.

use kbqa_core::config::{AcronymBoost, ScoringWeights};

use crate::features::{ChunkFeatures, QueryFeatures};

/// Query terms must be longer than this to earn the term-in-chunk bonus.
const MIN_QUERY_TERM_CHARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scorer {
    weights: ScoringWeights,
    acronym_boost: AcronymBoost,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, acronym_boost: AcronymBoost) -> Self {
        Self { weights, acronym_boost }
    }

    pub fn weights(&self) -> &ScoringWeights { &self.weights }

    /// Whether the acronym and substring bonuses apply to this query.
    pub fn acronym_mode(&self, query: &QueryFeatures) -> bool {
        match self.acronym_boost {
            AcronymBoost::Always => true,
            AcronymBoost::Never => false,
            AcronymBoost::Auto => query.embedding.is_none(),
        }
    }

    pub fn score(&self, query: &QueryFeatures, chunk: &ChunkFeatures) -> f32 {
        let w = &self.weights;
        let mut score = 0.0f32;

        if let (Some(q), Some(c)) = (&query.embedding, &chunk.embedding) {
            score += cosine_similarity(q, c).max(0.0) * w.semantic;
        }

        score += token_overlap(query, chunk) as f32 * w.token_overlap;

        if query.char_len() > w.min_phrase_chars && chunk.lowered.contains(&query.lowered) {
            score += w.exact_phrase;
        }

        if self.acronym_mode(query) {
            score += self.acronym_bonus(query, chunk);
        }

        if score.is_finite() && score > 0.0 { score } else { 0.0 }
    }

    fn acronym_bonus(&self, query: &QueryFeatures, chunk: &ChunkFeatures) -> f32 {
        let w = &self.weights;
        let mut bonus = 0.0f32;

        for acronym in &query.acronyms {
            if chunk.lowered.contains(acronym.as_str()) {
                bonus += w.acronym;
                if chunk.lowered.contains(&format!("({acronym})")) {
                    bonus += w.acronym_parenthesized;
                }
            }
        }

        let keywords_in_query = chunk
            .keywords
            .iter()
            .filter(|k| query.lowered.contains(k.as_str()))
            .count();
        bonus += keywords_in_query as f32 * w.keyword_in_query;

        let terms_in_chunk = query
            .tokens
            .iter()
            .filter(|t| t.chars().count() > MIN_QUERY_TERM_CHARS)
            .filter(|t| chunk.lowered.contains(t.as_str()))
            .count();
        bonus += terms_in_chunk as f32 * w.query_term_in_chunk;

        bonus
    }
}

/// Number of distinct query tokens that also occur in the chunk.
pub fn token_overlap(query: &QueryFeatures, chunk: &ChunkFeatures) -> usize {
    query.tokens.iter().filter(|t| chunk.words.contains(*t)).count()
}

/// `dot(a, b) / (|a| * |b|)`; 0 when either norm is 0 or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
