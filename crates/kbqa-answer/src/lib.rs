//! kbqa-answer
//!
//! Turns a query and its ranked chunks into a grounded answer from a hosted
//! language model.

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod transport;

pub use error::{GenerationError, TransportError};
pub use gemini::{GeminiClient, ModelInfo};
pub use prompt::PromptBuilder;
pub use transport::{HttpResponse, ReqwestTransport, Transport};

use kbqa_core::types::RetrievedChunk;

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Model that produced `text`.
    pub model: String,
    /// Chunks the prompt was grounded on, best first.
    pub sources: Vec<RetrievedChunk>,
}

pub trait AnswerGenerator {
    fn answer(&self, query: &str, chunks: &[RetrievedChunk]) -> Result<Answer, GenerationError>;
}
