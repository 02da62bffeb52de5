use std::fmt::Write;

use kbqa_core::config::GeneratorSettings;
use kbqa_core::types::RetrievedChunk;

/// Builds the grounding prompt sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    assistant_name: String,
    language: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_settings(&GeneratorSettings::default())
    }
}

impl PromptBuilder {
    pub fn new(assistant_name: impl Into<String>, language: impl Into<String>) -> Self {
        Self { assistant_name: assistant_name.into(), language: language.into() }
    }

    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        Self::new(&settings.assistant_name, &settings.language)
    }

    /// One `[Document i: title, Part n/total]` block per chunk, best first.
    pub fn context(chunks: &[RetrievedChunk]) -> String {
        let mut out = String::from("Information from the documents:\n\n");
        for (i, c) in chunks.iter().enumerate() {
            let _ = writeln!(out, "[Document {}: {}, Part {}/{}]", i + 1, c.doc_title, c.chunk_index + 1, c.total_chunks);
            out.push_str(&c.text);
            out.push_str("\n\n");
        }
        out
    }

    pub fn build(&self, query: &str, chunks: &[RetrievedChunk]) -> String {
        if chunks.is_empty() {
            return self.build_general(query);
        }
        let context = Self::context(chunks);
        format!(
            "You are a {name} that helps answer questions.

INFORMATION FROM THE DOCUMENTS:
{context}
QUESTION: {query}

IMPORTANT INSTRUCTIONS:
- Use ONLY the information from the documents above to answer
- If the information is in the documents, answer in full detail from them
- Do NOT say the information is unavailable when it is in the documents
- Structure the answer clearly with bullet points and numbering
- Give practical information that can be used right away
- Include relevant contact numbers, addresses or links from the documents
- Answer in {language}, in a friendly and professional tone
- Only if the documents truly do not contain the answer, say so and suggest contacting the office",
            name = self.assistant_name,
            language = self.language,
        )
    }

    /// Prompt used when retrieval found nothing.
    pub fn build_general(&self, query: &str) -> String {
        format!(
            "You are a {name} that helps answer questions.

Question: {query}

Instructions:
- Answer from general knowledge
- Give accurate and useful information
- Point to official sources for further information
- Answer in {language}, in a friendly and professional tone",
            name = self.assistant_name,
            language = self.language,
        )
    }
}
