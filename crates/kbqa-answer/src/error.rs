use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no API key configured for the answer generator")]
    MissingApiKey,
    #[error("no model configured for the answer generator")]
    NoModels,
    #[error("every model failed; last error: {last_error}")]
    Exhausted { last_error: String },
    #[error("request failed: {0}")]
    Request(String),
}

/// Transport-level failure; HTTP error statuses come back as responses instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("{0}")]
    Send(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<TransportError> for GenerationError {
    fn from(e: TransportError) -> Self {
        Self::Request(e.to_string())
    }
}

impl GenerationError {
    /// Short text shown in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => "API key is not configured. Please contact the administrator.".to_string(),
            Self::NoModels => "No answer model is configured. Please contact the administrator.".to_string(),
            Self::Exhausted { last_error } => format!("No model succeeded. Last error: {last_error}"),
            Self::Request(msg) => format!("Error: {msg}"),
        }
    }
}
