use async_trait::async_trait;

pub mod openai;

pub use openai::OpenAiClient;

use crate::Result;

/// Which API key a request is sent under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    /// Primary key; produces the first draft of every chunk
    Writer,
    /// Secondary key; re-runs condense prompts and its output wins
    Reviewer,
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Writer => write!(f, "writer"),
            Credential::Reviewer => write!(f, "reviewer"),
        }
    }
}

/// A prompt and the credential to send it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub credential: Credential,
}

impl GenerationRequest {
    pub fn writer(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            credential: Credential::Writer,
        }
    }

    pub fn reviewer(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            credential: Credential::Reviewer,
        }
    }
}

/// Trait for text-generation backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the prompt, trimmed of surrounding whitespace
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
