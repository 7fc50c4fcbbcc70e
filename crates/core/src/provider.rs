//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider takes a fully-built [`GenerationRequest`] and returns the raw
//! text the model produced. Each backend owns its own wire format; callers
//! never branch on provider identity after dispatch.
//!
//! Implementations: OpenAI, OpenRouter, NVIDIA (OpenAI-compatible), Gemini, Claude.

use async_trait::async_trait;
use crate::error::ProviderError;

/// A single generation call, ready to be sent to any backend.
///
/// Built once per run by the prompt builder and dropped after the call.
/// Contains no timestamps or random values, so building it twice from the
/// same inputs yields an identical value.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Fixed instructions: frontmatter schema, tone guidance, output format.
    pub system: String,

    /// Author profile context followed by the verbatim draft.
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

const DEFAULT_TEMPERATURE: f32 = 0.4;

const DEFAULT_MAX_TOKENS: u32 = 2200;

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// The full request text as a single string (system, blank line, prompt).
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.system, self.prompt)
    }
}

/// The core Provider trait.
///
/// Every backend implements this trait. The pipeline calls `generate()`
/// without knowing which provider is being used. Model and credential are
/// bound when the provider is constructed from the resolved config.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter", "claude").
    fn name(&self) -> &str;

    /// The model this provider will call.
    fn model(&self) -> &str;

    /// Send the request and return the complete raw text.
    ///
    /// There is no partial result: the call either yields all of the text
    /// or fails with a classified [`ProviderError`].
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req = GenerationRequest::new("sys", "prompt");
        assert!((req.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 2200);
    }

    #[test]
    fn request_text_joins_system_and_prompt() {
        let req = GenerationRequest::new("Follow the schema.", "## Draft\nhello");
        assert_eq!(req.text(), "Follow the schema.\n\n## Draft\nhello");
    }

    #[test]
    fn with_sampling_overrides_defaults() {
        let req = GenerationRequest::new("s", "p").with_sampling(0.9, 512);
        assert!((req.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 512);
    }
}
