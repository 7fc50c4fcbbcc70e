//! Provider client: the tagged union the pipeline talks to.
//!
//! The resolved [`ProviderConfig`] picks exactly one variant; after that,
//! callers only see the [`Provider`] contract.

use async_trait::async_trait;
use draftpress_config::{ProviderConfig, ProviderKind};
use draftpress_core::{GenerationRequest, Provider, ProviderError};
use std::time::Duration;
use tracing::info;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::http;
use crate::openai_compat::OpenAiCompatProvider;

/// One variant per supported backend.
pub enum ProviderClient {
    OpenAi(OpenAiCompatProvider),
    OpenRouter(OpenAiCompatProvider),
    Nvidia(OpenAiCompatProvider),
    Gemini(GeminiProvider),
    Claude(AnthropicProvider),
}

impl ProviderClient {
    /// Build the client for the active provider. Every HTTP call it makes is
    /// bounded by `timeout`.
    pub fn from_config(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = http::build_client(timeout)?;
        let key = config.api_key.as_str();
        let model = config.model.as_str();

        let provider = match config.kind {
            ProviderKind::OpenAi => Self::OpenAi(
                OpenAiCompatProvider::openai(key, model, client).with_base_url(&config.base_url),
            ),
            ProviderKind::OpenRouter => Self::OpenRouter(
                OpenAiCompatProvider::openrouter(key, model, client).with_base_url(&config.base_url),
            ),
            ProviderKind::Nvidia => Self::Nvidia(
                OpenAiCompatProvider::nvidia(key, model, client).with_base_url(&config.base_url),
            ),
            ProviderKind::Gemini => {
                Self::Gemini(GeminiProvider::new(key, model, client).with_base_url(&config.base_url))
            }
            ProviderKind::Claude => Self::Claude(
                AnthropicProvider::new(key, model, client).with_base_url(&config.base_url),
            ),
        };

        info!(
            provider = %config.kind,
            model = %config.model,
            timeout_secs = timeout.as_secs(),
            "Provider client ready"
        );
        Ok(provider)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::OpenAi(_) => ProviderKind::OpenAi,
            Self::OpenRouter(_) => ProviderKind::OpenRouter,
            Self::Nvidia(_) => ProviderKind::Nvidia,
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::Claude(_) => ProviderKind::Claude,
        }
    }

    fn inner(&self) -> &dyn Provider {
        match self {
            Self::OpenAi(p) | Self::OpenRouter(p) | Self::Nvidia(p) => p,
            Self::Gemini(p) => p,
            Self::Claude(p) => p,
        }
    }
}

#[async_trait]
impl Provider for ProviderClient {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn model(&self) -> &str {
        self.inner().model()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.inner().generate(request).await
    }
}
