//! OpenAI-compatible provider implementation.
//!
//! Works with: OpenAI, OpenRouter, and NVIDIA's hosted endpoints, all of
//! which expose `/v1/chat/completions` with Bearer authentication.

use async_trait::async_trait;
use draftpress_core::{GenerationRequest, Provider, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model, client)
    }

    /// Create an OpenRouter provider (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key, model, client)
    }

    /// Create an NVIDIA provider (convenience constructor).
    pub fn nvidia(api_key: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self::new("nvidia", "https://integrate.api.nvidia.com/v1", api_key, model, client)
    }

    /// Override the base URL (proxies, self-hosted gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn to_api_request<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: &request.system,
                },
                ApiMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    fn extract_text(&self, response: ChatResponse) -> Result<String, ProviderError> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse(format!("No choices in {} response", self.name))
        })?;
        http::non_empty_text(&self.name, choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.to_api_request(request);

        debug!(provider = %self.name, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let text = http::read_success(&self.name, response).await?;
        let api_response: ChatResponse = http::parse_json(&self.name, &text)?;
        self.extract_text(api_response)
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
