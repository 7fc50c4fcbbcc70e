//! LLM provider implementations for draftpress.
//!
//! All providers implement the `draftpress_core::Provider` trait.
//! [`ProviderClient`] selects the variant from the resolved config, and
//! [`RetryingProvider`] adds the timeout/backoff policy on top.

pub mod anthropic;
pub mod client;
pub mod gemini;
pub mod http;
pub mod openai_compat;
pub mod retry;

pub use anthropic::AnthropicProvider;
pub use client::ProviderClient;
pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use retry::{RetryPolicy, RetryingProvider, generate_with_retry};
