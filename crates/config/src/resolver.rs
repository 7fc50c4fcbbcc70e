//! Provider resolution. Decides which backend a run talks to.
//!
//! Selection rules:
//! 1. An explicit choice (`--provider`, else `AI_PROVIDER`) wins, and its
//!    credential must be present.
//! 2. Otherwise the first provider with a non-empty credential in
//!    [`ProviderKind::PRECEDENCE`] order is used.
//!
//! Environment access goes through a lookup closure so tests never touch the
//! process environment.

use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::AppConfig;
use draftpress_core::ConfigError;

/// Environment variable for explicit provider selection.
pub const PROVIDER_VAR: &str = "AI_PROVIDER";

/// The supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
    Nvidia,
    Gemini,
    Claude,
}

impl ProviderKind {
    /// First-available-key scan order.
    pub const PRECEDENCE: [ProviderKind; 5] = [
        Self::OpenAi,
        Self::OpenRouter,
        Self::Nvidia,
        Self::Gemini,
        Self::Claude,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
            Self::Nvidia => "nvidia",
            Self::Gemini => "gemini",
            Self::Claude => "claude",
        }
    }

    /// Credential variable, e.g. `OPENAI_API_KEY`.
    pub fn key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Nvidia => "NVIDIA_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Claude => "CLAUDE_API_KEY",
        }
    }

    /// Model override variable, e.g. `OPENAI_MODEL`.
    pub fn model_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_MODEL",
            Self::OpenRouter => "OPENROUTER_MODEL",
            Self::Nvidia => "NVIDIA_MODEL",
            Self::Gemini => "GEMINI_MODEL",
            Self::Claude => "CLAUDE_MODEL",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::OpenRouter => "anthropic/claude-3.5-sonnet",
            Self::Nvidia => "meta/llama-3.1-70b-instruct",
            Self::Gemini => "gemini-1.5-pro",
            Self::Claude => "claude-3-5-sonnet-20241022",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Nvidia => "https://integrate.api.nvidia.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Claude => "https://api.anthropic.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            "nvidia" => Ok(Self::Nvidia),
            "gemini" | "google" => Ok(Self::Gemini),
            "claude" | "anthropic" => Ok(Self::Claude),
            _ => Err(ConfigError::UnknownProvider(s.trim().to_string())),
        }
    }
}

/// The single provider active for a run.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// One row of the `providers` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatus {
    pub kind: ProviderKind,
    pub model: String,
    pub has_credential: bool,
}

impl AppConfig {
    /// Resolve the active provider from the process environment.
    pub fn resolve_provider(&self, explicit: Option<&str>) -> Result<ProviderConfig, ConfigError> {
        self.resolve_provider_with(explicit, |key| std::env::var(key).ok())
    }

    /// Resolve the active provider using `lookup` for environment access.
    pub fn resolve_provider_with<F>(
        &self,
        explicit: Option<&str>,
        lookup: F,
    ) -> Result<ProviderConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let selection = explicit
            .map(str::to_string)
            .or_else(|| lookup(PROVIDER_VAR))
            .filter(|s| !s.trim().is_empty());

        if let Some(name) = selection {
            let kind: ProviderKind = name.parse()?;
            let api_key = credential(&lookup, kind).ok_or_else(|| ConfigError::MissingCredential {
                provider: kind.name().into(),
                variable: kind.key_var().into(),
            })?;
            debug!(provider = %kind, "Provider selected explicitly");
            return Ok(self.provider_config(kind, api_key, &lookup));
        }

        for kind in ProviderKind::PRECEDENCE {
            if let Some(api_key) = credential(&lookup, kind) {
                debug!(provider = %kind, "Provider selected by first available credential");
                return Ok(self.provider_config(kind, api_key, &lookup));
            }
        }

        Err(ConfigError::NoProviderConfigured)
    }

    /// Model, credential presence, and order for every provider.
    pub fn provider_statuses<F>(&self, lookup: F) -> Vec<ProviderStatus>
    where
        F: Fn(&str) -> Option<String>,
    {
        ProviderKind::PRECEDENCE
            .iter()
            .map(|&kind| ProviderStatus {
                kind,
                model: self.model_for(kind, &lookup),
                has_credential: credential(&lookup, kind).is_some(),
            })
            .collect()
    }

    fn provider_config<F>(&self, kind: ProviderKind, api_key: String, lookup: &F) -> ProviderConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = self
            .provider_settings(kind)
            .and_then(|s| s.base_url.clone())
            .unwrap_or_else(|| kind.default_base_url().to_string());

        ProviderConfig {
            kind,
            api_key,
            model: self.model_for(kind, lookup),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Env override → settings file → built-in default.
    fn model_for<F>(&self, kind: ProviderKind, lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        non_empty(lookup(kind.model_var()))
            .or_else(|| self.provider_settings(kind).and_then(|s| s.model.clone()))
            .unwrap_or_else(|| kind.default_model().to_string())
    }
}

fn credential<F>(lookup: &F, kind: ProviderKind) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(kind.key_var()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
