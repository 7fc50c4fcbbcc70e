//! Configuration loading, validation, and provider resolution for draftpress.
//!
//! Settings come from an optional `draftpress.toml`; provider credentials and
//! model overrides come from the environment (see [`resolver`]).

pub mod resolver;

pub use draftpress_core::ConfigError;
pub use resolver::{ProviderConfig, ProviderKind, ProviderStatus, PROVIDER_VAR};

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "draftpress.toml";

/// The root configuration structure.
///
/// Maps directly to `draftpress.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Provider call settings (timeouts, retries, sampling)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Frontmatter repair limits
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Per-provider overrides, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on a single provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout_secs() -> u64 {
    90
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    1_000
}
fn default_max_backoff_ms() -> u64 {
    30_000
}
fn default_temperature() -> f32 {
    0.4
}
fn default_max_tokens() -> u32 {
    2200
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_profile_path")]
    pub profile: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("config/author_profile.md")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("generated_posts")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_path(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,

    #[serde(default = "default_max_tags")]
    pub max_tags: usize,

    #[serde(default = "default_max_tag_chars")]
    pub max_tag_chars: usize,

    /// Used when the body has no prose sentence to summarize
    #[serde(default = "default_fallback_summary")]
    pub fallback_summary: String,
}

fn default_summary_max_chars() -> usize {
    160
}
fn default_max_tags() -> usize {
    8
}
fn default_max_tag_chars() -> usize {
    32
}
fn default_fallback_summary() -> String {
    "AI-generated post from your analysis draft.".into()
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            summary_max_chars: default_summary_max_chars(),
            max_tags: default_max_tags(),
            max_tag_chars: default_max_tag_chars(),
            fallback_summary: default_fallback_summary(),
        }
    }
}

/// Optional per-provider overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,
}

impl AppConfig {
    /// Load configuration for a run.
    ///
    /// An explicit path must exist. Without one, `./draftpress.toml` is used
    /// when present and defaults otherwise. A `.env` file in the working
    /// directory is loaded first; variables already set are not replaced.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            }),
            Some(path) => Self::load_from(path),
            None => Self::load_from(Path::new(CONFIG_FILE)),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if generation.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_attempts must be at least 1".into(),
            ));
        }
        if generation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generation.timeout_secs must be greater than 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.normalize.summary_max_chars < 16 {
            return Err(ConfigError::ValidationError(
                "normalize.summary_max_chars must be at least 16".into(),
            ));
        }
        if self.normalize.max_tags == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.max_tags must be at least 1".into(),
            ));
        }
        for name in self.providers.keys() {
            name.parse::<ProviderKind>()?;
        }
        Ok(())
    }

    /// Overrides for one provider, if the file has a section for it.
    pub fn provider_settings(&self, kind: ProviderKind) -> Option<&ProviderSettings> {
        self.providers.get(kind.name())
    }
}
