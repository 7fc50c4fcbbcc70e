//! The draft → post pipeline.
//!
//! One run processes one draft:
//!
//! 1. **Build** the request from the draft and author profile ([`prompt`])
//! 2. **Generate** raw text with the configured provider
//! 3. **Normalize** the text into a schema-complete post ([`normalize`])
//! 4. **Write** it to the content store without overwriting anything ([`writer`])
//!
//! Every error bubbles up unchanged; nothing is written unless all earlier
//! stages succeed.

pub mod normalize;
pub mod prompt;
pub mod validate;
pub mod writer;

pub use normalize::normalize;
pub use validate::{InvalidFile, SchemaViolation, check_directory, validate_document};
pub use writer::{slugify, write};

use chrono::{DateTime, Utc};
use draftpress_config::{AppConfig, NormalizeConfig};
use draftpress_core::{AuthorProfile, Draft, GeneratedPost, Provider, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Runs drafts through a provider and into an output directory.
pub struct Pipeline<P> {
    provider: P,
    output_dir: PathBuf,
    normalize: NormalizeConfig,
    temperature: f32,
    max_tokens: u32,
}

impl<P: Provider> Pipeline<P> {
    /// A pipeline with default sampling and normalization settings.
    pub fn new(provider: P, output_dir: impl Into<PathBuf>) -> Self {
        let generation = draftpress_config::GenerationConfig::default();
        Self {
            provider,
            output_dir: output_dir.into(),
            normalize: NormalizeConfig::default(),
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
        }
    }

    /// A pipeline configured from the settings file.
    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        Self::new(provider, &config.paths.output_dir)
            .with_normalize(config.normalize.clone())
            .with_sampling(config.generation.temperature, config.generation.max_tokens)
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeConfig) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate and normalize a post without touching the content store.
    pub async fn draft_post(
        &self,
        draft: &Draft,
        profile: &AuthorProfile,
        now: DateTime<Utc>,
    ) -> Result<GeneratedPost> {
        let request = prompt::build(draft, profile).with_sampling(self.temperature, self.max_tokens);

        info!(
            provider = %self.provider.name(),
            model = %self.provider.model(),
            draft = %draft.path().display(),
            prompt_chars = request.prompt.len(),
            "Generating post"
        );

        let raw = self.provider.generate(&request).await?;
        let post = normalize(&raw, draft, now, &self.normalize)?;

        info!(title = %post.frontmatter.title, date = %post.frontmatter.date, "Post normalized");
        Ok(post)
    }

    /// Generate a post and write it, returning the new file's path.
    pub async fn run(
        &self,
        draft: &Draft,
        profile: &AuthorProfile,
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let post = self.draft_post(draft, profile, now).await?;
        write(&post, &self.output_dir)
    }
}
