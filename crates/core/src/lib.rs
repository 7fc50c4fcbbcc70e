//! # draftpress core
//!
//! Domain types, traits, and error definitions for the draftpress generation
//! pipeline. This crate has **no network or runtime dependencies**; it defines
//! the model that the config, provider, and pipeline crates implement against.
//!
//! ## Data flow
//!
//! A [`Draft`] and an [`AuthorProfile`] are combined into a
//! [`GenerationRequest`], a [`Provider`] turns it into raw text, and the
//! normalizer repairs that text into a [`GeneratedPost`] whose
//! [`Frontmatter`] always satisfies the site schema.

pub mod draft;
pub mod error;
pub mod frontmatter;
pub mod post;
pub mod profile;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use draft::{Draft, DraftFormat};
pub use error::{ConfigError, Error, NormalizeError, ProviderError, Result};
pub use post::{Frontmatter, GeneratedPost};
pub use profile::AuthorProfile;
pub use provider::{GenerationRequest, Provider};
