//! Author profile: identity and tone context read fresh on every run.
//!
//! The profile is a small markdown document. Two shapes are understood:
//!
//! ```markdown
//! # Author Profile
//! - **Name:** Asha Rao
//! - **Tone:** analytical
//!
//! ## Bio
//! Cricket stats nerd and data engineer.
//! ```
//!
//! Top-level `key: value` lines (optionally bulleted and bolded) become fields,
//! and each `## Heading` section becomes a field keyed by the lowercased
//! heading whose value is the section text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Fields rendered first, in this order, when the profile is put in a prompt.
pub const KNOWN_FIELDS: &[&str] = &["name", "bio", "tone", "links", "projects"];

/// Longer "keys" are prose that happens to contain a colon.
const MAX_KEY_WORDS: usize = 3;

/// Read-only mapping of profile field name → text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    fields: BTreeMap<String, String>,
}

impl AuthorProfile {
    /// Load and parse a profile document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Profile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let profile = Self::parse(&text);
        debug!(path = %path.display(), fields = profile.fields.len(), "Loaded author profile");
        Ok(profile)
    }

    /// Parse the key/section markdown format described in the module docs.
    pub fn parse(text: &str) -> Self {
        let mut fields = BTreeMap::new();
        let mut section: Option<(String, Vec<&str>)> = None;

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some(heading) = trimmed.strip_prefix("##") {
                flush_section(&mut fields, section.take());
                let key = normalize_key(heading.trim_start_matches('#'));
                if !key.is_empty() {
                    section = Some((key, Vec::new()));
                }
                continue;
            }

            match section.as_mut() {
                Some((_, lines)) => lines.push(line),
                None => {
                    // A single `#` title line is the document name, not a field.
                    if trimmed.starts_with('#') {
                        continue;
                    }
                    if let Some((key, value)) = parse_key_value(trimmed) {
                        fields.insert(key, value);
                    }
                }
            }
        }
        flush_section(&mut fields, section);

        Self { fields }
    }

    /// Build a profile directly from pairs (used by tests and callers that
    /// already hold structured data).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (normalize_key(k.as_ref()), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn tone(&self) -> Option<&str> {
        self.get("tone")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in a stable order: [`KNOWN_FIELDS`] first, then the rest
    /// alphabetically.
    pub fn ordered_fields(&self) -> Vec<(&str, &str)> {
        let known = KNOWN_FIELDS
            .iter()
            .filter_map(|k| self.fields.get_key_value(*k));
        let rest = self
            .fields
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()));
        known
            .chain(rest)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

fn flush_section(fields: &mut BTreeMap<String, String>, section: Option<(String, Vec<&str>)>) {
    if let Some((key, lines)) = section {
        let body = lines.join("\n").trim().to_string();
        if !body.is_empty() {
            fields.insert(key, body);
        }
    }
}

/// `- **Tone:** analytical` → `("tone", "analytical")`.
fn parse_key_value(line: &str) -> Option<(String, String)> {
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line)
        .replace("**", "");
    let (key, value) = line.split_once(':')?;
    let key = normalize_key(key);
    let value = value.trim();
    let is_key = !key.is_empty()
        && key.split('_').count() <= MAX_KEY_WORDS
        && key.chars().all(|c| c.is_alphanumeric() || c == '_');
    // `https://...` splits at the scheme colon; a bare URL is not a field.
    if !is_key || value.is_empty() || value.starts_with("//") {
        return None;
    }
    Some((key, value.to_string()))
}

fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = "\
# Author Profile
- **Name:** Asha Rao
- **Tone:** analytical
location: Pune

## Bio
Cricket stats nerd.
Writes about data.

## Links
- github: https://github.com/asha
";

    #[test]
    fn parses_key_values_and_sections() {
        let profile = AuthorProfile::parse(PROFILE);
        assert_eq!(profile.name(), Some("Asha Rao"));
        assert_eq!(profile.tone(), Some("analytical"));
        assert_eq!(profile.get("location"), Some("Pune"));
        assert_eq!(profile.get("bio"), Some("Cricket stats nerd.\nWrites about data."));
        assert_eq!(profile.get("links"), Some("- github: https://github.com/asha"));
    }

    #[test]
    fn title_line_is_not_a_field() {
        let profile = AuthorProfile::parse("# Author Profile\n");
        assert!(profile.is_empty());
    }

    #[test]
    fn prose_lines_are_ignored_outside_sections() {
        let profile = AuthorProfile::parse("Honestly I really like writing: a lot\n");
        assert!(profile.is_empty());
    }

    #[test]
    fn bare_url_line_is_not_a_field() {
        let profile = AuthorProfile::parse("https://github.com/asha\n- **Site:** https://asha.dev\n");
        assert_eq!(profile.get("https"), None);
        assert_eq!(profile.get("site"), Some("https://asha.dev"));
        assert_eq!(profile.ordered_fields().len(), 1);
    }

    #[test]
    fn ordered_fields_puts_known_first() {
        let profile = AuthorProfile::from_pairs([
            ("zeta", "z"),
            ("Tone", "dry"),
            ("name", "N"),
            ("alpha", "a"),
        ]);
        let keys: Vec<&str> = profile.ordered_fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["name", "tone", "alpha", "zeta"]);
    }

    #[test]
    fn multi_word_section_keys() {
        let profile = AuthorProfile::parse("## Writing Style\nShort sentences.\n");
        assert_eq!(profile.get("writing_style"), Some("Short sentences."));
    }

    #[test]
    fn load_missing_file_is_profile_error() {
        let err = AuthorProfile::load("/nonexistent/author_profile.md").unwrap_err();
        assert!(matches!(err, Error::Profile { .. }));
    }
}
