//! The schema-complete document handed to the content store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::frontmatter::{DELIMITER, quote};

/// Frontmatter keys every output document must carry.
pub const REQUIRED_FIELDS: &[&str] = &["title", "summary", "date", "tags", "draft_source"];

/// Fully-populated frontmatter. Constructed only by the normalizer, so every
/// field is present and well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    pub summary: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub draft_source: String,

    /// Additional scalar keys the model emitted (e.g. `author`), kept verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A generated article: frontmatter plus markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl GeneratedPost {
    /// Render the document exactly as it is stored on disk.
    pub fn to_markdown(&self) -> String {
        let fm = &self.frontmatter;
        let tags: Vec<String> = fm.tags.iter().map(|t| quote(t)).collect();

        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&format!("title: {}\n", quote(&fm.title)));
        out.push_str(&format!("summary: {}\n", quote(&fm.summary)));
        out.push_str(&format!("date: {}\n", fm.date.format("%Y-%m-%d")));
        out.push_str(&format!("tags: [{}]\n", tags.join(", ")));
        out.push_str(&format!("draft_source: {}\n", quote(&fm.draft_source)));
        for (key, value) in &fm.extra {
            out.push_str(&format!("{key}: {}\n", quote(value)));
        }
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out.push_str(self.body.trim());
        out.push('\n');
        out
    }
}
