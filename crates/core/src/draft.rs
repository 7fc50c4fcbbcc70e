//! A draft is the unprocessed source document a run expands into a post.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// The on-disk format of a draft, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftFormat {
    Markdown,
    Plaintext,
}

impl DraftFormat {
    /// `.md` and `.markdown` are Markdown; everything else is plain text.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Plaintext,
        }
    }
}

/// A draft read from disk. Never mutated after it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    path: PathBuf,
    text: String,
    format: DraftFormat,
}

impl Draft {
    /// Build a draft from already-loaded text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let format = DraftFormat::from_path(&path);
        Self {
            path,
            text: text.into(),
            format,
        }
    }

    /// Read a draft from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Draft {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if text.trim().is_empty() {
            return Err(Error::Draft {
                path: path.to_path_buf(),
                reason: "draft is empty".into(),
            });
        }

        debug!(path = %path.display(), bytes = text.len(), "Loaded draft");
        Ok(Self::new(path, text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> DraftFormat {
        self.format
    }

    /// The file name (e.g. `ipl-final.md`), or an empty string.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The first `# Heading` line of a Markdown draft, if any.
    pub fn heading(&self) -> Option<&str> {
        if self.format != DraftFormat::Markdown {
            return None;
        }
        self.text
            .lines()
            .map(str::trim)
            .find(|l| l.starts_with('#'))
            .map(|l| l.trim_start_matches('#').trim())
            .filter(|l| !l.is_empty())
    }

    /// The file stem turned into a readable title: `ipl-final_recap` → `Ipl Final Recap`.
    pub fn human_title(&self) -> Option<String> {
        let stem = self.path.file_stem()?.to_string_lossy();
        let words: Vec<String> = stem
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect();
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
