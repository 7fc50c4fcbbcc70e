//! Output schema checks.
//!
//! The static site reads every `.md` file in the output directory and requires
//! the frontmatter schema enforced here.

use chrono::NaiveDate;
use draftpress_core::frontmatter::{self, RawValue};
use draftpress_core::post::REQUIRED_FIELDS;
use draftpress_core::{Error, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One way a document fails the site schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("no closed frontmatter block at the top of the file")]
    MissingFrontmatter,

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("date `{0}` is not YYYY-MM-DD")]
    InvalidDate(String),

    #[error("document has no body")]
    EmptyBody,
}

/// Check a rendered document against the site schema.
///
/// `tags` must be present but may be an empty list; every other required
/// field must be a non-empty scalar.
pub fn validate_document(text: &str) -> std::result::Result<(), Vec<SchemaViolation>> {
    let frontmatter::Split::Frontmatter { block, body } = frontmatter::split(text) else {
        return Err(vec![SchemaViolation::MissingFrontmatter]);
    };

    let fields = frontmatter::parse_block(block);
    let mut violations = Vec::new();

    for &field in REQUIRED_FIELDS {
        match fields.get(field) {
            None => violations.push(SchemaViolation::MissingField(field)),
            Some(_) if field == "tags" => {}
            Some(RawValue::Scalar(value)) if value.trim().is_empty() => {
                violations.push(SchemaViolation::EmptyField(field));
            }
            Some(RawValue::List(_)) => violations.push(SchemaViolation::EmptyField(field)),
            Some(RawValue::Scalar(_)) => {}
        }
    }

    if let Some(RawValue::Scalar(date)) = fields.get("date")
        && !date.trim().is_empty()
        && NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").is_err()
    {
        violations.push(SchemaViolation::InvalidDate(date.clone()));
    }

    if body.trim().is_empty() {
        violations.push(SchemaViolation::EmptyBody);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// A file that failed [`validate_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFile {
    pub path: PathBuf,
    pub violations: Vec<SchemaViolation>,
}

/// Validate every `.md` file directly inside `dir`, in name order.
///
/// Returns the number of files checked and the ones that failed.
pub fn check_directory(dir: &Path) -> Result<(usize, Vec<InvalidFile>)> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut invalid = Vec::new();
    for path in &paths {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        if let Err(violations) = validate_document(&text) {
            invalid.push(InvalidFile {
                path: path.clone(),
                violations,
            });
        }
    }

    Ok((paths.len(), invalid))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "---\ntitle: \"T\"\nsummary: \"S\"\ndate: 2024-05-26\ntags: []\n\
                         draft_source: \"drafts/a.md\"\n---\n\nBody\n";

    #[test]
    fn valid_document_passes() {
        assert_eq!(validate_document(VALID), Ok(()));
    }

    #[test]
    fn missing_frontmatter() {
        assert_eq!(
            validate_document("# Just markdown\n"),
            Err(vec![SchemaViolation::MissingFrontmatter])
        );
        assert_eq!(
            validate_document("---\ntitle: never closed\n"),
            Err(vec![SchemaViolation::MissingFrontmatter])
        );
    }

    #[test]
    fn reports_every_violation() {
        let doc = "---\ntitle: \"\"\ndate: 26/05/2024\n---\n\n";
        let violations = validate_document(doc).unwrap_err();
        assert_eq!(
            violations,
            vec![
                SchemaViolation::EmptyField("title"),
                SchemaViolation::MissingField("summary"),
                SchemaViolation::MissingField("tags"),
                SchemaViolation::MissingField("draft_source"),
                SchemaViolation::InvalidDate("26/05/2024".into()),
                SchemaViolation::EmptyBody,
            ]
        );
    }

    #[test]
    fn list_title_is_rejected() {
        let doc = VALID.replace("title: \"T\"", "title: [a, b]");
        assert_eq!(
            validate_document(&doc),
            Err(vec![SchemaViolation::EmptyField("title")])
        );
    }

    #[test]
    fn check_directory_lists_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2024-05-26-good.md"), VALID).unwrap();
        std::fs::write(dir.path().join("2024-05-27-bad.md"), "no frontmatter").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (checked, invalid) = check_directory(dir.path()).unwrap();

        assert_eq!(checked, 2);
        assert_eq!(invalid.len(), 1);
        assert!(invalid[0].path.ends_with("2024-05-27-bad.md"));
        assert_eq!(invalid[0].violations, vec![SchemaViolation::MissingFrontmatter]);
    }

    #[test]
    fn check_missing_directory_is_io_error() {
        let err = check_directory(Path::new("/nonexistent/generated_posts")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!err.to_string().contains("Write error"), "{err}");
        assert!(err.to_string().starts_with("I/O error: /nonexistent/generated_posts"));
    }
}
