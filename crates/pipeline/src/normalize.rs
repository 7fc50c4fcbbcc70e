//! Response normalizer.
//!
//! Repairs raw model output into a [`GeneratedPost`] whose frontmatter always
//! satisfies the site schema. Missing or malformed fields are synthesized
//! from the draft and the run time; the only failure is output with no body.

use chrono::{DateTime, NaiveDate, Utc};
use draftpress_config::NormalizeConfig;
use draftpress_core::frontmatter::{self, RawValue};
use draftpress_core::post::REQUIRED_FIELDS;
use draftpress_core::{Draft, Frontmatter, GeneratedPost, NormalizeError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Last-resort title when neither the model nor the draft offers one.
pub const UNTITLED: &str = "Untitled Post";

const ELLIPSIS: &str = "...";

/// Normalize raw provider output for `draft`, generated at `now`.
pub fn normalize(
    raw: &str,
    draft: &Draft,
    now: DateTime<Utc>,
    config: &NormalizeConfig,
) -> Result<GeneratedPost, NormalizeError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(NormalizeError::EmptyOutput);
    }

    let split = frontmatter::split(text);
    let fields = split.block().map(frontmatter::parse_block).unwrap_or_default();
    let body = split.body().trim();
    if body.is_empty() {
        return Err(NormalizeError::EmptyOutput);
    }

    let mut repaired = Vec::new();

    let title = match scalar(&fields, "title") {
        Some(title) => title,
        None => {
            repaired.push("title");
            draft
                .heading()
                .map(str::to_string)
                .or_else(|| draft.human_title())
                .unwrap_or_else(|| UNTITLED.to_string())
        }
    };

    let summary = match scalar(&fields, "summary") {
        Some(summary) => summary,
        None => {
            repaired.push("summary");
            first_sentence(body)
                .map(|s| truncate(&s, config.summary_max_chars))
                .unwrap_or_else(|| config.fallback_summary.clone())
        }
    };

    let date = match scalar(&fields, "date").as_deref().and_then(parse_date) {
        Some(date) => date,
        None => {
            repaired.push("date");
            now.date_naive()
        }
    };

    let tags = clean_tags(fields.get("tags"), config);

    let extra: BTreeMap<String, String> = fields
        .iter()
        .filter(|(key, _)| !REQUIRED_FIELDS.contains(&key.as_str()) && is_plain_key(key))
        .filter_map(|(key, value)| {
            let value = value.as_scalar()?.trim();
            (!value.is_empty()).then(|| (key.clone(), value.to_string()))
        })
        .collect();

    if !repaired.is_empty() {
        debug!(fields = ?repaired, draft = %draft.path().display(), "Synthesized frontmatter fields");
    }

    Ok(GeneratedPost {
        frontmatter: Frontmatter {
            title,
            summary,
            date,
            tags,
            draft_source: draft.path().display().to_string(),
            extra,
        },
        body: body.to_string(),
    })
}

/// Remove a ```` ```markdown ```` fence that wraps the entire output.
fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(inner) = text.strip_prefix("```").and_then(|t| t.strip_suffix("```")) else {
        return text;
    };
    let Some((info, content)) = inner.split_once('\n') else {
        return text;
    };
    match info.trim().to_ascii_lowercase().as_str() {
        "" | "markdown" | "md" => content.trim(),
        _ => text,
    }
}

/// A non-empty scalar value, with internal whitespace collapsed to single spaces.
fn scalar(fields: &BTreeMap<String, RawValue>, key: &str) -> Option<String> {
    let value = fields.get(key)?.as_scalar()?;
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// `YYYY-MM-DD` or an RFC 3339 timestamp.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn clean_tags(value: Option<&RawValue>, config: &NormalizeConfig) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    let Some(value) = value else {
        return tags;
    };

    for item in value.items() {
        if tags.len() >= config.max_tags {
            break;
        }
        let tag = item
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim_start_matches('#')
            .trim()
            .to_lowercase();
        if tag.is_empty() || tag.chars().count() > config.max_tag_chars {
            continue;
        }
        tags.insert(tag);
    }
    tags
}

/// Extra keys are rendered back as `key: value`, so only simple identifiers survive.
fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// The first sentence of the first prose paragraph in a markdown body.
///
/// Headings, images, list items, quotes, tables, HTML, and anything inside a
/// code fence are skipped.
fn first_sentence(body: &str) -> Option<String> {
    let mut in_fence = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in body.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if in_fence {
            continue;
        }

        if is_prose(trimmed) {
            paragraph.push(trimmed);
        } else if !paragraph.is_empty() {
            break;
        }
    }

    let paragraph = strip_inline_markup(&paragraph.join(" "));
    let paragraph = paragraph.trim();
    if paragraph.is_empty() {
        return None;
    }

    let end = paragraph
        .char_indices()
        .find(|&(i, c)| {
            matches!(c, '.' | '!' | '?')
                && paragraph[i + c.len_utf8()..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        })
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(paragraph.len());

    Some(paragraph[..end].to_string())
}

fn is_prose(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    let starts_list_item = line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("+ ")
        || line
            .split_once(". ")
            .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));

    !(line.starts_with('#')
        || line.starts_with("![")
        || line.starts_with('>')
        || line.starts_with('|')
        || line.starts_with('<')
        || line.starts_with("---")
        || starts_list_item)
}

/// Drop emphasis and code markers, and reduce `[text](url)` links to their text.
fn strip_inline_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.split_once("](") {
            Some((label, tail)) if !label.contains('[') => match tail.find(')') {
                Some(close) => {
                    out.push_str(label);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('[');
                    rest = after;
                }
            },
            _ => {
                out.push('[');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out.replace("**", "").replace("__", "").replace('`', "")
}

/// Cap `text` at `max_chars` characters, ending in `...` when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let cut: String = text.chars().take(keep).collect();
    format!("{}{ELLIPSIS}", cut.trim_end())
}
