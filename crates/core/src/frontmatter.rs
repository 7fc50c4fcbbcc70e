//! Frontmatter block splitting and lenient key/value parsing.
//!
//! A document is a `---` line, `key: value` lines, a closing `---` line, then
//! the markdown body. Parsing here never fails: unparseable lines are skipped
//! and the caller decides what to repair.

use std::collections::BTreeMap;

/// The fixed marker line that opens and closes a frontmatter block.
pub const DELIMITER: &str = "---";

/// How a document splits around its frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split<'a> {
    /// `---` … `---` found; `block` is the text between the markers.
    Frontmatter { block: &'a str, body: &'a str },
    /// An opening marker with no closing one; `body` is everything after the opening line.
    Unclosed { body: &'a str },
    /// No opening marker at all.
    Bare { body: &'a str },
}

impl<'a> Split<'a> {
    pub fn body(&self) -> &'a str {
        match self {
            Self::Frontmatter { body, .. } | Self::Unclosed { body } | Self::Bare { body } => body,
        }
    }

    pub fn block(&self) -> Option<&'a str> {
        match self {
            Self::Frontmatter { block, .. } => Some(block),
            _ => None,
        }
    }
}

/// Split a document into frontmatter block and body.
///
/// Leading whitespace and a byte-order mark are ignored when looking for the
/// opening marker.
pub fn split(text: &str) -> Split<'_> {
    let text = text.trim_start_matches('\u{feff}').trim_start();

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Split::Bare { body: text };
    };
    if first.trim_end() != DELIMITER {
        return Split::Bare { body: text };
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Split::Frontmatter {
                block: &text[block_start..offset],
                body: &text[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    Split::Unclosed {
        body: &text[block_start..],
    }
}

/// A parsed frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Scalar(String),
    List(Vec<String>),
}

impl RawValue {
    /// The scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// List items, treating a scalar as a comma-separated list.
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Scalar(s) => split_flow(s),
        }
    }
}

/// Parse the lines of a frontmatter block into a key → value map.
///
/// Keys are lowercased. Supported values: bare, `'single'` or `"double"`
/// quoted scalars, flow lists `[a, "b"]`, and block lists of `- item` lines
/// under a key with no inline value. Later duplicates win.
pub fn parse_block(block: &str) -> BTreeMap<String, RawValue> {
    let mut fields = BTreeMap::new();
    let mut open_list: Option<(String, Vec<String>)> = None;

    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix('-')
            && let Some((_, items)) = open_list.as_mut()
        {
            let item = unquote(item.trim());
            if !item.is_empty() {
                items.push(item);
            }
            continue;
        }

        if let Some((key, items)) = open_list.take() {
            fields.insert(key, RawValue::List(items));
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();

        if value.is_empty() {
            open_list = Some((key, Vec::new()));
        } else if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            fields.insert(key, RawValue::List(split_flow(inner)));
        } else {
            fields.insert(key, RawValue::Scalar(unquote(value)));
        }
    }

    if let Some((key, items)) = open_list {
        // A key with neither an inline value nor list items is an empty scalar.
        let value = if items.is_empty() {
            RawValue::Scalar(String::new())
        } else {
            RawValue::List(items)
        };
        fields.insert(key, value);
    }

    fields
}

/// Split `a, "b, c", 'd'` on commas outside quotes and unquote each item.
fn split_flow(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in inner.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' && q == '"' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == ',' => items.push(std::mem::take(&mut current)),
            None => current.push(c),
        }
    }
    items.push(current);

    items
        .iter()
        .map(|s| unquote(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strip YAML-style quotes from a scalar.
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return serde_json::from_str::<String>(value)
            .unwrap_or_else(|_| value[1..value.len() - 1].to_string());
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].replace("''", "'");
    }
    value.to_string()
}

/// Render a string as a double-quoted scalar (valid as both JSON and YAML).
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
