//! Content-store writer.
//!
//! Posts are written under `{YYYY-MM-DD}-{slug}.md`. A write never replaces
//! an existing file: on collision the next free `-2`, `-3`, … suffix is used.
//! Readers of the output directory see either the whole document or nothing,
//! because content is staged in a temp file in the same directory and then
//! renamed into place.

use draftpress_core::{Error, GeneratedPost, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Slugs longer than this are cut at a character boundary.
pub const MAX_SLUG_CHARS: usize = 60;

/// Used when a title has no alphanumeric characters.
pub const FALLBACK_SLUG: &str = "generated-post";

const MAX_CANDIDATES: u32 = 1000;

/// Mode of a written post. Temp files start owner-only.
#[cfg(unix)]
const POST_MODE: u32 = 0o644;

/// `"IPL 2024: Final!"` → `"ipl-2024-final"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let slug: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// The filename stem for a post before any collision suffix.
pub fn file_stem(post: &GeneratedPost) -> String {
    format!(
        "{}-{}",
        post.frontmatter.date.format("%Y-%m-%d"),
        slugify(&post.frontmatter.title)
    )
}

/// Persist `post` into `output_dir` and return the path it landed at.
pub fn write(post: &GeneratedPost, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let content = post.to_markdown();
    let mut staged = tempfile::Builder::new()
        .prefix(".draftpress-")
        .suffix(".tmp")
        .tempfile_in(output_dir)
        .map_err(|e| Error::io(output_dir, e))?;
    staged
        .write_all(content.as_bytes())
        .and_then(|()| staged.flush())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| Error::io(staged.path(), e))?;
    publishable(&staged).map_err(|e| Error::io(staged.path(), e))?;

    let stem = file_stem(post);
    for n in 1..=MAX_CANDIDATES {
        let candidate = if n == 1 {
            output_dir.join(format!("{stem}.md"))
        } else {
            output_dir.join(format!("{stem}-{n}.md"))
        };

        match staged.persist_noclobber(&candidate) {
            Ok(_) => {
                info!(path = %candidate.display(), bytes = content.len(), "Post written");
                return Ok(candidate);
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %candidate.display(), "Target exists, trying next suffix");
                staged = e.file;
            }
            Err(e) => return Err(Error::io(candidate, e.error)),
        }
    }

    Err(Error::io(
        output_dir.join(format!("{stem}.md")),
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{MAX_CANDIDATES} posts named {stem} already exist"),
        ),
    ))
}

#[cfg(unix)]
fn publishable(staged: &tempfile::NamedTempFile) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    staged
        .as_file()
        .set_permissions(std::fs::Permissions::from_mode(POST_MODE))
}

#[cfg(not(unix))]
fn publishable(_staged: &tempfile::NamedTempFile) -> io::Result<()> {
    Ok(())
}
