//! `draftpress check` — Validate posts against the site's frontmatter schema.

use draftpress_core::Result;
use draftpress_pipeline::{InvalidFile, check_directory};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

pub fn run(dir: &Path) -> Result<ExitCode> {
    let (report, all_valid) = check(dir)?;
    print!("{report}");
    if all_valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// The printed report and whether every post passed.
fn check(dir: &Path) -> Result<(String, bool)> {
    let (checked, invalid) = check_directory(dir)?;
    info!(dir = %dir.display(), checked, invalid = invalid.len(), "Checked posts");
    Ok((render(dir, checked, &invalid), invalid.is_empty()))
}

fn render(dir: &Path, checked: usize, invalid: &[InvalidFile]) -> String {
    let mut out = String::new();
    for file in invalid {
        out.push_str(&format!("✗ {}\n", file.path.display()));
        for violation in &file.violations {
            out.push_str(&format!("    - {violation}\n"));
        }
    }

    if invalid.is_empty() {
        out.push_str(&format!("✓ {checked} post(s) in {} are valid\n", dir.display()));
    } else {
        out.push_str(&format!(
            "{} of {checked} post(s) in {} fail the frontmatter schema\n",
            invalid.len(),
            dir.display()
        ));
    }
    out
}
