//! Checking a tree of fixture directories.
//!
//! Every sub-directory of the root is one fixture. Its `pages.json` and
//! `outputs.json` are replayed as saved data and compared against
//! `expected_pages.json` and `expected_outputs.json`. A fixture without an
//! expected file is not compared on that side.

use crate::context::{FixtureContext, LoadOptions, MatchExpectedOptions};
use crate::error::{FixtureError, Result};
use crate::files::{load_json_file, EXPECTED_OUTPUTS_FILE, EXPECTED_PAGES_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of checking a fixture tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckSummary {
    /// Fixture directories visited, sorted by path
    pub checked: Vec<PathBuf>,
    /// Fixture directories with at least one mismatch
    pub failed: Vec<PathBuf>,
}

impl CheckSummary {
    pub fn passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sub-directories of `root`, sorted.
fn fixture_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(FixtureError::NotADirectory(root.to_path_buf()));
    }
    let entries = fs::read_dir(root).map_err(|e| FixtureError::read(root, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| FixtureError::read(root, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Check one fixture directory, printing a report for each mismatch.
pub fn check_fixture(dir: &Path) -> Result<bool> {
    let mut context = FixtureContext::new();
    context.load_input(LoadOptions::from_dir(dir))?;

    let mut matched = true;
    for name in [EXPECTED_PAGES_FILE, EXPECTED_OUTPUTS_FILE] {
        let path = dir.join(name);
        if load_json_file(&path, false)?.is_none() {
            tracing::debug!("No {}, skipping", path.display());
            continue;
        }
        let opts = MatchExpectedOptions {
            log_caller: Some(vec![format!("{}:0", path.display())]),
            ..MatchExpectedOptions::default()
        };
        let ok = if name == EXPECTED_PAGES_FILE {
            context.should_match_pages(&opts)?
        } else {
            context.should_match_outputs(&opts)?
        };
        matched &= ok;
    }
    Ok(matched)
}

/// Check every fixture directory under `root`.
pub fn check_fixtures(root: &Path) -> Result<CheckSummary> {
    let mut summary = CheckSummary::default();
    for dir in fixture_dirs(root)? {
        tracing::info!("Checking {}", dir.display());
        if !check_fixture(&dir)? {
            tracing::warn!("Fixture {} did not match", dir.display());
            summary.failed.push(dir.clone());
        }
        summary.checked.push(dir);
    }
    Ok(summary)
}
