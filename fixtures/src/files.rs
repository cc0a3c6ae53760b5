//! Fixture file access.
//!
//! A missing file means "no data", not an error, unless the caller insists
//! on its existence. Files are rewritten by deleting the old one first and
//! creating a new one; there is no atomic rename, so a crash mid-write can
//! leave a fixture missing or truncated.

use crate::error::{FixtureError, Result};
use serde_json::Value;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Raw page body.
pub const CONTENT_FILE: &str = "content";
/// Raw body of a failed fetch.
pub const FAILED_CONTENT_FILE: &str = "failed_content";
/// Page and job metadata.
pub const PAGE_FILE: &str = "page.json";
/// The page's `vars` object.
pub const VARS_FILE: &str = "vars.json";
/// Pages saved by the scraper.
pub const PAGES_FILE: &str = "pages.json";
/// Outputs saved by the scraper.
pub const OUTPUTS_FILE: &str = "outputs.json";
/// Pages the scraper is expected to save.
pub const EXPECTED_PAGES_FILE: &str = "expected_pages.json";
/// Outputs the scraper is expected to save.
pub const EXPECTED_OUTPUTS_FILE: &str = "expected_outputs.json";

/// Load a text file.
///
/// Returns `None` when the file does not exist, unless `should_exist` is
/// set, in which case a missing file is [`FixtureError::NotFound`]. Bodies
/// must be UTF-8: binary content (zip, spreadsheets) fails with
/// [`FixtureError::Read`].
pub fn load_file(path: &Path, should_exist: bool) -> Result<Option<String>> {
    if !path.exists() {
        if should_exist {
            return Err(FixtureError::NotFound(path.to_path_buf()));
        }
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| FixtureError::read(path, e))
}

/// Load and parse a JSON file.
///
/// Blank files are treated like missing ones.
pub fn load_json_file(path: &Path, should_exist: bool) -> Result<Option<Value>> {
    let Some(content) = load_file(path, should_exist)? else {
        return Ok(None);
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| FixtureError::json(path, e))
}

fn delete_existing(path: &Path) -> Result<()> {
    if path.exists() {
        tracing::debug!("Deleting old {}", path.display());
        fs::remove_file(path).map_err(|e| FixtureError::write(path, e))?;
    }
    Ok(())
}

/// Replace a file with `content`.
///
/// The old file is always deleted. When `content` is `None` no new file is
/// created and `false` is returned.
pub fn record_file(path: &Path, content: Option<&str>) -> Result<bool> {
    delete_existing(path)?;
    let Some(content) = content else {
        tracing::info!("Null content for {}, skipping file", path.display());
        return Ok(false);
    };
    tracing::info!("Creating {}", path.display());
    fs::write(path, content).map_err(|e| FixtureError::write(path, e))?;
    Ok(true)
}

/// Replace a file with whatever `writer` streams into it.
pub fn record_file_with<F>(path: &Path, writer: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    delete_existing(path)?;
    tracing::info!("Creating {}", path.display());
    let file = fs::File::create(path).map_err(|e| FixtureError::write(path, e))?;
    let mut out = BufWriter::new(file);
    writer(&mut out)?;
    out.flush().map_err(|e| FixtureError::write(path, e))
}

/// Make a path absolute against the current directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| FixtureError::read(".", e))?;
    Ok(cwd.join(path))
}

/// Pretty-print a JSON value the way fixture files are stored.
pub fn to_fixture_json(value: &Value) -> String {
    // Serializing a `Value` cannot fail
    serde_json::to_string_pretty(value).unwrap_or_default()
}
