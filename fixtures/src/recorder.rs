//! Fixture recorder.
//!
//! Pulls a page's content, failed content, page definition, vars and outputs
//! out of a [`DataSource`] and writes them as fixture files:
//!
//! ```text
//! <dir>/content
//! <dir>/failed_content
//! <dir>/page.json
//! <dir>/vars.json
//! <dir>/outputs.json
//! ```
//!
//! Every artifact is recorded by deleting the old file first. When the source
//! has nothing for an artifact the old file stays deleted.

use crate::config::{OutputFilter, RecordMap};
use crate::error::{FixtureError, Result};
use crate::files::{
    absolute_path, record_file, record_file_with, to_fixture_json, CONTENT_FILE, FAILED_CONTENT_FILE,
    OUTPUTS_FILE, PAGE_FILE, VARS_FILE,
};
use crate::source::{DataSource, JobId, OUTPUTS_PER_PAGE};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Records fixture directories from a data source.
pub struct Recorder<S> {
    source: S,
    /// Directories of the input map are relative to this one when set
    pub root_dir: Option<PathBuf>,
    /// Job the pages are recorded from
    pub job_id: Option<JobId>,
    /// Scraper used to look up the latest job when no job id is set
    pub scraper_name: Option<String>,
    /// Pages to record, see [`Recorder::record_all`]
    pub input_map: Vec<RecordMap>,
}

impl<S: DataSource> Recorder<S> {
    /// Create a recorder over a data source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            root_dir: None,
            job_id: None,
            scraper_name: None,
            input_map: Vec::new(),
        }
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_scraper_name(mut self, scraper_name: impl Into<String>) -> Self {
        self.scraper_name = Some(scraper_name.into());
        self
    }

    pub fn with_input_map(mut self, input_map: Vec<RecordMap>) -> Self {
        self.input_map = input_map;
        self
    }

    /// The underlying data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Make sure a job id is known.
    ///
    /// Without an explicit job id, the latest job of the configured scraper
    /// is looked up and remembered.
    pub fn ensure_job_id(&mut self) -> Result<Option<JobId>> {
        if self.job_id.is_none() {
            if let Some(name) = self.scraper_name.as_deref().map(str::trim) {
                tracing::info!("Retrieving job_id from scraper \"{}\"", name);
                self.job_id = self.source.get_job_id(name)?;
            }
        }
        match self.job_id {
            Some(job_id) => tracing::info!("Using job_id {}", job_id),
            None => tracing::info!("No job_id was specified"),
        }
        Ok(self.job_id)
    }

    /// Record a page's raw content into `content`.
    pub fn record_content(&self, gid: &str, dir: &Path) -> Result<()> {
        let content = self.source.get_content(gid)?;
        record_file(&dir.join(CONTENT_FILE), content.as_deref())?;
        Ok(())
    }

    /// Record a page's raw failed content into `failed_content`.
    pub fn record_failed_content(&self, gid: &str, dir: &Path) -> Result<()> {
        let content = self.source.get_failed_content(gid)?;
        record_file(&dir.join(FAILED_CONTENT_FILE), content.as_deref())?;
        Ok(())
    }

    /// Record a page definition into `page.json`.
    ///
    /// Uses the job page when a job id is known, the global page otherwise.
    pub fn record_page(&self, gid: &str, dir: &Path) -> Result<()> {
        if self.job_id.is_none() {
            tracing::warn!("No scraper_name or job_id was specified, using global page instead of job page");
        }
        let page = self.source.init_page(gid, self.job_id)?;
        let content = to_fixture_json(&Value::Object(page));
        record_file(&dir.join(PAGE_FILE), Some(&content))?;
        Ok(())
    }

    /// Record a job page's `vars` into `vars.json`.
    ///
    /// Skipped when no job id is known, since only job pages carry vars.
    pub fn record_vars(&self, gid: &str, dir: &Path) -> Result<()> {
        let Some(job_id) = self.job_id else {
            tracing::warn!("No scraper_name or job_id was specified, skipping vars");
            return Ok(());
        };
        let page = self.source.init_page(gid, Some(job_id))?;
        let vars = page.get("vars").cloned().unwrap_or(Value::Null);
        let content = to_fixture_json(&vars);
        record_file(&dir.join(VARS_FILE), Some(&content))?;
        Ok(())
    }

    /// Record every output matching `filter` into `outputs.json`.
    ///
    /// Outputs are fetched [`OUTPUTS_PER_PAGE`] at a time until an empty page
    /// comes back, and streamed into a single JSON array. Nothing happens
    /// when no filter is given.
    pub fn record_outputs(&self, filter: Option<&OutputFilter>, dir: &Path) -> Result<()> {
        let Some(filter) = filter else {
            tracing::info!("Skipping outputs, no filter given");
            return Ok(());
        };
        let path = dir.join(OUTPUTS_FILE);
        let io_err = |e| FixtureError::write(&path, e);

        record_file_with(&path, |out: &mut dyn Write| {
            let mut count = 0usize;
            let mut page = 1;
            out.write_all(b"[").map_err(io_err)?;
            loop {
                let outputs = self.source.find_outputs(
                    &filter.collection,
                    &filter.query,
                    page,
                    OUTPUTS_PER_PAGE,
                    &filter.opts,
                )?;
                if outputs.is_empty() {
                    break;
                }
                for output in outputs {
                    if count > 0 {
                        out.write_all(b",").map_err(io_err)?;
                    }
                    let text = to_fixture_json(&Value::Object(output));
                    out.write_all(text.as_bytes()).map_err(io_err)?;
                    count += 1;
                }
                page += 1;
            }
            out.write_all(b"]").map_err(io_err)?;
            tracing::info!("Recorded {} outputs from {} pages", count, page - 1);
            Ok(())
        })
    }

    /// Resolve and validate the target directory of an input map entry.
    pub fn resolve_dir(&self, dir: &str) -> Result<PathBuf> {
        let dir = dir.trim();
        if dir.is_empty() {
            return Err(FixtureError::EmptyArgument("dir"));
        }
        let mut path = PathBuf::from(dir);
        if let Some(root) = &self.root_dir {
            if !root.as_os_str().is_empty() {
                path = root.join(path);
            }
        }
        let path = absolute_path(&path)?;
        if !path.is_dir() {
            return Err(FixtureError::NotADirectory(path));
        }
        Ok(path)
    }

    /// Record one page into its directory.
    ///
    /// The gid and directory are validated before anything is fetched or
    /// written.
    pub fn record(&self, map: &RecordMap) -> Result<()> {
        let gid = map.gid.trim();
        if gid.is_empty() {
            return Err(FixtureError::EmptyArgument("gid"));
        }
        let dir = self.resolve_dir(&map.dir)?;
        tracing::info!("Recording on {}", dir.display());

        if map.record_content {
            self.record_content(gid, &dir)?;
        }
        if map.record_failed_content {
            self.record_failed_content(gid, &dir)?;
        }
        if map.record_page {
            self.record_page(gid, &dir)?;
        }
        if map.record_vars {
            self.record_vars(gid, &dir)?;
        }
        self.record_outputs(map.filters.outputs.as_ref(), &dir)?;

        tracing::info!("Finished recording {}", dir.display());
        Ok(())
    }

    /// Record every entry of the input map.
    pub fn record_all(&mut self) -> Result<usize> {
        self.ensure_job_id()?;
        for map in &self.input_map {
            self.record(map)?;
        }
        Ok(self.input_map.len())
    }
}
