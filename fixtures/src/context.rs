//! Mock execution context loaded from fixture files.
//!
//! A [`FixtureContext`] stands in for the platform while a scraper runs in a
//! test. It is filled from a fixture directory (or from values handed in
//! directly), collects what the scraper saves, and compares that against the
//! expected fixtures.
//!
//! Files map onto the context as follows:
//!
//! | File | Field |
//! |---|---|
//! | `content` | `content` |
//! | `failed_content` | `failed_content` |
//! | `page.json` | `page` |
//! | `vars.json` | `page["vars"]` |
//! | `pages.json` | `saved_pages` |
//! | `outputs.json` | `saved_outputs` |
//!
//! Loading only ever adds: there is no rollback, the context holds whatever
//! was loaded last.

use crate::error::{FixtureError, Result};
use crate::files::{
    absolute_path, load_file, load_json_file, CONTENT_FILE, EXPECTED_OUTPUTS_FILE,
    EXPECTED_PAGES_FILE, FAILED_CONTENT_FILE, OUTPUTS_FILE, PAGES_FILE, PAGE_FILE, VARS_FILE,
};
use crate::mode;
use crate::source::{DataSource, JobId};
use replay_engine::report::print_match_diff;
use replay_engine::value::json_type_name;
use replay_engine::{
    match_collections, matches, to_collection, CallerLocation, Collection, Error as EngineError,
    MatchDiff, MatchOptions, Record,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Fields skipped by default when comparing pages.
pub const DEFAULT_PAGE_SKIP_FIELDS: [&str; 2] = ["gid", "job_id"];

/// Fields skipped by default when comparing outputs.
pub const DEFAULT_OUTPUT_SKIP_FIELDS: [&str; 3] = ["_created_at", "_gid", "_job_id"];

/// Where to load from and what to load directly.
///
/// Directly supplied values win over files; files win over whatever the
/// context already held.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory to load files from
    pub input_dir: Option<PathBuf>,
    /// Same as `input_dir`, relative to the context's root input directory
    pub rel_dir: Option<PathBuf>,
    pub content: Option<String>,
    pub failed_content: Option<String>,
    pub page: Option<Record>,
    /// Page vars; `vars.json` is ignored when a page is supplied
    pub vars: Option<Value>,
    pub pages: Option<Collection>,
    pub outputs: Option<Collection>,
}

impl LoadOptions {
    /// Load from a directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Load from a directory relative to the root input directory.
    pub fn from_rel_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            rel_dir: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// How to compare saved records against expected ones.
#[derive(Debug, Clone)]
pub struct MatchExpectedOptions {
    /// Directory holding the expected fixture file
    pub input_dir: Option<PathBuf>,
    /// Same as `input_dir`, relative to the root input directory
    pub rel_dir: Option<PathBuf>,
    /// Expected records supplied directly, the expected file is not read then
    pub expected: Option<Collection>,
    /// Extra fields ignored on both sides
    pub skip_fields: Vec<String>,
    /// Also ignore the volatile identity fields (default `true`)
    pub default_skip_fields: bool,
    /// Call stack whose first frame the report is attributed to
    pub log_caller: Option<Vec<String>>,
}

impl Default for MatchExpectedOptions {
    fn default() -> Self {
        Self {
            input_dir: None,
            rel_dir: None,
            expected: None,
            skip_fields: Vec::new(),
            default_skip_fields: true,
            log_caller: None,
        }
    }
}

impl MatchExpectedOptions {
    pub fn with_skip_fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.skip_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expected(mut self, expected: Collection) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn without_default_skip_fields(mut self) -> Self {
        self.default_skip_fields = false;
        self
    }
}

/// In-memory stand-in for a scraper's execution context.
#[derive(Debug, Clone, Default)]
pub struct FixtureContext {
    /// Base for relative input directories
    pub root_input_dir: Option<PathBuf>,
    /// Directory the last load read from
    pub input_dir: Option<PathBuf>,
    pub content: Option<String>,
    pub failed_content: Option<String>,
    /// Page being parsed, `vars` included
    pub page: Option<Record>,
    /// Pages enqueued and not yet flushed
    pub pages: Collection,
    /// Outputs enqueued and not yet flushed
    pub outputs: Collection,
    pub saved_pages: Collection,
    pub saved_outputs: Collection,
}

fn read_text(dir: Option<&Path>, name: &str) -> Result<Option<String>> {
    match dir {
        Some(dir) => load_file(&dir.join(name), false),
        None => Ok(None),
    }
}

fn read_json(dir: Option<&Path>, name: &str) -> Result<Option<Value>> {
    match dir {
        Some(dir) => load_json_file(&dir.join(name), false),
        None => Ok(None),
    }
}

fn read_record(dir: Option<&Path>, name: &str) -> Result<Option<Record>> {
    match read_json(dir, name)? {
        Some(Value::Object(record)) => Ok(Some(record)),
        Some(other) => Err(EngineError::NotAnObject(json_type_name(&other)).into()),
        None => Ok(None),
    }
}

fn read_collection(dir: Option<&Path>, name: &str) -> Result<Option<Collection>> {
    read_json(dir, name)?
        .map(|value| to_collection(&value).map_err(FixtureError::from))
        .transpose()
}

fn merge_skip_fields(extra: &[String], defaults: &[&str], use_defaults: bool) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let defaults = defaults.iter().filter(|_| use_defaults).map(|f| f.to_string());
    for field in extra.iter().cloned().chain(defaults) {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

impl FixtureContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context resolving relative directories against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root_input_dir: Some(root.into()),
            ..Self::default()
        }
    }

    /// Create an empty context sharing this one's root input directory.
    pub fn new_context(&self) -> Self {
        Self {
            root_input_dir: self.root_input_dir.clone(),
            ..Self::default()
        }
    }

    /// Whether the process-wide test mode is on.
    pub fn test_mode(&self) -> bool {
        mode::is_test_mode()
    }

    /// Absolute path of a directory relative to the root input directory.
    pub fn expand_relative_input(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = match &self.root_input_dir {
            Some(root) => root.join(dir),
            None => dir.as_ref().to_path_buf(),
        };
        absolute_path(&path)
    }

    fn pick_dir(
        &self,
        input_dir: Option<&PathBuf>,
        rel_dir: Option<&PathBuf>,
    ) -> Result<Option<PathBuf>> {
        if let Some(dir) = input_dir {
            return Ok(Some(dir.clone()));
        }
        if let Some(rel) = rel_dir {
            return self.expand_relative_input(rel).map(Some);
        }
        Ok(self.input_dir.clone())
    }

    /// Load content, page, vars, saved pages and saved outputs.
    ///
    /// The directory is `input_dir`, else `rel_dir` under the root input
    /// directory, else the directory of the previous load; it is remembered
    /// for the next one.
    pub fn load_input(&mut self, opts: LoadOptions) -> Result<&mut Self> {
        let dir = self.pick_dir(opts.input_dir.as_ref(), opts.rel_dir.as_ref())?;
        self.input_dir = dir.clone();
        let dir = dir.as_deref();
        if let Some(dir) = dir {
            tracing::debug!("Loading fixture input from {}", dir.display());
        }

        let content = match opts.content {
            Some(content) => Some(content),
            None => read_text(dir, CONTENT_FILE)?,
        };
        self.content = content.or(self.content.take());

        let failed_content = match opts.failed_content {
            Some(content) => Some(content),
            None => read_text(dir, FAILED_CONTENT_FILE)?,
        };
        self.failed_content = failed_content.or(self.failed_content.take());

        // vars.json must not clobber the vars of an explicitly supplied page
        let page_supplied = opts.page.is_some();
        let vars = match opts.vars {
            Some(vars) => Some(vars),
            None if !page_supplied => read_json(dir, VARS_FILE)?,
            None => None,
        };

        let page = match opts.page {
            Some(page) => Some(page),
            None => read_record(dir, PAGE_FILE)?,
        };
        self.page = page.or(self.page.take());

        if let Some(vars) = vars {
            self.page
                .get_or_insert_with(Record::new)
                .insert("vars".to_string(), vars);
        }

        let pages = match opts.pages {
            Some(pages) => Some(pages),
            None => read_collection(dir, PAGES_FILE)?,
        };
        if let Some(pages) = pages {
            self.save_pages(pages);
        }

        let outputs = match opts.outputs {
            Some(outputs) => Some(outputs),
            None => read_collection(dir, OUTPUTS_FILE)?,
        };
        if let Some(outputs) = outputs {
            self.save_outputs(outputs);
        }

        Ok(self)
    }

    /// Supplied expected records, else the named expected file.
    fn expected_records(
        &self,
        opts: &MatchExpectedOptions,
        file_name: &str,
    ) -> Result<Option<Collection>> {
        if let Some(expected) = &opts.expected {
            return Ok(Some(expected.clone()));
        }
        let dir = self.pick_dir(opts.input_dir.as_ref(), opts.rel_dir.as_ref())?;
        read_collection(dir.as_deref(), file_name)
    }

    /// Load expected pages into `saved_pages`.
    pub fn load_expected_pages(&mut self, opts: &MatchExpectedOptions) -> Result<&mut Self> {
        if let Some(pages) = self.expected_records(opts, EXPECTED_PAGES_FILE)? {
            self.save_pages(pages);
        }
        Ok(self)
    }

    /// Load expected outputs into `saved_outputs`.
    pub fn load_expected_outputs(&mut self, opts: &MatchExpectedOptions) -> Result<&mut Self> {
        if let Some(outputs) = self.expected_records(opts, EXPECTED_OUTPUTS_FILE)? {
            self.save_outputs(outputs);
        }
        Ok(self)
    }

    /// Append pages to `saved_pages`.
    pub fn save_pages(&mut self, pages: Collection) {
        self.saved_pages.extend(pages);
    }

    /// Append outputs to `saved_outputs`.
    pub fn save_outputs(&mut self, outputs: Collection) {
        self.saved_outputs.extend(outputs);
    }

    /// Queue a page the way a scraper would.
    pub fn enqueue_page(&mut self, page: Record) {
        self.pages.push(page);
    }

    /// Queue an output the way a scraper would.
    pub fn enqueue_output(&mut self, output: Record) {
        self.outputs.push(output);
    }

    /// Move queued pages and outputs into the saved collections.
    pub fn flush(&mut self) {
        let pages = std::mem::take(&mut self.pages);
        let outputs = std::mem::take(&mut self.outputs);
        self.save_pages(pages);
        self.save_outputs(outputs);
    }

    /// Expected context sharing this context's root, pointed at the expected
    /// fixture directory.
    fn expected_context(&self, opts: &MatchExpectedOptions) -> (Self, MatchExpectedOptions) {
        let mut expected_opts = opts.clone();
        if expected_opts.input_dir.is_none() && expected_opts.rel_dir.is_none() {
            expected_opts.input_dir = self.input_dir.clone();
        }
        (self.new_context(), expected_opts)
    }

    /// Compare saved pages against the expected pages.
    pub fn match_expected_pages(&self, opts: &MatchExpectedOptions) -> Result<MatchDiff> {
        let (mut expected, expected_opts) = self.expected_context(opts);
        expected.load_expected_pages(&expected_opts)?;

        let skip = merge_skip_fields(
            &opts.skip_fields,
            &DEFAULT_PAGE_SKIP_FIELDS,
            opts.default_skip_fields,
        );
        let result = match_collections(&self.saved_pages, &expected.saved_pages, &skip);
        Ok(MatchDiff {
            matched: result.matched,
            saved: result.diff.unmatched_a,
            expected: result.diff.unmatched_b,
        })
    }

    /// Compare saved outputs against the expected outputs.
    pub fn match_expected_outputs(&self, opts: &MatchExpectedOptions) -> Result<MatchDiff> {
        let (mut expected, expected_opts) = self.expected_context(opts);
        expected.load_expected_outputs(&expected_opts)?;

        let skip = merge_skip_fields(
            &opts.skip_fields,
            &DEFAULT_OUTPUT_SKIP_FIELDS,
            opts.default_skip_fields,
        );
        let result = match_collections(&self.saved_outputs, &expected.saved_outputs, &skip);
        Ok(MatchDiff {
            matched: result.matched,
            saved: result.diff.unmatched_a,
            expected: result.diff.unmatched_b,
        })
    }

    /// Flush, compare pages and print the diff report on mismatch.
    #[track_caller]
    pub fn should_match_pages(&mut self, opts: &MatchExpectedOptions) -> Result<bool> {
        let location = report_location(opts);
        self.flush();
        let diff = self.match_expected_pages(opts)?;
        if !diff.matched {
            print_match_diff("pages", &diff, &location)
                .map_err(|e| FixtureError::write("<stdout>", e))?;
        }
        Ok(diff.matched)
    }

    /// Flush, compare outputs and print the diff report on mismatch.
    #[track_caller]
    pub fn should_match_outputs(&mut self, opts: &MatchExpectedOptions) -> Result<bool> {
        let location = report_location(opts);
        self.flush();
        let diff = self.match_expected_outputs(opts)?;
        if !diff.matched {
            print_match_diff("outputs", &diff, &location)
                .map_err(|e| FixtureError::write("<stdout>", e))?;
        }
        Ok(diff.matched)
    }
}

#[track_caller]
fn report_location(opts: &MatchExpectedOptions) -> CallerLocation {
    match opts.log_caller.as_deref().and_then(CallerLocation::from_stack) {
        Some(location) => location,
        None => CallerLocation::caller(),
    }
}

impl DataSource for FixtureContext {
    fn get_content(&self, _gid: &str) -> Result<Option<String>> {
        Ok(self.content.clone())
    }

    fn get_failed_content(&self, _gid: &str) -> Result<Option<String>> {
        Ok(self.failed_content.clone())
    }

    fn init_page(&self, gid: &str, job_id: Option<JobId>) -> Result<Record> {
        let mut page = self.page.clone().unwrap_or_default();
        page.entry("gid").or_insert_with(|| Value::from(gid));
        if let Some(job_id) = job_id {
            page.entry("job_id").or_insert_with(|| Value::from(job_id));
        }
        Ok(page)
    }

    fn find_outputs(
        &self,
        collection: &str,
        query: &Record,
        page: usize,
        per_page: usize,
        _opts: &Record,
    ) -> Result<Collection> {
        let partial = MatchOptions::partial();
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        Ok(self
            .saved_outputs
            .iter()
            .filter(|output| {
                let name = output
                    .get("_collection")
                    .and_then(Value::as_str)
                    .unwrap_or("default");
                name == collection && matches(output, query, &partial)
            })
            .skip(skip)
            .take(per_page)
            .cloned()
            .collect())
    }

    fn get_job_id(&self, _scraper_name: &str) -> Result<Option<JobId>> {
        Ok(self
            .page
            .as_ref()
            .and_then(|page| page.get("job_id"))
            .and_then(Value::as_u64))
    }
}
