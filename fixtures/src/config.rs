//! Configuration for recording and checking fixtures.

use crate::source::JobId;
use replay_engine::Record;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Filter used to pull outputs from the platform when recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFilter {
    /// Output collection name (default `"default"`)
    pub collection: String,
    /// Query the outputs must match
    pub query: Record,
    /// Extra options passed through to `find_outputs`
    pub opts: Record,
}

impl Default for OutputFilter {
    fn default() -> Self {
        Self {
            collection: "default".to_string(),
            query: Record::new(),
            opts: Record::new(),
        }
    }
}

impl OutputFilter {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: Record) -> Self {
        self.query = query;
        self
    }
}

/// Filters applied while recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilters {
    /// Outputs are only recorded when this is set
    pub outputs: Option<OutputFilter>,
}

/// One entry of an input map: which page to record into which directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordMap {
    /// Page gid to record
    pub gid: String,
    /// Target directory, relative to the recorder root when one is set
    pub dir: String,
    /// Write `content` (default `true`)
    pub record_content: bool,
    /// Write `failed_content` (default `true`)
    pub record_failed_content: bool,
    /// Write `page.json` (default `true`)
    pub record_page: bool,
    /// Write `vars.json` (default `false`)
    pub record_vars: bool,
    pub filters: RecordFilters,
}

impl Default for RecordMap {
    fn default() -> Self {
        Self {
            gid: String::new(),
            dir: String::new(),
            record_content: true,
            record_failed_content: true,
            record_page: true,
            record_vars: false,
            filters: RecordFilters::default(),
        }
    }
}

impl RecordMap {
    pub fn new(gid: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            gid: gid.into(),
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_outputs(mut self, filter: OutputFilter) -> Self {
        self.filters.outputs = Some(filter);
        self
    }
}

/// Settings loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding one sub-directory per fixture
    pub fixtures_root: PathBuf,
    /// Scraper whose latest job is recorded when no job id is given
    pub scraper_name: Option<String>,
    /// Job to record pages from
    pub job_id: Option<JobId>,
    /// Enable the process-wide test mode flag on startup
    pub test_mode: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fixtures_root = env::var("REPLAY_FIXTURES_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("fixtures"));

        let scraper_name = env::var("REPLAY_SCRAPER_NAME")
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let job_id = match env::var("REPLAY_JOB_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidJobId(raw.clone()))?,
            ),
            _ => None,
        };

        let test_mode = match env::var("REPLAY_TEST_MODE") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidTestMode(raw))?,
            Err(_) => true,
        };

        Ok(Self {
            fixtures_root,
            scraper_name,
            job_id,
            test_mode,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid REPLAY_JOB_ID value: {0}")]
    InvalidJobId(String),

    #[error("Invalid REPLAY_TEST_MODE value: {0}")]
    InvalidTestMode(String),
}
