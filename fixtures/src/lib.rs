//! # Replay Fixtures
//!
//! Record scraper inputs from a data source into fixture directories, replay
//! them through a mock context and check what the scraper saved against the
//! expected fixtures.
//!
//! A fixture directory looks like this:
//!
//! ```text
//! fixtures/product_page/
//!   content                 raw page body
//!   failed_content          raw body of a failed fetch
//!   page.json               page definition
//!   vars.json               page vars
//!   pages.json              pages already saved
//!   outputs.json            outputs already saved
//!   expected_pages.json     pages the scraper should save
//!   expected_outputs.json   outputs the scraper should save
//! ```
//!
//! Every file is optional.
//!
//! ```rust,no_run
//! use replay_fixtures::{FixtureContext, LoadOptions, MatchExpectedOptions};
//! use serde_json::json;
//!
//! # fn main() -> replay_fixtures::Result<()> {
//! let mut context = FixtureContext::with_root("fixtures");
//! context.load_input(LoadOptions::from_rel_dir("product_page"))?;
//!
//! // run the scraper against `context`, it enqueues what it extracts
//! let output = replay_engine::to_record(&json!({"title": "Blue shoes"}))?;
//! context.enqueue_output(output);
//!
//! assert!(context.should_match_outputs(&MatchExpectedOptions::default())?);
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod config;
pub mod context;
pub mod error;
pub mod files;
pub mod mode;
pub mod recorder;
pub mod source;

pub use check::{check_fixture, check_fixtures, CheckSummary};
pub use config::{Config, ConfigError, OutputFilter, RecordFilters, RecordMap};
pub use context::{FixtureContext, LoadOptions, MatchExpectedOptions};
pub use error::{FixtureError, Result};
pub use mode::{disable_test_mode, enable_test_mode, is_test_mode};
pub use recorder::Recorder;
pub use source::{DataSource, JobId, OUTPUTS_PER_PAGE};
