//! Data access to the scraping platform.
//!
//! The recorder only talks to the platform through [`DataSource`]. Any
//! client of the real platform can implement it; [`FixtureContext`] does too,
//! so fixtures already on disk can be re-recorded elsewhere.
//!
//! [`FixtureContext`]: crate::FixtureContext

use crate::error::Result;
use replay_engine::{Collection, Record};

/// Job identifier on the scraping platform.
pub type JobId = u64;

/// Number of outputs fetched per page when recording.
pub const OUTPUTS_PER_PAGE: usize = 100;

/// Read access to pages, contents and outputs of the scraping platform.
pub trait DataSource {
    /// Raw content fetched for a page.
    fn get_content(&self, gid: &str) -> Result<Option<String>>;

    /// Raw content of a failed fetch for a page.
    fn get_failed_content(&self, gid: &str) -> Result<Option<String>>;

    /// Page definition; the job page when a job id is given, the global page
    /// otherwise.
    fn init_page(&self, gid: &str, job_id: Option<JobId>) -> Result<Record>;

    /// One page of outputs. `page` starts at 1; an empty result means there
    /// are no more outputs.
    fn find_outputs(
        &self,
        collection: &str,
        query: &Record,
        page: usize,
        per_page: usize,
        opts: &Record,
    ) -> Result<Collection>;

    /// Latest job id of a scraper.
    fn get_job_id(&self, _scraper_name: &str) -> Result<Option<JobId>> {
        Ok(None)
    }
}
