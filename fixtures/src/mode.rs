//! Process-wide test mode flag.
//!
//! Scrapers running against a [`FixtureContext`](crate::FixtureContext) can
//! check this flag to avoid touching the real platform. It defaults to off.

use std::sync::atomic::{AtomicBool, Ordering};

static TEST_MODE: AtomicBool = AtomicBool::new(false);

/// Turn test mode on.
pub fn enable_test_mode() {
    TEST_MODE.store(true, Ordering::SeqCst);
}

/// Turn test mode off.
pub fn disable_test_mode() {
    TEST_MODE.store(false, Ordering::SeqCst);
}

/// Whether test mode is on.
pub fn is_test_mode() -> bool {
    TEST_MODE.load(Ordering::SeqCst)
}
