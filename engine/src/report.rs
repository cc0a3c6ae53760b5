//! Human readable mismatch reports.
//!
//! Reports point back at the test that asked for the comparison:
//!
//! ```text
//! tests/scraper.rs:42 - Non matching saved outputs: [{"_id":"o3"}]
//! ```

use crate::Collection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;

/// Source position a report is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerLocation {
    pub file: String,
    pub line: String,
}

impl CallerLocation {
    pub fn new(file: impl Into<String>, line: impl ToString) -> Self {
        Self {
            file: file.into(),
            line: line.to_string(),
        }
    }

    /// Location of whoever called the function this is used in.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    /// Parse a call-stack frame such as `src/lib.rs:12:5`.
    ///
    /// Only the first two `:` separated parts are used; anything after the
    /// line (column, function name) is dropped.
    pub fn from_frame(frame: &str) -> Self {
        let mut parts = frame.split(':');
        let file = parts.next().unwrap_or_default();
        let line = parts.next().unwrap_or_default();
        Self::new(file, line)
    }

    /// Location from the first frame of a stack snapshot, when there is one.
    pub fn from_stack<S: AsRef<str>>(stack: &[S]) -> Option<Self> {
        stack.first().map(|frame| Self::from_frame(frame.as_ref()))
    }
}

impl From<&Location<'_>> for CallerLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Unmatched records on each side of a saved-versus-expected comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchDiff {
    pub matched: bool,
    /// Saved records with no expected counterpart
    pub saved: Collection,
    /// Expected records with no saved counterpart
    pub expected: Collection,
}

/// Write one report line: `\n<file>:<line> - <message><data>\n\n`.
///
/// Missing data renders as `nil`.
pub fn verbose_log<W: Write + ?Sized>(
    out: &mut W,
    location: &CallerLocation,
    message: &str,
    data: Option<&Value>,
) -> io::Result<()> {
    let text = match data {
        Some(value) => value.to_string(),
        None => "nil".to_string(),
    };
    write!(out, "\n{location} - {message}{text}\n\n")
}

/// Write the report lines for every non-empty side of a diff.
pub fn verbose_match_diff<W: Write + ?Sized>(
    out: &mut W,
    label: &str,
    diff: &MatchDiff,
    location: &CallerLocation,
) -> io::Result<()> {
    let sides = [("saved", &diff.saved), ("expected", &diff.expected)];
    for (side, records) in sides {
        if records.is_empty() {
            continue;
        }
        let data = Value::Array(records.iter().cloned().map(Value::Object).collect());
        let message = format!("Non matching {side} {label}: ");
        verbose_log(out, location, &message, Some(&data))?;
    }
    Ok(())
}

/// Print the report for a diff to standard output.
pub fn print_match_diff(
    label: &str,
    diff: &MatchDiff,
    location: &CallerLocation,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    verbose_match_diff(&mut handle, label, diff, location)?;
    handle.flush()
}
