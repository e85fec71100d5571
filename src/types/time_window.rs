//! The UTC observation period shared by every per-station request in a run.

use chrono::{DateTime, Utc};

/// Inclusive-start, exclusive-end UTC period for which observations are
/// requested.
///
/// A window is fixed for the whole run; every station request carries the
/// same bounds, broken into the year/month/day/hour/minute fields the
/// observation endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Query-string fragment carrying the window bounds, in the field layout
    /// of the `1min_dl` endpoint.
    pub fn query_fragment(&self) -> String {
        format!(
            "{}&{}",
            self.start.format("year1=%Y&month1=%m&day1=%d&hour1=%H&minute1=%M"),
            self.end.format("year2=%Y&month2=%m&day2=%d&hour2=%H&minute2=%M"),
        )
    }

    /// Compact `YYYYMMDDHHMM_YYYYMMDDHHMM` stamp used in artifact names.
    pub fn file_stamp(&self) -> String {
        format!(
            "{}_{}",
            self.start.format("%Y%m%d%H%M"),
            self.end.format("%Y%m%d%H%M")
        )
    }
}
