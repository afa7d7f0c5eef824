use crate::model::{SourceError, TimeSeriesTable};

/// Trailing window used for the initial snapshot and every polling cycle.
pub const RECENT_TIMEFRAME: &str = "now 7-d";

pub trait SeriesSource: Send + Sync {
    /// Full-range historical fetch for `timeframe`.
    fn fetch_series(&self, keywords: &[String], timeframe: &str) -> Result<TimeSeriesTable, SourceError>;

    /// Fetch of the fixed trailing 7-day window.
    fn fetch_recent_series(&self, keywords: &[String]) -> Result<TimeSeriesTable, SourceError> {
        self.fetch_series(keywords, RECENT_TIMEFRAME)
    }
}
