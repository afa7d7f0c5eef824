pub mod fetcher;
pub mod traits;

pub use fetcher::HttpSeriesSource;
pub use traits::{SeriesSource, RECENT_TIMEFRAME};
