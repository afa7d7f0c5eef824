pub mod analyzer;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod service;
pub mod source;
pub mod storage;
pub mod utils;

pub use analyzer::Analyzer;
pub use model::{Extrema, TimeSeriesTable};
pub use normalizer::Columns;
pub use service::{CancellationToken, PollSettings, PollingService, ServiceState};
