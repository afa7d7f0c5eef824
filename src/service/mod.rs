// Service module: cancellable background polling over the analyzer.

pub mod backoff;
pub mod cancellation;
pub mod polling;

pub use cancellation::CancellationToken;
pub use polling::{run_analysis, PollSettings, PollingService, ServiceState, DEFAULT_POLL_INTERVAL};
