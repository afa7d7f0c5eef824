// Analyzer module: numeric kernels and the table-bound analysis engine.

pub mod indicators;
pub mod series_analysis;

// Re-export the main Analyzer implementation for ease of use.
pub use series_analysis::{derived_name, Analyzer};
