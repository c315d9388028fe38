//! Reporting: formatted terminal output for fits, critical times, and errors.
//!
//! Formatting stays in one place so the math/fitting code stays clean and
//! output changes are localized.

pub mod format;

pub use format::{
    format_critical_times, format_data_summary, format_error_report, format_run_summary,
};

/// Where the analyzed series came from, for the run header.
#[derive(Debug, Clone)]
pub enum SourceNote {
    Csse {
        n_regions: usize,
        population: u64,
        row_errors: usize,
    },
    Sample {
        seed: u64,
        noise_sd: f64,
    },
}
