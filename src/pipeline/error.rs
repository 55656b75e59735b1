//! Domain errors for the scorecard pipeline.
//!
//! These cover the failure modes that must never be silently ignored:
//! training populations too small to bin, statistics that would be
//! undefined without smoothing, and fitting steps that receive data
//! from outside their designated training window.

use thiserror::Error;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A variable's training population cannot form the minimum number of
    /// bins under the minimum-population constraint.
    #[error(
        "insufficient data for '{variable}': {rows} training rows cannot form \
         {min_bins} bins of at least {min_rows} rows each"
    )]
    InsufficientData {
        variable: String,
        rows: usize,
        min_bins: usize,
        min_rows: usize,
    },

    /// A WoE or PSI computation hit a zero count with smoothing disabled.
    #[error("undefined statistic in {context}: {detail} (configure a nonzero smoothing constant)")]
    UndefinedStatistic { context: String, detail: String },

    /// A fitting step was handed rows from a cohort later than its
    /// designated training window.
    #[error(
        "leakage violation in {stage}: training window ends at safra '{window_end}' \
         but received rows from safra '{offending}'"
    )]
    LeakageViolation {
        stage: String,
        window_end: String,
        offending: String,
    },

    /// A required column is absent from the dataset.
    #[error("required column '{0}' not found in dataset")]
    MissingColumn(String),

    /// The target column contains values other than 0 and 1.
    #[error("target column '{column}' must be binary 0/1: {detail}")]
    NonBinaryTarget { column: String, detail: String },

    /// The id column contains repeated values.
    #[error("id column '{column}' contains {duplicates} duplicated values")]
    DuplicateIds { column: String, duplicates: usize },
}
