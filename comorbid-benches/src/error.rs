//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of `.expect()`.

use comorbid_core::SearchError;

use crate::synthetic::SyntheticError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic cohort generation failed.
    #[error("synthetic cohort generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Search configuration was rejected.
    #[error("search configuration failed: {0}")]
    Search(#[from] SearchError),
}
