//! Comparative runs over several sources.
//!
//! A run produces one sample per selected source, analyzes each sample in
//! isolation and collects the outcomes into a [`ResultSet`]. Failures are
//! recorded against the failing source; they never abort the run.

mod result;
mod runner;

pub use result::{ResultSet, RunEntry, SourceOutcome};
pub use runner::{RunRequest, Study, DEFAULT_SAMPLE_SIZE};

use crate::analysis::AnalysisError;
use crate::sources::SourceError;
use serde::Serialize;
use thiserror::Error;

/// Why a source has no metric bundle in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "stage", content = "error", rename_all = "snake_case")]
pub enum StudyError {
    /// The source could not produce a sample.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The sample could not be analyzed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The provider panicked while producing.
    #[error("worker for source {0} panicked")]
    Panicked(String),
}

/// Errors that prevent a run from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// No source was selected.
    #[error("select at least one source")]
    EmptySelection,
}
