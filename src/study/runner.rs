//! Run orchestration.

use super::{ResultSet, RunEntry, RunError, SourceOutcome, StudyError};
use crate::analysis::QualityAnalyzer;
use crate::sources::SourceRegistry;
use chrono::Utc;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Default sample size per source.
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// A request for one comparative run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Source identifiers, in report order.
    pub sources: Vec<String>,
    /// Bytes to draw from each source.
    pub sample_size: usize,
    /// Sample and analyze sources on separate threads.
    pub parallel: bool,
}

impl RunRequest {
    /// Creates a sequential request for the given sources.
    pub fn new<I, S>(sources: I, sample_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            sample_size,
            parallel: false,
        }
    }

    /// Enables or disables per-source threads.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Source identifiers with duplicates removed, first occurrence kept.
    fn unique_sources(&self) -> Vec<&str> {
        let mut unique: Vec<&str> = Vec::with_capacity(self.sources.len());
        for id in &self.sources {
            if unique.contains(&id.as_str()) {
                tracing::warn!(source = %id, "Duplicate source in request ignored");
                continue;
            }
            unique.push(id.as_str());
        }
        unique
    }
}

/// Drives sources and the analyzer through comparative runs.
pub struct Study {
    registry: SourceRegistry,
    analyzer: QualityAnalyzer,
}

impl Study {
    /// Creates a study over `registry`, scoring samples with `analyzer`.
    pub fn new(registry: SourceRegistry, analyzer: QualityAnalyzer) -> Self {
        Self { registry, analyzer }
    }

    /// Returns the source registry.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Returns the analyzer.
    pub fn analyzer(&self) -> &QualityAnalyzer {
        &self.analyzer
    }

    /// Produces and analyzes one sample.
    pub fn evaluate(&self, id: &str, size: usize) -> SourceOutcome {
        let sample = self.registry.produce(id, size)?;
        Ok(self.analyzer.analyze(&sample)?)
    }

    /// Executes a full run.
    ///
    /// Every selected source gets exactly one slot in the result, holding
    /// either its metric bundle or the reason it has none.
    pub fn run(&self, request: &RunRequest) -> Result<ResultSet, RunError> {
        let sources = request.unique_sources();
        if sources.is_empty() {
            return Err(RunError::EmptySelection);
        }

        let started_at = Utc::now();
        tracing::info!(
            sources = sources.len(),
            sample_size = request.sample_size,
            parallel = request.parallel,
            "Starting run"
        );

        let outcomes: Vec<SourceOutcome> = if request.parallel && sources.len() > 1 {
            self.evaluate_parallel(&sources, request.sample_size)
        } else {
            sources
                .iter()
                .map(|&id| self.evaluate_contained(id, request.sample_size))
                .collect()
        };

        let entries: Vec<RunEntry> = sources
            .into_iter()
            .zip(outcomes)
            .map(|(id, outcome)| {
                match &outcome {
                    Ok(bundle) => tracing::info!(
                        source = id,
                        entropy_bits = bundle.entropy_bits,
                        chi_square_p = bundle.chi_square_p_value,
                        ks_p = bundle.ks_p_value,
                        elapsed_s = bundle.elapsed_seconds,
                        "Source analyzed"
                    ),
                    Err(e) => tracing::warn!(source = id, error = %e, "Source skipped"),
                }
                RunEntry {
                    id: id.to_string(),
                    label: self.registry.label(id).unwrap_or(id).to_string(),
                    outcome,
                }
            })
            .collect();

        Ok(ResultSet::new(started_at, request.sample_size, entries))
    }

    /// Runs [`evaluate`](Self::evaluate) on the calling thread, recording a
    /// provider panic as that source's failure.
    fn evaluate_contained(&self, id: &str, size: usize) -> SourceOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(id, size)))
            .unwrap_or_else(|_| Err(StudyError::Panicked(id.to_string())))
    }

    /// One scoped thread per source; each writes only its own slot, and
    /// slots are read after every thread has joined.
    fn evaluate_parallel(&self, sources: &[&str], size: usize) -> Vec<SourceOutcome> {
        thread::scope(|s| {
            let handles: Vec<_> = sources
                .iter()
                .map(|&id| (id, s.spawn(move || self.evaluate(id, size))))
                .collect();

            handles
                .into_iter()
                .map(|(id, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(StudyError::Panicked(id.to_string())))
                })
                .collect()
        })
    }
}
