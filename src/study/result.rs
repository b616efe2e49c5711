//! Run results handed to the presentation layer.

use super::StudyError;
use crate::analysis::MetricBundle;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome for one source: its bundle, or the cause of its absence.
pub type SourceOutcome = Result<MetricBundle, StudyError>;

/// One source's slot in a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunEntry {
    /// Source identifier.
    pub id: String,
    /// Display label from the registry (the id when unregistered).
    pub label: String,
    /// Metric bundle or failure cause.
    pub outcome: SourceOutcome,
}

/// Results of one run, in source selection order.
///
/// Read-only once built; the next run replaces it wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    started_at: DateTime<Utc>,
    sample_size: usize,
    entries: Vec<RunEntry>,
}

impl ResultSet {
    pub(crate) fn new(started_at: DateTime<Utc>, sample_size: usize, entries: Vec<RunEntry>) -> Self {
        Self {
            started_at,
            sample_size,
            entries,
        }
    }

    /// When the run started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Requested sample size per source.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// All slots in selection order.
    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// Looks up the outcome for a source.
    pub fn get(&self, id: &str) -> Option<&SourceOutcome> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.outcome)
    }

    /// Looks up the bundle for a source, if it succeeded.
    pub fn bundle(&self, id: &str) -> Option<&MetricBundle> {
        self.get(id).and_then(|o| o.as_ref().ok())
    }

    /// Successful sources with their bundles.
    pub fn bundles(&self) -> impl Iterator<Item = (&str, &MetricBundle)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|b| (e.id.as_str(), b)))
    }

    /// Failed sources with their causes.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &StudyError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (e.id.as_str(), err)))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the run had no sources.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
