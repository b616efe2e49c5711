//! Metrics collection and registry.

use crate::study::ResultSet;
use prometheus::{Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

const SOURCE_LABEL: &[&str] = &["source"];

/// Prometheus metrics registry for source comparison runs.
///
/// Gauges hold the values of the most recent run for each source.
pub struct MetricsRegistry {
    registry: Registry,

    // Statistical test metrics
    entropy_bits: GaugeVec,
    chi_square_statistic: GaugeVec,
    chi_square_p_value: GaugeVec,
    ks_statistic: GaugeVec,
    ks_p_value: GaugeVec,
    analysis_seconds: GaugeVec,

    // Run metrics
    runs_total: IntCounter,
    source_failures_total: IntCounterVec,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all run metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let gauge = |name: &str, help: &str| GaugeVec::new(Opts::new(name, help), SOURCE_LABEL);

        let entropy_bits = gauge(
            "rng_study_entropy_bits",
            "Shannon entropy estimate in bits per byte",
        )?;
        let chi_square_statistic = gauge(
            "rng_study_chi_square_statistic",
            "Chi-square statistic against uniform byte distribution",
        )?;
        let chi_square_p_value = gauge(
            "rng_study_chi_square_p_value",
            "Chi-square p-value (255 degrees of freedom)",
        )?;
        let ks_statistic = gauge(
            "rng_study_ks_statistic",
            "Kolmogorov-Smirnov statistic against uniform(0,1)",
        )?;
        let ks_p_value = gauge(
            "rng_study_ks_p_value",
            "Kolmogorov-Smirnov asymptotic p-value",
        )?;
        let analysis_seconds = gauge(
            "rng_study_analysis_seconds",
            "Wall-clock time spent computing statistics",
        )?;

        let runs_total = IntCounter::new("rng_study_runs_total", "Total comparison runs")?;
        let source_failures_total = IntCounterVec::new(
            Opts::new(
                "rng_study_source_failures_total",
                "Runs in which a source produced no metric bundle",
            ),
            SOURCE_LABEL,
        )?;

        // Register all metrics
        registry.register(Box::new(entropy_bits.clone()))?;
        registry.register(Box::new(chi_square_statistic.clone()))?;
        registry.register(Box::new(chi_square_p_value.clone()))?;
        registry.register(Box::new(ks_statistic.clone()))?;
        registry.register(Box::new(ks_p_value.clone()))?;
        registry.register(Box::new(analysis_seconds.clone()))?;
        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(source_failures_total.clone()))?;

        Ok(Self {
            registry,
            entropy_bits,
            chi_square_statistic,
            chi_square_p_value,
            ks_statistic,
            ks_p_value,
            analysis_seconds,
            runs_total,
            source_failures_total,
        })
    }

    /// Records a completed run.
    pub fn update(&self, results: &ResultSet) {
        self.runs_total.inc();

        for (id, bundle) in results.bundles() {
            let labels = &[id];
            self.entropy_bits
                .with_label_values(labels)
                .set(bundle.entropy_bits);
            self.chi_square_statistic
                .with_label_values(labels)
                .set(bundle.chi_square_statistic);
            self.chi_square_p_value
                .with_label_values(labels)
                .set(bundle.chi_square_p_value);
            self.ks_statistic
                .with_label_values(labels)
                .set(bundle.ks_statistic);
            self.ks_p_value.with_label_values(labels).set(bundle.ks_p_value);
            self.analysis_seconds
                .with_label_values(labels)
                .set(bundle.elapsed_seconds);
        }

        for (id, _) in results.failures() {
            self.source_failures_total.with_label_values(&[id]).inc();
            // Stale values from an earlier run would misrepresent this one
            for gauge in [
                &self.entropy_bits,
                &self.chi_square_statistic,
                &self.chi_square_p_value,
                &self.ks_statistic,
                &self.ks_p_value,
                &self.analysis_seconds,
            ] {
                let _ = gauge.remove_label_values(&[id]);
            }
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QualityAnalyzer;
    use crate::sources::{ByteSource, ProviderError, SourceRegistry};
    use crate::study::{RunRequest, Study};

    struct Constant;

    impl ByteSource for Constant {
        fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError> {
            Ok(vec![0u8; size])
        }
    }

    fn run() -> ResultSet {
        let mut registry = SourceRegistry::default();
        registry.register("zero", "Zero", Box::new(Constant));
        Study::new(registry, QualityAnalyzer::default())
            .run(&RunRequest::new(["zero", "missing"], 10_000))
            .unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&run());

        let output = registry.encode().unwrap();
        assert!(output.contains("rng_study_runs_total 1"));
        assert!(output.contains("rng_study_entropy_bits{source=\"zero\"}"));
        assert!(output.contains("rng_study_ks_statistic{source=\"zero\"} 1"));
        assert!(output.contains("rng_study_source_failures_total{source=\"missing\"} 1"));
        assert!(!output.contains("rng_study_entropy_bits{source=\"missing\"}"));
    }

    #[test]
    fn test_counters_accumulate() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&run());
        registry.update(&run());

        let output = registry.encode().unwrap();
        assert!(output.contains("rng_study_runs_total 2"));
        assert!(output.contains("rng_study_source_failures_total{source=\"missing\"} 2"));
    }
}
