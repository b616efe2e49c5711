//! Prometheus metrics exporter for comparison runs.
//!
//! # Metrics Exposed
//!
//! ## Per-source statistics (label `source`, values of the latest run)
//! - `rng_study_entropy_bits` - Shannon entropy estimate in bits per byte
//! - `rng_study_chi_square_statistic` - Chi-square statistic against uniform
//! - `rng_study_chi_square_p_value` - Chi-square p-value
//! - `rng_study_ks_statistic` - Kolmogorov-Smirnov statistic
//! - `rng_study_ks_p_value` - Kolmogorov-Smirnov p-value
//! - `rng_study_analysis_seconds` - Time spent computing the statistics
//!
//! ## Run metrics
//! - `rng_study_runs_total` - Total runs recorded
//! - `rng_study_source_failures_total` - Runs in which a source failed, per source
//!
//! # Example
//!
//! ```no_run
//! use rng_study::{
//!     metrics::MetricsRegistry,
//!     CancelToken, QualityAnalyzer, RunRequest, SourceRegistry, SourcesConfig, Study,
//! };
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let study = Study::new(
//!     SourceRegistry::from_config(&SourcesConfig::default(), &CancelToken::new()),
//!     QualityAnalyzer::default(),
//! );
//!
//! let results = study.run(&RunRequest::new(["prng", "csprng"], 10_000)).unwrap();
//! registry.update(&results);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
