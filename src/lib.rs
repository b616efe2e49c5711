//! RNG Comparative Study Library
//!
//! Compares randomness sources by drawing a fixed-size byte sample from
//! each and scoring its statistical quality.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! sources (registry) → analysis (per sample) → study (result set)
//!                                                   ↓
//!                                      report / metrics (presentation)
//! ```
//!
//! # Design Principles
//!
//! - **Stateless analysis**: every statistic is a pure function of the sample
//! - **Per-source failure**: an unavailable source never aborts a run
//! - **Bounded waits**: blocking entropy devices are read under a timeout and
//!   can be cancelled
//! - **No cryptographic claims**: distributional tests cannot detect predictability
//!
//! # Example
//!
//! ```no_run
//! use rng_study::{
//!     CancelToken, QualityAnalyzer, RunRequest, SourceRegistry, SourcesConfig, Study,
//! };
//!
//! let registry = SourceRegistry::from_config(&SourcesConfig::default(), &CancelToken::new());
//! let study = Study::new(registry, QualityAnalyzer::default());
//!
//! let request = RunRequest::new(["prng", "csprng", "urandom", "random"], 10_000).parallel(true);
//! let results = study.run(&request).unwrap();
//!
//! for (id, bundle) in results.bundles() {
//!     println!("{id}: {:.4} bits", bundle.entropy_bits);
//! }
//! for (id, cause) in results.failures() {
//!     println!("{id}: {cause}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod metrics;
pub mod report;
pub mod sources;
pub mod study;

// Re-export commonly used types at crate root
pub use analysis::{
    AnalysisError, AnalyzerConfig, ByteSample, Histogram, MetricBundle, QualityAnalyzer,
};
pub use config::{ConfigError, FileConfig};
pub use sources::{
    ByteSource, CancelToken, SourceError, SourceKind, SourceRegistry, SourcesConfig,
};
pub use study::{ResultSet, RunError, RunRequest, Study, StudyError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
