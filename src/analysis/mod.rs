//! Randomness quality analysis.
//!
//! Turns a byte sample into a fixed bundle of statistics: Shannon entropy,
//! chi-square goodness-of-fit and the Kolmogorov-Smirnov distance to
//! uniform. These measure distributional quality only; passing them says
//! nothing about unpredictability.

mod analyzer;
mod sample;
mod statistics;
mod threshold;

pub use analyzer::{AnalysisError, MetricBundle, QualityAnalyzer};
pub use sample::{ByteSample, Histogram, BINS};
pub use statistics::{
    chi_square_uniform, kolmogorov_sf, ks_uniform, shannon_entropy_bits, ChiSquareTest, KsTest,
    MAX_ENTROPY_BITS, SMOOTHING_BIAS,
};
pub use threshold::{Advisory, AnalyzerConfig};
