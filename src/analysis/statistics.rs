//! Statistical tests for byte-sample quality.
//!
//! Every test here works from a [`Histogram`] rather than the raw bytes.
//! For byte-valued data the histogram is a sufficient statistic for all
//! three tests, so results are exact and independent of sample order.

use super::{
    analyzer::AnalysisError,
    sample::{Histogram, BINS},
};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::f64::consts::PI;

/// Floor added to every bin count before normalizing, so empty bins
/// contribute a near-zero probability instead of `log2(0)`.
pub const SMOOTHING_BIAS: f64 = 1e-10;

/// Maximum entropy of a byte-valued distribution, in bits.
pub const MAX_ENTROPY_BITS: f64 = 8.0;

/// Degrees of freedom of the 256-bin goodness-of-fit test.
pub const CHI_SQUARE_DOF: f64 = (BINS - 1) as f64;

/// Number of terms evaluated in the Kolmogorov series.
const KOLMOGOROV_TERMS: u32 = 100;

/// Outcome of the chi-square goodness-of-fit test against uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    /// Sum of `(observed - expected)^2 / expected` over all bins.
    pub statistic: f64,
    /// Survival function of chi-square(255) at `statistic`.
    pub p_value: f64,
    /// Expected count per bin under uniformity (`N / 256`).
    pub expected_per_bin: f64,
}

/// Outcome of the two-sided Kolmogorov-Smirnov test against uniform(0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Maximum absolute distance between the empirical and uniform CDFs.
    pub statistic: f64,
    /// Asymptotic p-value from the Kolmogorov distribution.
    pub p_value: f64,
}

/// Shannon entropy of the smoothed empirical distribution, in bits.
///
/// Returns a value in `[0, 8]`.
pub fn shannon_entropy_bits(hist: &Histogram) -> Result<f64, AnalysisError> {
    if hist.total() == 0 {
        return Err(AnalysisError::InvalidSample(
            "cannot estimate entropy of an empty sample".into(),
        ));
    }

    let total = hist.total() as f64 + SMOOTHING_BIAS * BINS as f64;
    let entropy: f64 = hist
        .counts()
        .iter()
        .map(|&c| {
            let p = (c as f64 + SMOOTHING_BIAS) / total;
            -p * p.log2()
        })
        .sum();

    ensure_finite("entropy", entropy)?;
    Ok(entropy.clamp(0.0, MAX_ENTROPY_BITS))
}

/// Chi-square goodness-of-fit of the histogram against the uniform distribution.
pub fn chi_square_uniform(hist: &Histogram) -> Result<ChiSquareTest, AnalysisError> {
    if hist.total() == 0 {
        return Err(AnalysisError::InvalidSample(
            "cannot test an empty sample against uniform".into(),
        ));
    }

    let expected = hist.total() as f64 / BINS as f64;
    let statistic: f64 = hist
        .counts()
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    ensure_finite("chi-square statistic", statistic)?;

    let dist = ChiSquared::new(CHI_SQUARE_DOF)
        .map_err(|e| AnalysisError::InvalidSample(format!("chi-square distribution: {e}")))?;
    let p_value = dist.sf(statistic);
    ensure_finite("chi-square p-value", p_value)?;

    Ok(ChiSquareTest {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        expected_per_bin: expected,
    })
}

/// Two-sided Kolmogorov-Smirnov test of `value / 255` against uniform(0, 1).
///
/// The sorted-sample formula `D+ = max(i/N - x_i)`, `D- = max(x_i - (i-1)/N)`
/// is evaluated over runs of equal values, which is where both maxima occur.
pub fn ks_uniform(hist: &Histogram) -> Result<KsTest, AnalysisError> {
    if hist.total() == 0 {
        return Err(AnalysisError::InvalidSample(
            "cannot compute an empirical CDF of an empty sample".into(),
        ));
    }

    let n = hist.total() as f64;
    let mut cumulative = 0u64;
    let mut d_plus = 0.0f64;
    let mut d_minus = 0.0f64;

    for (value, &count) in hist.counts().iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x = value as f64 / 255.0;
        let before = cumulative as f64 / n;
        cumulative += count;
        let after = cumulative as f64 / n;

        d_plus = d_plus.max(after - x);
        d_minus = d_minus.max(x - before);
    }

    let statistic = d_plus.max(d_minus);
    let p_value = kolmogorov_sf(n.sqrt() * statistic);
    ensure_finite("KS p-value", p_value)?;

    Ok(KsTest {
        statistic,
        p_value,
    })
}

/// Survival function of the Kolmogorov distribution, `P(K > lambda)`.
///
/// Uses the Jacobi theta form of the CDF for small `lambda`, where the
/// alternating series converges slowly, and the alternating series otherwise.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }

    let p = if lambda < 1.18 {
        let factor = -PI * PI / (8.0 * lambda * lambda);
        let mut cdf = 0.0;
        for k in 1..=KOLMOGOROV_TERMS {
            let odd = (2 * k - 1) as f64;
            let term = (factor * odd * odd).exp();
            cdf += term;
            if term < 1e-17 {
                break;
            }
        }
        1.0 - (2.0 * PI).sqrt() / lambda * cdf
    } else {
        let mut sum = 0.0;
        for k in 1..=KOLMOGOROV_TERMS {
            let kf = k as f64;
            let term = (-2.0 * kf * kf * lambda * lambda).exp();
            sum += if k % 2 == 1 { term } else { -term };
            if term < 1e-17 {
                break;
            }
        }
        2.0 * sum
    };

    p.clamp(0.0, 1.0)
}

fn ensure_finite(what: &str, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::InvalidSample(format!(
            "{what} is not finite ({value})"
        )))
    }
}
