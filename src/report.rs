//! Plain-text presentation of a [`ResultSet`].
//!
//! Nothing in the analysis core depends on this module.

use crate::study::ResultSet;
use std::fmt::Write;

/// Renders one block per source with time, entropy, chi-square and K-S lines.
pub fn render_text(results: &ResultSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Run started {} ({} bytes per source)\n",
        results.started_at().format("%Y-%m-%d %H:%M:%S UTC"),
        results.sample_size()
    );

    for entry in results.entries() {
        let _ = writeln!(out, "--- {} ---", entry.label);
        match &entry.outcome {
            Ok(bundle) => {
                let _ = writeln!(out, "Time taken: {:.4} sec", bundle.elapsed_seconds);
                let _ = writeln!(out, "Entropy: {:.4} bits", bundle.entropy_bits);
                let _ = writeln!(
                    out,
                    "Chi-square: {:.2}, p-value={:.4}",
                    bundle.chi_square_statistic, bundle.chi_square_p_value
                );
                let _ = writeln!(
                    out,
                    "K-S test: statistic={:.4}, p-value={:.4}",
                    bundle.ks_statistic, bundle.ks_p_value
                );
                for advisory in &bundle.advisories {
                    let _ = writeln!(out, "Warning: {}", advisory);
                }
            }
            Err(e) => {
                let _ = writeln!(out, "Error: {}", e);
            }
        }
        out.push('\n');
    }

    out.push_str("Analysis completed.\n");
    out
}

/// Renders a fixed-width table with one row per source.
pub fn render_table(results: &ResultSet) -> String {
    let width = results
        .entries()
        .iter()
        .map(|e| e.label.len())
        .max()
        .unwrap_or(0)
        .max("source".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>9}  {:>12}  {:>8}  {:>8}  {:>8}  {:>10}",
        "source", "entropy", "chi-square", "chi p", "ks", "ks p", "time (s)"
    );
    for entry in results.entries() {
        match &entry.outcome {
            Ok(b) => {
                let _ = writeln!(
                    out,
                    "{:<width$}  {:>9.4}  {:>12.2}  {:>8.4}  {:>8.4}  {:>8.4}  {:>10.6}",
                    entry.label,
                    b.entropy_bits,
                    b.chi_square_statistic,
                    b.chi_square_p_value,
                    b.ks_statistic,
                    b.ks_p_value,
                    b.elapsed_seconds
                );
            }
            Err(e) => {
                let _ = writeln!(out, "{:<width$}  unavailable: {}", entry.label, e);
            }
        }
    }
    out
}
