//! Percentile Computation
//!
//! Quartiles feed the box-plot columns of the aggregate table. Inputs are
//! sorted with `f64::total_cmp` and never empty: an empty cell is undefined
//! and has no percentiles at all.

/// Lower quartile, median and upper quartile of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Quartiles {
    /// 25th percentile
    pub q1: f64,
    /// 50th percentile
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
}

/// Percentile of an already sorted, non-empty slice.
///
/// Uses linear interpolation between nearest ranks (the same rule as
/// pandas/numpy defaults).
pub(crate) fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let p = (percentile / 100.0).clamp(0.0, 1.0);

    // Linear interpolation between nearest ranks
    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}

/// Quartiles of an already sorted, non-empty slice
pub(crate) fn quartiles_of_sorted(sorted: &[f64]) -> Quartiles {
    Quartiles {
        q1: percentile_of_sorted(sorted, 25.0),
        median: percentile_of_sorted(sorted, 50.0),
        q3: percentile_of_sorted(sorted, 75.0),
    }
}
