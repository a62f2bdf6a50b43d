//! Summary Statistics
//!
//! Statistics of one (core count, metric) cell across repeated runs.
//!
//! Values are sorted with `f64::total_cmp` before any arithmetic, so the
//! result is bit-for-bit the same for every permutation of the input.

use crate::percentiles::quartiles_of_sorted;
use serde::{Deserialize, Serialize};

/// Summary of the non-absent values of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    /// Number of values
    pub samples: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` with fewer than two values
    pub std_dev: Option<f64>,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// 25th percentile
    pub q1: f64,
    /// 50th percentile
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
}

/// Summarize `values`; `None` when there is nothing to summarize
pub fn compute_summary(values: &[f64]) -> Option<CellSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;

    let std_dev = if n < 2 {
        None
    } else {
        let variance =
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(variance.sqrt())
    };

    let quartiles = quartiles_of_sorted(&sorted);

    Some(CellSummary {
        samples: n,
        mean,
        std_dev,
        min: sorted[0],
        max: sorted[n - 1],
        q1: quartiles.q1,
        median: quartiles.median,
        q3: quartiles.q3,
    })
}

impl CellSummary {
    /// Coefficient of variation in percent (relative stddev)
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        match self.std_dev {
            Some(sd) if self.mean != 0.0 => Some((sd / self.mean) * 100.0),
            _ => None,
        }
    }
}
