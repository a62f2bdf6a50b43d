//! Strong-Scaling Analysis
//!
//! Derives ideal time, speedup and parallel efficiency from aggregated means.
//! With `base` the mean at the baseline core count and `k` the rank of a core
//! count among the distinct core counts from the baseline upwards:
//!
//! ```text
//! ideal(k)         = base / 2^k
//! speedup(k)       = base / actual(k)
//! ideal_speedup(k) = 2^k
//! efficiency(k)    = ideal(k) / actual(k) * 100
//! ```
//!
//! The rank-based exponent only means something when every core count doubles
//! the previous one. That is a caller precondition; `ScalingSeries::is_doubling`
//! reports whether it holds but nothing here rejects other sequences.

use crate::aggregate::{AggregatedCell, AggregatedRows, aggregate};
use scalebench_core::MetricRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a metric's series could not be derived
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalingError {
    /// No usable mean at the baseline core count
    #[error("metric '{metric}': no value at baseline core count {baseline_cores}")]
    MissingBaseline {
        /// Metric name
        metric: String,
        /// Declared baseline
        baseline_cores: u32,
    },

    /// An aggregated actual time of exactly zero
    #[error("metric '{metric}': actual time is zero at core count {core_count}")]
    DivisionByZero {
        /// Metric name
        metric: String,
        /// Core count with the zero mean
        core_count: u32,
    },
}

/// One core count of a scaling series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingPoint {
    /// Core count
    pub core_count: u32,
    /// Power-of-two step from the baseline
    pub rank: u32,
    /// Aggregated mean time
    pub actual: f64,
    /// Spread of `actual` across runs
    pub std_dev: Option<f64>,
    /// Time under perfect scaling
    pub ideal: f64,
    /// Baseline time over actual time
    pub speedup: f64,
    /// Speedup under perfect scaling
    pub ideal_speedup: f64,
    /// Ideal over actual, in percent
    pub efficiency: f64,
}

/// Scaling behaviour of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingSeries {
    /// Metric name
    pub metric: String,
    /// Core count every other point is compared against
    pub baseline_cores: u32,
    /// Mean time at the baseline
    pub base: f64,
    /// Points in ascending core-count order
    pub points: Vec<ScalingPoint>,
    /// Core counts (above the baseline) whose cell was undefined
    pub skipped: Vec<u32>,
}

impl ScalingSeries {
    /// Whether every core count of the series doubles the previous one
    pub fn is_doubling(&self) -> bool {
        let mut cores: Vec<u32> = self
            .points
            .iter()
            .map(|p| p.core_count)
            .chain(self.skipped.iter().copied())
            .collect();
        cores.sort_unstable();
        is_doubling(&cores)
    }

    /// Point at `core_count`, if present
    pub fn point(&self, core_count: u32) -> Option<&ScalingPoint> {
        self.points.iter().find(|p| p.core_count == core_count)
    }
}

/// Whether every core count of an ascending sequence doubles the previous one
pub fn is_doubling(cores: &[u32]) -> bool {
    cores.windows(2).all(|w| w[0].checked_mul(2) == Some(w[1]))
}

/// Smallest core count of the aggregated rows
pub fn default_baseline(rows: &AggregatedRows) -> Option<u32> {
    rows.keys().next().copied()
}

/// Derive the scaling series of `metric` relative to `baseline_cores`.
///
/// Rows below the baseline are ignored. Ranks count every distinct core count
/// from the baseline upwards, including ones whose cell is undefined.
pub fn analyze(
    rows: &AggregatedRows,
    metric: &str,
    baseline_cores: u32,
) -> Result<ScalingSeries, ScalingError> {
    derive_series(
        rows.range(baseline_cores..).map(|(&cores, _)| cores),
        |cores| rows.get(&cores).and_then(|row| row.cell(metric)),
        metric,
        baseline_cores,
    )
}

/// Walk `cores` (ascending, starting at the baseline) and look each cell up.
///
/// The rank of a core count is its position in `cores`, whatever `cell_at`
/// returns for it.
fn derive_series<'a>(
    cores: impl Iterator<Item = u32>,
    cell_at: impl Fn(u32) -> Option<&'a AggregatedCell>,
    metric: &str,
    baseline_cores: u32,
) -> Result<ScalingSeries, ScalingError> {
    let base = cell_at(baseline_cores)
        .and_then(|cell| cell.mean())
        .ok_or_else(|| ScalingError::MissingBaseline {
            metric: metric.to_string(),
            baseline_cores,
        })?;

    let mut points = Vec::new();
    let mut skipped = Vec::new();

    for (rank, core_count) in cores.enumerate() {
        let cell = cell_at(core_count);
        let Some(actual) = cell.and_then(|c| c.mean()) else {
            skipped.push(core_count);
            continue;
        };
        if actual == 0.0 {
            return Err(ScalingError::DivisionByZero {
                metric: metric.to_string(),
                core_count,
            });
        }

        let rank = rank as u32;
        let ideal_speedup = 2f64.powi(rank as i32);
        let ideal = base / ideal_speedup;

        points.push(ScalingPoint {
            core_count,
            rank,
            actual,
            std_dev: cell.and_then(|c| c.std_dev()),
            ideal,
            speedup: base / actual,
            ideal_speedup,
            efficiency: (ideal / actual) * 100.0,
        });
    }

    Ok(ScalingSeries {
        metric: metric.to_string(),
        baseline_cores,
        base,
        points,
        skipped,
    })
}

/// Analyze several metrics independently; one failure never affects another
pub fn analyze_all<'a>(
    rows: &AggregatedRows,
    metrics: impl IntoIterator<Item = &'a str>,
    baseline_cores: u32,
) -> BTreeMap<String, Result<ScalingSeries, ScalingError>> {
    metrics
        .into_iter()
        .map(|metric| (metric.to_string(), analyze(rows, metric, baseline_cores)))
        .collect()
}

/// Scaling series of `metric` computed separately for every run index.
///
/// Each run is compared against its own value at the baseline core count.
/// Ranks come from the core counts of the study-wide `rows`, so a run without
/// a file at some core count lists it in `skipped` and keeps the same ranks as
/// the aggregate series.
pub fn analyze_runs(
    records: &[MetricRecord],
    rows: &AggregatedRows,
    metric: &str,
    baseline_cores: u32,
) -> BTreeMap<u32, Result<ScalingSeries, ScalingError>> {
    let mut by_run: BTreeMap<u32, Vec<MetricRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.metric == metric) {
        by_run
            .entry(record.run_index)
            .or_default()
            .push(record.clone());
    }

    by_run
        .into_iter()
        .map(|(run_index, run_records)| {
            let run_rows = aggregate(&run_records);
            let series = derive_series(
                rows.range(baseline_cores..).map(|(&cores, _)| cores),
                |cores| run_rows.get(&cores).and_then(|row| row.cell(metric)),
                metric,
                baseline_cores,
            );
            (run_index, series)
        })
        .collect()
}
