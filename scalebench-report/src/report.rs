//! Report Data Structures

use crate::tables::WideTable;
use chrono::{DateTime, Utc};
use scalebench_core::{Fault, InputFile, NamingConvention};
use scalebench_stats::{AggregatedRow, BandFlag, ScalingError, ScalingSeries};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete scaling study report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    /// Files in processing order
    pub files: Vec<InputFile>,
    /// Isolated faults, in the order they were found
    pub faults: Vec<Fault>,
    pub wide: WideTable,
    /// One row per core count, ascending
    pub aggregates: Vec<AggregatedRow>,
    /// One series per metric that could be analyzed, in metric order
    pub series: Vec<ScalingSeries>,
    pub failures: Vec<SeriesFailure>,
    pub run_series: Vec<RunSeries>,
    pub band_flags: Vec<BandFlag>,
    pub summary: ReportSummary,
}

impl Report {
    /// Series of `metric`, if it could be derived
    pub fn series_for(&self, metric: &str) -> Option<&ScalingSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }

    /// Per-run series of `metric`, ordered by run index
    pub fn run_series_for<'a>(&'a self, metric: &'a str) -> impl Iterator<Item = &'a RunSeries> {
        self.run_series.iter().filter(move |r| r.series.metric == metric)
    }

    /// Aggregated row at `core_count`
    pub fn aggregate_at(&self, core_count: u32) -> Option<&AggregatedRow> {
        self.aggregates.iter().find(|r| r.core_count == core_count)
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub directory: PathBuf,
    pub convention: NamingConvention,
    pub baseline_cores: Option<u32>,
    pub sigma_band: f64,
    pub metrics: Vec<MetricInfo>,
}

/// A metric as it was configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInfo {
    pub name: String,
    pub pattern: String,
}

/// A series that could not be derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesFailure {
    pub metric: String,
    /// Set for per-run series
    pub run_index: Option<u32>,
    pub error: ScalingError,
    pub message: String,
}

impl SeriesFailure {
    /// Failure of an aggregated series
    pub fn aggregate(error: ScalingError) -> Self {
        Self::new(error, None)
    }

    /// Failure of the series of one run
    pub fn run(error: ScalingError, run_index: u32) -> Self {
        Self::new(error, Some(run_index))
    }

    fn new(error: ScalingError, run_index: Option<u32>) -> Self {
        let metric = match &error {
            ScalingError::MissingBaseline { metric, .. }
            | ScalingError::DivisionByZero { metric, .. } => metric.clone(),
        };
        Self {
            metric,
            run_index,
            message: error.to_string(),
            error,
        }
    }
}

/// Scaling series of a single run index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSeries {
    pub run_index: u32,
    pub series: ScalingSeries,
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files_selected: usize,
    pub files_rejected: usize,
    pub records: usize,
    pub absent_values: usize,
    pub faults: usize,
    pub metrics: usize,
    pub core_counts: Vec<u32>,
    pub series_ok: usize,
    pub series_failed: usize,
    pub band_flags: usize,
    /// Whether the core counts double at every step
    pub doubling: bool,
    pub total_duration_ms: f64,
}
