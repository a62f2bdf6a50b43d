//! Scaling Analysis
//!
//! Aggregates the extracted records and derives the scaling series of every
//! metric. Metrics are independent, so they are analyzed in parallel; a
//! metric that cannot be analyzed becomes a `SeriesFailure` and never affects
//! the others.

use super::execution::StudyConfig;
use rayon::prelude::*;
use scalebench_core::MetricRecord;
use scalebench_report::{RunSeries, SeriesFailure};
use scalebench_stats::{
    AggregatedRows, BandFlag, ScalingSeries, aggregate, analyze, analyze_runs, default_baseline,
    flag_outside_band, is_doubling,
};

/// Aggregates and scaling results of a study
#[derive(Debug, Clone, Default)]
pub struct StudyAnalysis {
    /// Rows keyed by core count
    pub rows: AggregatedRows,
    /// Baseline actually used (declared or smallest core count)
    pub baseline_cores: Option<u32>,
    /// Whether the core counts from the baseline up double at every step
    pub doubling: bool,
    /// Series in metric declaration order
    pub series: Vec<ScalingSeries>,
    /// Aggregated and per-run series that could not be derived
    pub failures: Vec<SeriesFailure>,
    /// Per-run series, by metric then run index
    pub run_series: Vec<RunSeries>,
    /// Runs outside the sigma band of their cell
    pub band_flags: Vec<BandFlag>,
}

/// Aggregate `records` and analyze every configured metric
pub fn analyze_study(records: &[MetricRecord], config: &StudyConfig) -> StudyAnalysis {
    let rows = aggregate(records);
    let band_flags = flag_outside_band(records, &rows, config.sigma_band);
    for flag in &band_flags {
        tracing::debug!(
            core_count = flag.core_count,
            run_index = flag.run_index,
            metric = %flag.metric,
            value = flag.value,
            "run outside sigma band"
        );
    }

    let Some(baseline) = config.baseline_cores.or_else(|| default_baseline(&rows)) else {
        return StudyAnalysis {
            rows,
            band_flags,
            ..Default::default()
        };
    };

    let cores: Vec<u32> = rows.range(baseline..).map(|(&c, _)| c).collect();
    let doubling = is_doubling(&cores);
    if !doubling {
        tracing::warn!(
            ?cores,
            "core counts do not double at every step; ideal times assume they do"
        );
    }

    let names = config.metrics.names();
    let per_metric: Vec<_> = names
        .par_iter()
        .map(|metric| {
            let series = analyze(&rows, metric, baseline);
            let runs = if config.per_run {
                analyze_runs(records, &rows, metric, baseline)
            } else {
                Default::default()
            };
            (series, runs)
        })
        .collect();

    let mut analysis = StudyAnalysis {
        baseline_cores: Some(baseline),
        doubling,
        band_flags,
        ..Default::default()
    };
    for (series, runs) in per_metric {
        match series {
            Ok(series) => analysis.series.push(series),
            Err(e) => {
                tracing::warn!(error = %e, "scaling series skipped");
                analysis.failures.push(SeriesFailure::aggregate(e));
            }
        }
        for (run_index, result) in runs {
            match result {
                Ok(series) => analysis.run_series.push(RunSeries { run_index, series }),
                Err(e) => {
                    tracing::debug!(run_index, error = %e, "per-run series skipped");
                    analysis.failures.push(SeriesFailure::run(e, run_index));
                }
            }
        }
    }
    analysis.rows = rows;
    analysis
}
