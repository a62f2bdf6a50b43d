//! Report Building
//!
//! Assembles the final report from the extraction and analysis stages.
//!
//! ```text
//! Extraction ──┐
//!              ├──▶ Report ──▶ JSON / CSV / human / table directory
//! StudyAnalysis┘
//! ```

use super::analysis::StudyAnalysis;
use super::execution::{Extraction, StudyConfig};
use super::metadata::build_report_meta;
use scalebench_core::Fault;
use scalebench_report::{Report, ReportSummary, wide_table};

/// Build a complete Report from the pipeline results
pub fn build_report(
    config: &StudyConfig,
    extraction: Extraction,
    analysis: StudyAnalysis,
    total_duration_ms: f64,
) -> Report {
    let metrics = config.metrics.names();
    let wide = wide_table(&extraction.records, &metrics);

    let files_rejected = extraction
        .faults
        .iter()
        .filter(|f| matches!(f, Fault::MalformedFilename { .. } | Fault::DuplicateRun { .. }))
        .count();

    let summary = ReportSummary {
        files_selected: extraction.files.len(),
        files_rejected,
        records: extraction.records.len(),
        absent_values: extraction
            .records
            .iter()
            .filter(|r| r.value.is_absent())
            .count(),
        faults: extraction.faults.len(),
        metrics: metrics.len(),
        core_counts: analysis.rows.keys().copied().collect(),
        series_ok: analysis.series.len(),
        series_failed: analysis
            .failures
            .iter()
            .filter(|f| f.run_index.is_none())
            .count(),
        band_flags: analysis.band_flags.len(),
        doubling: analysis.doubling,
        total_duration_ms,
    };

    Report {
        meta: build_report_meta(config, analysis.baseline_cores),
        files: extraction.files,
        faults: extraction.faults,
        wide,
        aggregates: analysis.rows.into_values().collect(),
        series: analysis.series,
        failures: analysis.failures,
        run_series: analysis.run_series,
        band_flags: analysis.band_flags,
        summary,
    }
}
