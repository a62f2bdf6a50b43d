//! Report Metadata
//!
//! Records what was analyzed and how: the directory, the naming convention,
//! the metric patterns, the baseline and the time of the run.

use super::execution::StudyConfig;
use chrono::Utc;
use scalebench_report::{MetricInfo, ReportMeta, SCHEMA_VERSION};

/// Build report metadata for a study
pub fn build_report_meta(config: &StudyConfig, baseline_cores: Option<u32>) -> ReportMeta {
    let metrics = config
        .metrics
        .iter()
        .map(|spec| MetricInfo {
            name: spec.name().to_string(),
            pattern: spec.pattern().to_string(),
        })
        .collect();

    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        directory: config.directory.clone(),
        convention: config.convention.clone(),
        baseline_cores,
        sigma_band: config.sigma_band,
        metrics,
    }
}
