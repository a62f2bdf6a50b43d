//! Study Execution
//!
//! Selects the log files of a study and extracts every metric from them.
//!
//! ## Data Flow
//!
//! ```text
//! directory listing
//!        │
//!        ▼
//!   select (NamingConvention)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │  extract_file    │  one task per file, Rayon pool
//! └────────┬─────────┘
//!          │  join barrier: results collected in selection order
//!          ▼
//!  MetricRecord + Fault
//! ```

use rayon::prelude::*;
use scalebench_core::{
    Fault, FileExtraction, InputFile, MetricRecord, MetricSet, NamingConvention, SelectError,
    Selection, extract_file, select,
};
use std::path::PathBuf;

/// Resolved settings of one study run
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Directory holding the logs
    pub directory: PathBuf,
    /// File naming convention
    pub convention: NamingConvention,
    /// Metrics to extract
    pub metrics: MetricSet,
    /// Declared baseline core count
    pub baseline_cores: Option<u32>,
    /// Sigma band half-width
    pub sigma_band: f64,
    /// Derive per-run series
    pub per_run: bool,
}

impl StudyConfig {
    /// Study of `directory` with the default convention and the given metrics
    pub fn new(directory: impl Into<PathBuf>, metrics: MetricSet) -> Self {
        Self {
            directory: directory.into(),
            convention: NamingConvention::default(),
            metrics,
            baseline_cores: None,
            sigma_band: scalebench_stats::DEFAULT_SIGMA_BAND,
            per_run: true,
        }
    }
}

/// Everything extracted from the study directory
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Files in processing order
    pub files: Vec<InputFile>,
    /// Records in (core count, run index, metric) order
    pub records: Vec<MetricRecord>,
    /// Selection faults followed by extraction faults
    pub faults: Vec<Fault>,
}

/// List and order the study files
pub fn select_inputs(config: &StudyConfig) -> Result<Selection, SelectError> {
    let selection = select(&config.directory, &config.convention)?;
    tracing::info!(
        dir = %config.directory.display(),
        files = selection.files.len(),
        rejected = selection.faults.len(),
        "selected study files"
    );
    Ok(selection)
}

/// Extract every metric from every selected file.
///
/// Files are processed in parallel; nothing is aggregated until all of them
/// are done, and the output keeps the selection order.
pub fn extract_selection(selection: Selection, metrics: &MetricSet) -> Extraction {
    let per_file: Vec<FileExtraction> = selection
        .files
        .par_iter()
        .map(|file| {
            let out = extract_file(file, metrics);
            tracing::info!(
                path = %file.path.display(),
                core_count = file.core_count,
                run_index = file.run_index,
                faults = out.faults.len(),
                "processed file"
            );
            out
        })
        .collect();

    let mut extraction = Extraction {
        files: selection.files,
        records: Vec::new(),
        faults: selection.faults,
    };
    for out in per_file {
        extraction.records.extend(out.records);
        extraction.faults.extend(out.faults);
    }
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> MetricSet {
        MetricSet::from_pairs([("solve", r"solve: (\d+\.\d+)")]).unwrap()
    }

    #[test]
    fn test_extraction_keeps_selection_order() {
        let dir = tempfile::tempdir().unwrap();
        for (cores, value) in [(16, "5.0"), (4, "20.0"), (8, "10.0"), (2, "40.0")] {
            let path = dir.path().join(format!("data_cores{cores}.txt"));
            std::fs::write(path, format!("solve: {value}\n")).unwrap();
        }

        let config = StudyConfig::new(dir.path(), metrics());
        let selection = select_inputs(&config).unwrap();
        let out = extract_selection(selection, &config.metrics);

        let cores: Vec<u32> = out.records.iter().map(|r| r.core_count).collect();
        assert_eq!(cores, vec![2, 4, 8, 16]);
        assert_eq!(out.records[0].value.value(), Some(40.0));
        assert!(out.faults.is_empty());
    }

    #[test]
    fn test_faults_are_collected_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data_cores4.txt"), "solve: 2.0\n").unwrap();
        std::fs::write(dir.path().join("data_coresX.txt"), "solve: 1.0\n").unwrap();

        let config = StudyConfig::new(dir.path(), metrics());
        let out = extract_selection(select_inputs(&config).unwrap(), &config.metrics);
        assert_eq!(out.files.len(), 1);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.faults.len(), 1);
        assert_eq!(out.faults[0].kind(), "malformed_filename");
    }
}
