#![warn(missing_docs)]
//! # Scalebench
//!
//! Strong-scaling analysis of solver timing logs.
//!
//! Scalebench turns a directory of logs from runs at different core counts into
//! speedup and parallel-efficiency tables:
//! - **File Selection**: `<prefix>_cores<N>[_run<R>].<ext>` names, ordered numerically
//! - **Metric Extraction**: named regex patterns, first capture group is the value
//! - **Run Aggregation**: mean and sample standard deviation per core count, absent values excluded
//! - **Scaling Analysis**: ideal time, speedup and efficiency relative to a baseline core count
//! - **Fault Isolation**: a bad file or value is reported, never fatal to the batch
//! - **Output**: human tables, JSON, CSV and a directory of CSV tables for chart tools
//!
//! ## Quick Start
//!
//! ```ignore
//! use scalebench::prelude::*;
//!
//! let metrics = solver_timers()?;
//! let report = run_study(&StudyConfig::new("logs", metrics))?;
//! for series in &report.series {
//!     for p in &series.points {
//!         println!("{} {} cores: {:.1}%", series.metric, p.core_count, p.efficiency);
//!     }
//! }
//! ```

// Re-export core types
pub use scalebench_core::{
    Fault, FileExtraction, FilenamePattern, InputFile, MetricRecord, MetricSet, MetricSpec,
    MetricValue, NamingConvention, ParseFailure, RunKey, SOLVER_TIMERS, SelectError, Selection,
    SpecError, extract, extract_file, select, select_names, solver_timers,
};

// Re-export stats
pub use scalebench_stats::{
    AggregatedCell, AggregatedRow, AggregatedRows, BandFlag, BandSide, CellSummary,
    DEFAULT_SIGMA_BAND, ScalingError, ScalingPoint, ScalingSeries, SigmaBand, aggregate, analyze,
    analyze_all, analyze_runs, compute_summary, default_baseline, flag_outside_band, is_doubling,
    sigma_band,
};

// Re-export report types
pub use scalebench_report::{
    CsvTableEmitter, EmitError, OutputFormat, Report, ReportEmitter, ReportSummary, RunSeries,
    SeriesFailure, WideTable, generate_csv_report, generate_json_report, parse_json_report,
    wide_table, write_tables,
};

// Re-export the pipeline
pub use scalebench_cli::{ScaleConfig, StudyConfig, format_human_output, run_study};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        MetricSet, NamingConvention, Report, ScalingSeries, StudyConfig, run_study, solver_timers,
    };
}

/// Run the Scalebench CLI.
///
/// ```ignore
/// fn main() {
///     scalebench::run().unwrap();
/// }
/// ```
pub use scalebench_cli::run;
